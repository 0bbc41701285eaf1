pub mod onnx_predictor;
pub mod predictor;
pub mod smartcore_predictor;

pub use onnx_predictor::OnnxForecastModel;
pub use predictor::ForecastModel;
pub use smartcore_predictor::SmartCoreForecastModel;
