// Forecasting pipeline
pub mod forecasting;

// Indicator series over daily data
pub mod market_data;

// Model adapters behind the ForecastModel port
pub mod ml;

// Application wiring
pub mod system;
