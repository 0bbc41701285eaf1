use super::predictor::ForecastModel;
use ndarray::ArrayView3;
use ort::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Sequence model exported to ONNX (LSTM, GRU, ...).
///
/// A missing or unreadable artifact leaves the model unloaded instead of failing startup;
/// `infer` then errors and `is_loaded` reports false.
pub struct OnnxForecastModel {
    session: Option<Mutex<Session>>,
    model_path: PathBuf,
}

impl OnnxForecastModel {
    pub fn new(model_path: PathBuf) -> Self {
        let session = match Self::try_load(&model_path) {
            Ok(session) => Some(Mutex::new(session)),
            Err(reason) => {
                warn!("ONNX model unavailable, serving degraded: {}", reason);
                None
            }
        };

        Self {
            session,
            model_path,
        }
    }

    fn try_load(model_path: &Path) -> Result<Session, String> {
        if !model_path.exists() {
            return Err(format!("model file not found at {:?}", model_path));
        }

        let builder = Session::builder().map_err(|e| {
            error!("Failed to create ONNX session builder: {}", e);
            e.to_string()
        })?;

        let session = builder.commit_from_file(model_path).map_err(|e| {
            error!("Failed to load ONNX model: {}", e);
            e.to_string()
        })?;

        info!("Successfully loaded ONNX model from {:?}", model_path);
        Ok(session)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl ForecastModel for OnnxForecastModel {
    fn infer(&self, input: ArrayView3<'_, f32>) -> Result<f64, String> {
        let mut session = match &self.session {
            Some(m) => m.lock().map_err(|e| format!("Mutex lock failed: {}", e))?,
            None => return Err("model not loaded".to_string()),
        };

        let shape: Vec<usize> = input.shape().to_vec();
        let flat_data: Vec<f32> = input.iter().copied().collect();

        let input_value = ort::value::Value::from_array((shape.as_slice(), flat_data))
            .map_err(|e| format!("Input value creation failed: {}", e))?;

        let inputs = ort::inputs![input_value];

        match session.run(inputs) {
            Ok(outputs) => {
                let output_value = outputs
                    .iter()
                    .next()
                    .map(|(_, v)| v)
                    .ok_or("No output found")?;
                let data = output_value
                    .try_extract_tensor::<f32>()
                    .map_err(|e| e.to_string())?;
                Ok(*data.1.iter().next().ok_or("Empty output")? as f64)
            }
            Err(e) => Err(e.to_string()),
        }
    }

    fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    fn name(&self) -> &str {
        "ONNX Runtime"
    }

    fn version(&self) -> &str {
        "v1 (stateless rollout)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_missing_artifact_degrades() {
        let model = OnnxForecastModel::new(PathBuf::from("non_existent.onnx"));
        assert!(!model.is_loaded());
        assert_eq!(model.model_path(), Path::new("non_existent.onnx"));

        let input = Array3::<f32>::zeros((1, 1, 7));
        let err = model.infer(input.view()).unwrap_err();
        assert_eq!(err, "model not loaded");
    }
}
