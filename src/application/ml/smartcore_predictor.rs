use super::predictor::ForecastModel;
use ndarray::ArrayView3;
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Random forest regressor serialized to JSON with serde.
///
/// Treats the scaled 7-feature vector as a flat row; the time axis is always length 1.
pub struct SmartCoreForecastModel {
    model: Option<Forest>,
    model_path: PathBuf,
}

impl SmartCoreForecastModel {
    pub fn new(model_path: PathBuf) -> Self {
        let model = if model_path.exists() {
            Self::load_model(&model_path)
        } else {
            warn!(
                "ML model file not found at {:?}. Serving degraded.",
                model_path
            );
            None
        };

        Self { model, model_path }
    }

    fn load_model(model_path: &Path) -> Option<Forest> {
        let file = match File::open(model_path) {
            Ok(file) => file,
            Err(e) => {
                error!("Failed to open model file: {}", e);
                return None;
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(model) => {
                info!("Successfully loaded ML model from {:?}", model_path);
                Some(model)
            }
            Err(e) => {
                error!("Failed to deserialize ML model: {}", e);
                None
            }
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl ForecastModel for SmartCoreForecastModel {
    fn infer(&self, input: ArrayView3<'_, f32>) -> Result<f64, String> {
        let model = self.model.as_ref().ok_or("model not loaded")?;

        let input_vec: Vec<f64> = input.iter().map(|v| *v as f64).collect();
        let input_matrix = DenseMatrix::from_2d_vec(&vec![input_vec])
            .map_err(|e| format!("Matrix creation failed: {}", e))?;

        let predictions = model
            .predict(&input_matrix)
            .map_err(|e| format!("Prediction failed: {}", e))?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| "No prediction returned".to_string())
    }

    fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }

    fn version(&self) -> &str {
        "v1.0"
    }
}
