//! Model artifact configuration parsing from environment variables.

use super::{env_or, env_string};
use crate::domain::forecasting::ModelMetadata;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Adapter used to load the artifact at `MODEL_PATH`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    Onnx,
    SmartCore,
}

impl ModelBackend {
    /// `.json` artifacts are SmartCore forests; everything else is treated as ONNX
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ModelBackend::SmartCore,
            _ => ModelBackend::Onnx,
        }
    }
}

impl FromStr for ModelBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "onnx" => Ok(ModelBackend::Onnx),
            "smartcore" => Ok(ModelBackend::SmartCore),
            _ => anyhow::bail!(
                "Invalid MODEL_BACKEND: {}. Must be 'onnx' or 'smartcore'",
                s
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub path: PathBuf,
    pub backend: ModelBackend,
    pub model_type: String,
    pub training_period: String,
    pub mape: f64,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        let defaults = ModelMetadata::default();
        let path = PathBuf::from(&defaults.model_path);
        Self {
            backend: ModelBackend::from_path(&path),
            path,
            model_type: defaults.model_type,
            training_period: defaults.training_period,
            mape: defaults.mape,
        }
    }
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = ModelMetadata::default();
        let path = PathBuf::from(env_string("MODEL_PATH", &defaults.model_path));

        let backend = match std::env::var("MODEL_BACKEND") {
            Ok(raw) if !raw.trim().is_empty() => ModelBackend::from_str(raw.trim())?,
            _ => ModelBackend::from_path(&path),
        };

        let mape = env_or("MODEL_MAPE", defaults.mape)?;
        if !mape.is_finite() || mape < 0.0 {
            anyhow::bail!("MODEL_MAPE must be a non-negative number, got {}", mape);
        }

        Ok(Self {
            path,
            backend,
            model_type: env_string("MODEL_TYPE", &defaults.model_type),
            training_period: env_string("MODEL_TRAINING_PERIOD", &defaults.training_period),
            mape,
        })
    }

    pub fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            model_path: self.path.display().to_string(),
            model_type: self.model_type.clone(),
            training_period: self.training_period.clone(),
            mape: self.mape,
        }
    }
}
