use thiserror::Error;

/// Terminal failures of a single forecast request.
///
/// None of these are retried inside the pipeline; the caller may retry the whole request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("Market data unavailable: {reason}")]
    DataUnavailable { reason: String },

    #[error("Insufficient data after feature derivation: {rows} rows < {required} required")]
    InsufficientData { rows: usize, required: usize },

    #[error("Prediction failed: {reason}")]
    PredictionFailure { reason: String },

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

impl ForecastError {
    pub fn data_unavailable(reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            reason: reason.into(),
        }
    }

    pub fn prediction_failure(reason: impl Into<String>) -> Self {
        Self::PredictionFailure {
            reason: reason.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Stable label used in metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataUnavailable { .. } => "data_unavailable",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::PredictionFailure { .. } => "prediction_failure",
            Self::Configuration { .. } => "configuration",
        }
    }
}

/// Errors raised by the min/max scalers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScalerError {
    #[error("Cannot fit scaler on an empty matrix")]
    EmptyInput,

    #[error("Feature width mismatch: scaler fitted on {expected} columns, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("Non-finite value in column {column}")]
    NonFinite { column: usize },
}

impl From<ScalerError> for ForecastError {
    fn from(err: ScalerError) -> Self {
        ForecastError::PredictionFailure {
            reason: format!("scaling failed: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_formatting() {
        let err = ForecastError::InsufficientData {
            rows: 46,
            required: 50,
        };

        let msg = err.to_string();
        assert!(msg.contains("46"));
        assert!(msg.contains("50"));
        assert_eq!(err.kind(), "insufficient_data");
    }

    #[test]
    fn test_scaler_error_becomes_prediction_failure() {
        let err: ForecastError = ScalerError::WidthMismatch {
            expected: 7,
            actual: 6,
        }
        .into();

        assert_eq!(err.kind(), "prediction_failure");
        assert!(err.to_string().contains("fitted on 7 columns, got 6"));
    }
}
