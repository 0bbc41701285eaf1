use crate::domain::errors::ForecastError;
use crate::domain::forecasting::Observation;
use tracing::warn;

/// Centralized validator for daily market data integrity.
///
/// Rejects data that is physically impossible or would silently corrupt the indicators.
pub struct ObservationValidator;

impl ObservationValidator {
    /// Validates a single observation, returning the reason on failure.
    pub fn validate_observation(obs: &Observation) -> Result<(), String> {
        let fields = [obs.open, obs.high, obs.low, obs.close, obs.volume];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(format!("{} has non-finite field(s)", obs.date));
        }

        if obs.open <= 0.0 || obs.high <= 0.0 || obs.low <= 0.0 || obs.close <= 0.0 {
            return Err(format!("{} has non-positive price component(s)", obs.date));
        }

        if obs.low > obs.high {
            return Err(format!(
                "{} has low {} > high {}",
                obs.date, obs.low, obs.high
            ));
        }

        if obs.volume < 0.0 {
            return Err(format!("{} has negative volume {}", obs.date, obs.volume));
        }

        Ok(())
    }

    /// Validates a whole window: every row valid, dates strictly ascending.
    pub fn validate_series(observations: &[Observation]) -> Result<(), ForecastError> {
        for obs in observations {
            if let Err(reason) = Self::validate_observation(obs) {
                warn!("Validation FAILED: {}", reason);
                return Err(ForecastError::data_unavailable(reason));
            }
        }

        for pair in observations.windows(2) {
            if pair[1].date <= pair[0].date {
                let reason = format!(
                    "observations not strictly ascending: {} followed by {}",
                    pair[0].date, pair[1].date
                );
                warn!("Validation FAILED: {}", reason);
                return Err(ForecastError::data_unavailable(reason));
            }
        }

        Ok(())
    }
}
