use super::normalizer::Normalizer;
use crate::application::market_data::indicators::{latest_rsi, latest_sma};
use crate::application::ml::predictor::ForecastModel;
use crate::domain::errors::ForecastError;
use crate::domain::ml::feature_registry::{CLOSE_INDEX, FEATURE_COUNT, MA_INDEX, RSI_INDEX};
use ndarray::{Array1, Array3, ArrayView1};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloutConfig {
    pub horizon: usize,
    /// Only the close is fed back between steps; every other feature stays frozen at
    /// its last observed value.
    pub propagate_only_price: bool,
    pub ma_period: usize,
    pub rsi_period: usize,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            horizon: 30,
            propagate_only_price: true,
            ma_period: 200,
            rsi_period: 14,
        }
    }
}

/// Shapes one scaled feature row as `(1, 1, 7)`: one sample, one timestep.
pub fn to_model_input(row: ArrayView1<'_, f64>) -> Array3<f32> {
    Array3::from_shape_fn((1, 1, row.len()), |(_, _, i)| row[i] as f32)
}

/// Autoregressive multi-step loop: each predicted close becomes the next step's input.
pub struct RolloutEngine<'a> {
    model: &'a dyn ForecastModel,
    normalizer: &'a Normalizer,
    config: RolloutConfig,
}

impl<'a> RolloutEngine<'a> {
    pub fn new(
        model: &'a dyn ForecastModel,
        normalizer: &'a Normalizer,
        config: RolloutConfig,
    ) -> Self {
        Self {
            model,
            normalizer,
            config,
        }
    }

    /// Returns exactly `horizon` de-normalized prices, or the first step's failure.
    ///
    /// `initial` is the last scaled feature row. `close_history` is the raw close series
    /// of the fetched window and is only read when indicators are re-derived.
    pub fn run(
        &self,
        initial: ArrayView1<'_, f64>,
        close_history: &[f64],
    ) -> Result<Vec<f64>, ForecastError> {
        if initial.len() != FEATURE_COUNT {
            return Err(ForecastError::prediction_failure(format!(
                "expected {} features, got {}",
                FEATURE_COUNT,
                initial.len()
            )));
        }

        let mut current: Array1<f64> = initial.to_owned();
        let mut history = close_history.to_vec();
        let mut trajectory = Vec::with_capacity(self.config.horizon);

        for step in 1..=self.config.horizon {
            let input = to_model_input(current.view());

            let scaled = self.model.infer(input.view()).map_err(|e| {
                ForecastError::prediction_failure(format!("step {}: {}", step, e))
            })?;
            if !scaled.is_finite() {
                return Err(ForecastError::prediction_failure(format!(
                    "step {}: model returned non-finite value {}",
                    step, scaled
                )));
            }

            let price = self.normalizer.target.inverse_scalar(scaled)?;
            if !price.is_finite() {
                return Err(ForecastError::prediction_failure(format!(
                    "step {}: non-finite price {}",
                    step, price
                )));
            }
            trajectory.push(price);

            let mut raw = self.normalizer.features.inverse_transform_row(current.view())?;
            raw[CLOSE_INDEX] = price;

            if !self.config.propagate_only_price {
                history.push(price);
                if let Some(ma) = latest_sma(&history, self.config.ma_period)? {
                    raw[MA_INDEX] = ma;
                }
                if let Some(rsi) = latest_rsi(&history, self.config.rsi_period) {
                    raw[RSI_INDEX] = rsi;
                }
            }

            current = self.normalizer.features.transform_row(raw.view())?;
            debug!("Rollout step {}/{}: {:.4}", step, self.config.horizon, price);
        }

        Ok(trajectory)
    }
}
