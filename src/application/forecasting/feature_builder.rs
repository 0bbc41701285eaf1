use crate::application::market_data::indicators::{rolling_rsi, rolling_sma};
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::{FeatureTable, FeatureVector, Observation};
use tracing::{debug, info};

pub const DEFAULT_MA_PERIOD: usize = 200;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_MIN_ROWS: usize = 50;

/// Derives the model's feature table from raw daily observations.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    ma_period: usize,
    rsi_period: usize,
    min_rows: usize,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MA_PERIOD, DEFAULT_RSI_PERIOD, DEFAULT_MIN_ROWS)
    }
}

impl FeatureBuilder {
    pub fn new(ma_period: usize, rsi_period: usize, min_rows: usize) -> Self {
        Self {
            ma_period,
            rsi_period,
            min_rows,
        }
    }

    pub fn min_rows(&self) -> usize {
        self.min_rows
    }

    /// Builds `[close, open, high, low, volume, ma200, rsi14]` per observation and drops
    /// every row with an undefined field.
    ///
    /// `observations` must be ascending by date.
    pub fn build(&self, observations: &[Observation]) -> Result<FeatureTable, ForecastError> {
        let closes: Vec<f64> = observations.iter().map(|o| o.close).collect();
        let ma = rolling_sma(&closes, self.ma_period)?;
        let rsi = rolling_rsi(&closes, self.rsi_period);

        let mut rows = Vec::with_capacity(observations.len());
        let mut dates = Vec::with_capacity(observations.len());

        for ((obs, ma), rsi) in observations.iter().zip(ma).zip(rsi) {
            let Some(rsi) = rsi else {
                continue;
            };

            let row = FeatureVector {
                close: obs.close,
                open: obs.open,
                high: obs.high,
                low: obs.low,
                volume: obs.volume,
                ma200: ma,
                rsi14: rsi,
            };

            if !row.is_finite() {
                debug!("Dropping {}: non-finite feature", obs.date);
                continue;
            }

            rows.push(row);
            dates.push(obs.date);
        }

        info!(
            "FeatureBuilder: {} usable rows from {} observations",
            rows.len(),
            observations.len()
        );

        if rows.len() < self.min_rows {
            return Err(ForecastError::InsufficientData {
                rows: rows.len(),
                required: self.min_rows,
            });
        }

        Ok(FeatureTable::new(rows, dates, closes))
    }
}
