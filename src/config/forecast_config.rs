//! Forecast pipeline configuration parsing from environment variables.

use super::env_or;
use crate::application::forecasting::ForecastSettings;
use anyhow::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEnvConfig {
    pub horizon_days: usize,
    pub lookback_days: usize,
    pub min_rows: usize,
    pub ma_period: usize,
    pub rsi_period: usize,
    pub propagate_only_price: bool,
}

impl Default for ForecastEnvConfig {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            lookback_days: 300,
            min_rows: 50,
            ma_period: 200,
            rsi_period: 14,
            propagate_only_price: true,
        }
    }
}

impl ForecastEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            horizon_days: env_or("FORECAST_HORIZON_DAYS", defaults.horizon_days)?,
            lookback_days: env_or("FORECAST_LOOKBACK_DAYS", defaults.lookback_days)?,
            min_rows: env_or("FORECAST_MIN_ROWS", defaults.min_rows)?,
            ma_period: env_or("MA_PERIOD", defaults.ma_period)?,
            rsi_period: env_or("RSI_PERIOD", defaults.rsi_period)?,
            propagate_only_price: env_or(
                "FORECAST_PROPAGATE_ONLY_PRICE",
                defaults.propagate_only_price,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            anyhow::bail!("FORECAST_HORIZON_DAYS must be at least 1");
        }
        if self.ma_period == 0 || self.rsi_period == 0 {
            anyhow::bail!(
                "Indicator periods must be positive (MA_PERIOD={}, RSI_PERIOD={})",
                self.ma_period,
                self.rsi_period
            );
        }
        if self.min_rows == 0 {
            anyhow::bail!("FORECAST_MIN_ROWS must be at least 1");
        }
        // the first rsi_period rows never survive feature derivation
        let required = self.min_rows + self.rsi_period;
        if self.lookback_days < required {
            anyhow::bail!(
                "FORECAST_LOOKBACK_DAYS={} cannot yield {} usable rows (need at least {})",
                self.lookback_days,
                self.min_rows,
                required
            );
        }
        Ok(())
    }

    pub fn settings(&self, symbol: &str) -> ForecastSettings {
        ForecastSettings {
            symbol: symbol.to_string(),
            horizon: self.horizon_days,
            lookback_days: self.lookback_days,
            min_rows: self.min_rows,
            ma_period: self.ma_period,
            rsi_period: self.rsi_period,
            propagate_only_price: self.propagate_only_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ForecastEnvConfig::default();
        assert!(config.validate().is_ok());

        let settings = config.settings("BTC/USDT");
        assert_eq!(settings, ForecastSettings::default());
    }

    #[test]
    fn test_lookback_too_short() {
        let config = ForecastEnvConfig {
            lookback_days: 60,
            ..ForecastEnvConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("need at least 64"));
    }

    #[test]
    fn test_zero_period_rejected() {
        let config = ForecastEnvConfig {
            rsi_period: 0,
            ..ForecastEnvConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
