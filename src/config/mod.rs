//! Configuration module for rustcast.
//!
//! Structured configuration loaded from environment variables, organized by concern:
//! market data, model, forecast, and server.

mod forecast_config;
mod market_data_config;
mod model_config;
mod server_config;

pub use forecast_config::ForecastEnvConfig;
pub use market_data_config::{BinanceConfig, MarketDataEnvConfig};
pub use model_config::{ModelBackend, ModelEnvConfig};
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Market data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Mock,
    Binance,
    Csv,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Mode::Mock),
            "binance" => Ok(Mode::Binance),
            "csv" => Ok(Mode::Csv),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'mock', 'binance', or 'csv'", s),
        }
    }
}

/// Reads `key`, falling back to `default` when unset or empty.
///
/// A set but unparseable value is an error rather than a silent default.
pub(crate) fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        _ => Ok(default),
    }
}

pub(crate) fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub mode: Mode,
    pub market_data: MarketDataEnvConfig,
    pub model: ModelEnvConfig,
    pub forecast: ForecastEnvConfig,
    pub server: ServerEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let mode = Mode::from_str(&env_string("MODE", "mock"))?;

        let market_data = MarketDataEnvConfig::from_env();
        let model = ModelEnvConfig::from_env().context("Failed to load model config")?;
        let forecast = ForecastEnvConfig::from_env().context("Failed to load forecast config")?;
        let server = ServerEnvConfig::from_env().context("Failed to load server config")?;

        Ok(Self {
            mode,
            market_data,
            model,
            forecast,
            server,
        })
    }
}
