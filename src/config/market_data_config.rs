//! Market data source configuration parsing from environment variables.

use super::env_string;
use std::path::PathBuf;

/// Binance REST configuration
#[derive(Debug, Clone, Default)]
pub struct BinanceConfig {
    pub api_key: String,
    pub base_url: String,
}

impl BinanceConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_string("BINANCE_API_KEY", ""),
            base_url: env_string("BINANCE_BASE_URL", "https://api.binance.com"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketDataEnvConfig {
    pub symbol: String,
    pub binance: BinanceConfig,
    pub csv_path: PathBuf,
}

impl Default for MarketDataEnvConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC/USDT".to_string(),
            binance: BinanceConfig {
                api_key: String::new(),
                base_url: "https://api.binance.com".to_string(),
            },
            csv_path: PathBuf::from("data/btc_usd.csv"),
        }
    }
}

impl MarketDataEnvConfig {
    pub fn from_env() -> Self {
        Self {
            symbol: env_string("SYMBOL", "BTC/USDT"),
            binance: BinanceConfig::from_env(),
            csv_path: PathBuf::from(env_string("CSV_PATH", "data/btc_usd.csv")),
        }
    }
}
