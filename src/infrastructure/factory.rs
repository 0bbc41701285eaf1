use crate::application::ml::{ForecastModel, OnnxForecastModel, SmartCoreForecastModel};
use crate::config::{Config, Mode, ModelBackend};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::binance::BinanceMarketDataService;
use crate::infrastructure::csv_market_data::CsvMarketDataService;
use crate::infrastructure::mock::MockMarketDataService;
use std::sync::Arc;
use tracing::info;

pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create_market_data(config: &Config) -> Arc<dyn MarketDataService> {
        match config.mode {
            Mode::Mock => {
                info!("Using mock market data (seeded random walk)");
                Arc::new(MockMarketDataService::new())
            }
            Mode::Binance => {
                info!(
                    "Using Binance market data ({})",
                    config.market_data.binance.base_url
                );
                Arc::new(
                    BinanceMarketDataService::builder()
                        .api_key(config.market_data.binance.api_key.clone())
                        .base_url(config.market_data.binance.base_url.clone())
                        .build(),
                )
            }
            Mode::Csv => {
                info!("Using CSV market data from {:?}", config.market_data.csv_path);
                Arc::new(CsvMarketDataService::new(
                    config.market_data.csv_path.clone(),
                ))
            }
        }
    }

    /// Loads the configured artifact. A missing or broken file yields an unloaded model.
    pub fn create_model(config: &Config) -> Arc<dyn ForecastModel> {
        let path = config.model.path.clone();
        match config.model.backend {
            ModelBackend::Onnx => Arc::new(OnnxForecastModel::new(path)),
            ModelBackend::SmartCore => Arc::new(SmartCoreForecastModel::new(path)),
        }
    }
}
