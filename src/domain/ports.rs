use crate::domain::forecasting::Observation;
use anyhow::Result;
use async_trait::async_trait;

/// Supplier of daily OHLCV history.
///
/// Implementations return observations ascending by date. An empty vector is a valid
/// response; the caller decides whether that is an error.
#[async_trait]
pub trait MarketDataService: Send + Sync {
    async fn get_daily_history(&self, symbol: &str, lookback_days: usize)
    -> Result<Vec<Observation>>;

    /// Human-readable source name for logs
    fn source_name(&self) -> &str;
}
