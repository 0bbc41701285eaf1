//! Binance Market Data Service
//!
//! Daily candles from the public klines endpoint (`/api/v3/klines`, interval `1d`).

use crate::domain::forecasting::{Observation, sort_by_date_last_wins};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, build_url_with_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Binance caps a single klines request at 1000 candles
pub const MAX_KLINES_LIMIT: usize = 1000;

pub struct BinanceMarketDataService {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

impl BinanceMarketDataService {
    pub fn builder() -> BinanceMarketDataServiceBuilder {
        BinanceMarketDataServiceBuilder::default()
    }
}

#[derive(Default)]
pub struct BinanceMarketDataServiceBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    client: Option<ClientWithMiddleware>,
}

impl BinanceMarketDataServiceBuilder {
    pub fn api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn client(mut self, client: ClientWithMiddleware) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> BinanceMarketDataService {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        BinanceMarketDataService {
            client: self.client.unwrap_or_else(HttpClientFactory::create_client),
            api_key: self.api_key.unwrap_or_default(),
            base_url,
        }
    }
}

/// Exchange symbol for a display symbol: `BTC/USDT` and `BTC-USD` both become `BTCUSDT`.
pub fn denormalize_symbol(symbol: &str) -> String {
    let compact: String = symbol
        .chars()
        .filter(|c| *c != '/' && *c != '-')
        .collect::<String>()
        .to_uppercase();

    // Binance quotes in USDT rather than USD
    if compact.ends_with("USD") {
        format!("{}T", compact)
    } else {
        compact
    }
}

/// Parses a klines payload: `[openTime, open, high, low, close, volume, ...]` per entry,
/// prices as strings. Output is ascending by date with duplicate dates removed.
pub fn parse_klines(klines: &[serde_json::Value]) -> Result<Vec<Observation>> {
    let mut observations = klines
        .iter()
        .enumerate()
        .map(|(i, k)| parse_kline(k).with_context(|| format!("Malformed kline at index {}", i)))
        .collect::<Result<Vec<_>>>()?;

    sort_by_date_last_wins(&mut observations);
    Ok(observations)
}

fn parse_kline(kline: &serde_json::Value) -> Result<Observation> {
    let arr = kline.as_array().context("kline is not an array")?;
    if arr.len() < 6 {
        anyhow::bail!("kline has {} fields, expected at least 6", arr.len());
    }

    let open_time = arr[0].as_i64().context("open time is not an integer")?;
    let date = DateTime::<Utc>::from_timestamp_millis(open_time)
        .context("open time out of range")?
        .date_naive();

    let field = |idx: usize, name: &str| -> Result<f64> {
        let value = &arr[idx];
        let parsed = match value.as_str() {
            Some(s) => s.parse::<f64>().ok(),
            None => value.as_f64(),
        };
        parsed.with_context(|| format!("{} is not numeric: {}", name, value))
    };

    Ok(Observation {
        date,
        open: field(1, "open")?,
        high: field(2, "high")?,
        low: field(3, "low")?,
        close: field(4, "close")?,
        volume: field(5, "volume")?,
    })
}

#[async_trait]
impl MarketDataService for BinanceMarketDataService {
    async fn get_daily_history(
        &self,
        symbol: &str,
        lookback_days: usize,
    ) -> Result<Vec<Observation>> {
        let api_symbol = denormalize_symbol(symbol);
        let limit = lookback_days.clamp(1, MAX_KLINES_LIMIT).to_string();

        let url = build_url_with_query(
            &format!("{}/api/v3/klines", self.base_url),
            &[
                ("symbol", api_symbol.as_str()),
                ("interval", "1d"),
                ("limit", limit.as_str()),
            ],
        );
        debug!("BinanceMarketDataService: GET {}", url);

        let mut request = self.client.get(&url);
        if !self.api_key.is_empty() {
            request = request.header("X-MBX-APIKEY", &self.api_key);
        }

        let response = request
            .send()
            .await
            .context("Failed to fetch klines from Binance")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Binance klines fetch failed ({}): {}", status, error_text);
        }

        let klines: Vec<serde_json::Value> = response
            .json()
            .await
            .context("Failed to parse Binance klines response")?;

        let observations = parse_klines(&klines)?;
        info!(
            "BinanceMarketDataService: Fetched {} daily bars for {}",
            observations.len(),
            symbol
        );

        Ok(observations)
    }

    fn source_name(&self) -> &str {
        "binance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    const DAY_MS: i64 = 86_400_000;
    // 2024-01-01T00:00:00Z
    const JAN_1: i64 = 1_704_067_200_000;

    fn kline(open_time: i64, close: &str) -> serde_json::Value {
        json!([
            open_time, "100.0", "110.5", "95.25", close, "1234.5",
            open_time + DAY_MS - 1, "0", 10, "0", "0", "0"
        ])
    }

    #[test]
    fn test_denormalize_symbol() {
        assert_eq!(denormalize_symbol("BTC/USDT"), "BTCUSDT");
        assert_eq!(denormalize_symbol("BTC-USD"), "BTCUSDT");
        assert_eq!(denormalize_symbol("eth/usdt"), "ETHUSDT");
        assert_eq!(denormalize_symbol("ETHBTC"), "ETHBTC");
    }

    #[test]
    fn test_parse_klines() {
        let payload = vec![kline(JAN_1, "105.0"), kline(JAN_1 + DAY_MS, "107.5")];
        let observations = parse_klines(&payload).unwrap();

        assert_eq!(observations.len(), 2);
        assert_eq!(
            observations[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(observations[0].high, 110.5);
        assert_eq!(observations[0].low, 95.25);
        assert_eq!(observations[1].close, 107.5);
        assert_eq!(observations[1].volume, 1234.5);
    }

    #[test]
    fn test_parse_klines_sorts_and_dedups() {
        let payload = vec![
            kline(JAN_1 + 2 * DAY_MS, "3.0"),
            kline(JAN_1, "1.0"),
            kline(JAN_1 + DAY_MS, "2.0"),
            kline(JAN_1 + DAY_MS, "2.5"),
        ];
        let observations = parse_klines(&payload).unwrap();

        let closes: Vec<f64> = observations.iter().map(|o| o.close).collect();
        assert_eq!(closes, vec![1.0, 2.5, 3.0]);
    }

    #[test]
    fn test_malformed_kline_is_error() {
        let payload = vec![kline(JAN_1, "1.0"), json!([JAN_1, "abc", "1", "1", "1", "1"])];
        let err = parse_klines(&payload).unwrap_err();
        assert!(format!("{:#}", err).contains("index 1"));

        assert!(parse_klines(&[json!({"code": -1121})]).is_err());
    }

    #[test]
    fn test_builder_defaults() {
        let service = BinanceMarketDataService::builder()
            .base_url("http://localhost:9000/".to_string())
            .build();
        assert_eq!(service.base_url, "http://localhost:9000");
        assert_eq!(service.source_name(), "binance");
    }
}
