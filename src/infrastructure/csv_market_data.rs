use crate::domain::forecasting::{Observation, sort_by_date_last_wins};
use crate::domain::ports::MarketDataService;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// One row of a yfinance-style export. Extra columns (`Adj Close`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: Option<f64>,
    #[serde(rename = "High")]
    high: Option<f64>,
    #[serde(rename = "Low")]
    low: Option<f64>,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

/// Daily history read from a local CSV file.
pub struct CsvMarketDataService {
    path: PathBuf,
}

impl CsvMarketDataService {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Parses CSV text. Rows with an empty price field are skipped; the result is sorted
    /// ascending and a repeated date keeps its last row.
    pub fn parse(contents: &str) -> Result<Vec<Observation>> {
        let mut rdr = csv::Reader::from_reader(contents.as_bytes());
        let mut observations = Vec::new();

        for (line, result) in rdr.deserialize::<CsvRecord>().enumerate() {
            let record = result.with_context(|| format!("Invalid CSV record {}", line + 1))?;

            // Timestamps like "2024-01-01 00:00:00+00:00" keep only the date part
            let date_part = record.date.get(..10).unwrap_or(&record.date);
            let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{}'", record.date))?;

            match (
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ) {
                (Some(open), Some(high), Some(low), Some(close), Some(volume)) => {
                    observations.push(Observation {
                        date,
                        open,
                        high,
                        low,
                        close,
                        volume,
                    })
                }
                _ => warn!("Skipping {}: missing OHLCV field", date),
            }
        }

        sort_by_date_last_wins(&mut observations);
        Ok(observations)
    }
}

#[async_trait]
impl MarketDataService for CsvMarketDataService {
    async fn get_daily_history(
        &self,
        symbol: &str,
        lookback_days: usize,
    ) -> Result<Vec<Observation>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read market data file {:?}", self.path))?;

        let mut observations = Self::parse(&contents)?;
        let skip = observations.len().saturating_sub(lookback_days);
        observations.drain(..skip);

        info!(
            "CsvMarketDataService: {} daily observations for {} from {:?}",
            observations.len(),
            symbol,
            self.path
        );
        Ok(observations)
    }

    fn source_name(&self) -> &str {
        "csv"
    }
}
