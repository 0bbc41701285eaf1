use crate::domain::ml::feature_registry::{FEATURE_COUNT, FEATURE_NAMES, features_to_f64_vector};
use chrono::{Duration, NaiveDate};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One trading day of OHLCV data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Sorts ascending by date. When a date repeats, the row that came last in the input
/// wins, since a re-sent daily candle is the fresher one.
pub fn sort_by_date_last_wins(observations: &mut Vec<Observation>) {
    observations.sort_by_key(|o| o.date);
    observations.reverse();
    observations.dedup_by_key(|o| o.date);
    observations.reverse();
}

/// Model input row. Field order is fixed by `FEATURE_NAMES`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub ma200: f64,
    pub rsi14: f64,
}

impl FeatureVector {
    pub fn is_finite(&self) -> bool {
        features_to_f64_vector(self).iter().all(|v| v.is_finite())
    }
}

/// Cleaned feature rows of one request, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureVector>,
    dates: Vec<NaiveDate>,
    /// Close prices of the full fetched window, including warm-up rows that were dropped
    source_closes: Vec<f64>,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureVector>, dates: Vec<NaiveDate>, source_closes: Vec<f64>) -> Self {
        debug_assert_eq!(rows.len(), dates.len());
        Self {
            rows,
            dates,
            source_closes,
        }
    }

    pub fn column_names() -> &'static [&'static str] {
        FEATURE_NAMES
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn source_closes(&self) -> &[f64] {
        &self.source_closes
    }

    pub fn last(&self) -> Option<&FeatureVector> {
        self.rows.last()
    }

    /// Rows x 7 matrix in schema order
    pub fn to_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.rows.len(), FEATURE_COUNT));
        for (mut target, row) in matrix.rows_mut().into_iter().zip(&self.rows) {
            for (cell, value) in target.iter_mut().zip(features_to_f64_vector(row)) {
                *cell = value;
            }
        }
        matrix
    }

    /// Rows x 1 matrix of close prices (the regression target)
    pub fn target_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), 1), |(i, _)| self.rows[i].close)
    }
}

/// Predicted prices, one per calendar day after the forecast origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl Trajectory {
    /// Day 1 is the day after `origin`.
    pub fn from_prices(prices: Vec<f64>, origin: NaiveDate) -> Self {
        let dates = (1..=prices.len() as i64)
            .map(|offset| origin + Duration::days(offset))
            .collect();
        Self { dates, prices }
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    /// ISO dates (`YYYY-MM-DD`)
    pub fn formatted_dates(&self) -> Vec<String> {
        self.dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DcaAction {
    Increase,
    Maintain,
    Reduce,
}

impl fmt::Display for DcaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DcaAction::Increase => write!(f, "increase"),
            DcaAction::Maintain => write!(f, "maintain"),
            DcaAction::Reduce => write!(f, "reduce"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: DcaAction,
    pub message: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub features: Vec<String>,
    pub training_period: String,
    pub mape: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub mape_30d: f64,
    pub horizon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub model_loaded: bool,
    pub model_path: String,
    pub model_type: String,
    pub features: Vec<String>,
    pub performance: ModelPerformance,
}

/// Static facts about the deployed model, reported alongside forecasts.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String,
    pub training_period: String,
    pub mape: f64,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            model_path: "models/model.onnx".to_string(),
            model_type: "LSTM".to_string(),
            training_period: "1 year".to_string(),
            mape: 3.14,
        }
    }
}

impl ModelMetadata {
    fn feature_names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_type: self.model_type.clone(),
            features: Self::feature_names(),
            training_period: self.training_period.clone(),
            mape: self.mape,
        }
    }

    pub fn status(&self, model_loaded: bool, horizon_days: usize) -> ModelStatus {
        ModelStatus {
            model_loaded,
            model_path: self.model_path.clone(),
            model_type: self.model_type.clone(),
            features: Self::feature_names(),
            performance: ModelPerformance {
                mape_30d: self.mape,
                horizon: format!("{} days rolling prediction", horizon_days),
            },
        }
    }
}

/// Response payload of one forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub current_price: f64,
    pub predicted_price_30d: f64,
    pub variation_percent: f64,
    pub confidence_score: f64,
    pub dca_recommendation: Recommendation,
    pub prediction_dates: Vec<String>,
    pub predicted_prices: Vec<f64>,
    pub model_info: ModelInfo,
}
