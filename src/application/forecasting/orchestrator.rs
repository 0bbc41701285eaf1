use super::feature_builder::FeatureBuilder;
use super::normalizer::Normalizer;
use super::rollout::{RolloutConfig, RolloutEngine};
use super::signal_policy::SignalPolicy;
use crate::application::ml::predictor::ForecastModel;
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::{
    FeatureTable, ForecastResult, ModelMetadata, ModelStatus, Trajectory,
};
use crate::domain::ports::MarketDataService;
use crate::domain::validation::ObservationValidator;
use crate::infrastructure::observability::{LatencyGuard, Metrics};
use chrono::{NaiveDate, Utc};
use statrs::statistics::Statistics;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

pub const MIN_CONFIDENCE: f64 = 0.1;

/// Tunables of one forecast request.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSettings {
    pub symbol: String,
    pub horizon: usize,
    pub lookback_days: usize,
    pub min_rows: usize,
    pub ma_period: usize,
    pub rsi_period: usize,
    pub propagate_only_price: bool,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            symbol: "BTC/USDT".to_string(),
            horizon: 30,
            lookback_days: 300,
            min_rows: 50,
            ma_period: 200,
            rsi_period: 14,
            propagate_only_price: true,
        }
    }
}

impl ForecastSettings {
    fn rollout_config(&self) -> RolloutConfig {
        RolloutConfig {
            horizon: self.horizon,
            propagate_only_price: self.propagate_only_price,
            ma_period: self.ma_period,
            rsi_period: self.rsi_period,
        }
    }
}

/// `1 - std/mean` of the trajectory, floored at `MIN_CONFIDENCE`.
pub fn confidence_score(prices: &[f64]) -> f64 {
    if prices.is_empty() {
        return MIN_CONFIDENCE;
    }

    let mean = prices.iter().mean();
    if mean == 0.0 || !mean.is_finite() {
        return MIN_CONFIDENCE;
    }

    let score = 1.0 - prices.iter().population_std_dev() / mean;
    if score.is_finite() {
        score.max(MIN_CONFIDENCE)
    } else {
        MIN_CONFIDENCE
    }
}

/// Runs one request end to end: fetch, features, scaling, rollout, recommendation.
pub struct PredictionOrchestrator {
    market_data: Arc<dyn MarketDataService>,
    model: Arc<dyn ForecastModel>,
    settings: ForecastSettings,
    metadata: ModelMetadata,
    policy: SignalPolicy,
    feature_builder: FeatureBuilder,
    metrics: Option<Metrics>,
}

impl PredictionOrchestrator {
    pub fn new(
        market_data: Arc<dyn MarketDataService>,
        model: Arc<dyn ForecastModel>,
        settings: ForecastSettings,
        metadata: ModelMetadata,
    ) -> Self {
        let policy = SignalPolicy::new(settings.horizon);
        let feature_builder =
            FeatureBuilder::new(settings.ma_period, settings.rsi_period, settings.min_rows);

        Self {
            market_data,
            model,
            settings,
            metadata,
            policy,
            feature_builder,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        metrics.set_model_loaded(self.model.is_loaded());
        self.metrics = Some(metrics);
        self
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    pub fn model_status(&self) -> ModelStatus {
        self.metadata.status(self.model.is_loaded(), self.settings.horizon)
    }

    pub async fn generate_forecast(&self) -> Result<ForecastResult, ForecastError> {
        self.generate_forecast_at(Utc::now().date_naive()).await
    }

    /// Forecast with trajectory dates counted from `today`.
    pub async fn generate_forecast_at(
        &self,
        today: NaiveDate,
    ) -> Result<ForecastResult, ForecastError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("forecast", %request_id, symbol = %self.settings.symbol);

        let _latency = self
            .metrics
            .as_ref()
            .map(|m| LatencyGuard::new(m.forecast_latency_seconds.clone()));

        let outcome = self.run_pipeline(today).instrument(span.clone()).await;

        let _enter = span.enter();
        match &outcome {
            Ok(result) => {
                info!(
                    "Forecast ready: {:.2} -> {:.2} ({:+.2}%), action={}",
                    result.current_price,
                    result.predicted_price_30d,
                    result.variation_percent,
                    result.dca_recommendation.action
                );
                if let Some(metrics) = &self.metrics {
                    metrics.inc_forecasts("success");
                    metrics.record_forecast(result.predicted_price_30d, result.confidence_score);
                }
            }
            Err(e) => {
                error!("Forecast failed: {}", e);
                if let Some(metrics) = &self.metrics {
                    metrics.inc_forecasts(e.kind());
                }
            }
        }

        outcome
    }

    async fn run_pipeline(&self, today: NaiveDate) -> Result<ForecastResult, ForecastError> {
        if !self.model.is_loaded() {
            return Err(ForecastError::configuration("model not loaded"));
        }

        let observations = self
            .market_data
            .get_daily_history(&self.settings.symbol, self.settings.lookback_days)
            .await
            .map_err(|e| {
                ForecastError::data_unavailable(format!(
                    "{} fetch failed: {:#}",
                    self.market_data.source_name(),
                    e
                ))
            })?;

        if observations.is_empty() {
            return Err(ForecastError::data_unavailable(format!(
                "{} returned no observations for {}",
                self.market_data.source_name(),
                self.settings.symbol
            )));
        }
        ObservationValidator::validate_series(&observations)?;
        info!(
            "Fetched {} daily observations from {}",
            observations.len(),
            self.market_data.source_name()
        );

        let table = self.feature_builder.build(&observations)?;
        if let (Some(first), Some(last)) = (table.dates().first(), table.dates().last()) {
            debug!("Feature window {} to {} ({} rows)", first, last, table.len());
        }
        self.forecast_from_table(&table, today)
    }

    /// Synchronous half of the pipeline, from a built feature table onwards.
    pub fn forecast_from_table(
        &self,
        table: &FeatureTable,
        today: NaiveDate,
    ) -> Result<ForecastResult, ForecastError> {
        let current_price = table
            .last()
            .map(|row| row.close)
            .ok_or(ForecastError::InsufficientData {
                rows: 0,
                required: self.feature_builder.min_rows(),
            })?;

        let (normalizer, scaled) = Normalizer::fit(table)?;
        let last_row = scaled.row(scaled.nrows() - 1);

        let engine = RolloutEngine::new(
            self.model.as_ref(),
            &normalizer,
            self.settings.rollout_config(),
        );
        let prices = engine.run(last_row, table.source_closes())?;
        let trajectory = Trajectory::from_prices(prices, today);

        let predicted = trajectory
            .last_price()
            .ok_or_else(|| ForecastError::prediction_failure("empty trajectory"))?;

        let variation = SignalPolicy::variation_percent(current_price, predicted);
        if !variation.is_finite() {
            return Err(ForecastError::prediction_failure(format!(
                "non-finite variation from {} to {}",
                current_price, predicted
            )));
        }

        Ok(ForecastResult {
            current_price,
            predicted_price_30d: predicted,
            variation_percent: variation,
            confidence_score: confidence_score(trajectory.prices()),
            dca_recommendation: self.policy.recommend(variation),
            prediction_dates: trajectory.formatted_dates(),
            predicted_prices: trajectory.prices().to_vec(),
            model_info: self.metadata.info(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecasting::DcaAction;
    use crate::infrastructure::mock::{
        MockForecastModel, MockMarketDataService, constant_observations, trending_observations,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn orchestrator(
        market_data: MockMarketDataService,
        model: MockForecastModel,
    ) -> PredictionOrchestrator {
        PredictionOrchestrator::new(
            Arc::new(market_data),
            Arc::new(model),
            ForecastSettings::default(),
            ModelMetadata::default(),
        )
    }

    #[test]
    fn test_confidence_floor() {
        assert_eq!(confidence_score(&[100.0; 30]), 1.0);
        assert_eq!(confidence_score(&[]), MIN_CONFIDENCE);
        assert_eq!(confidence_score(&[0.0, 0.0]), MIN_CONFIDENCE);
        assert_eq!(confidence_score(&[1.0, 1000.0, 1.0, 1000.0]), MIN_CONFIDENCE);
        assert_eq!(confidence_score(&[-5.0, 5.0]), MIN_CONFIDENCE);
    }

    #[test]
    fn test_confidence_uses_population_std() {
        // mean 100, population std 10
        let score = confidence_score(&[90.0, 110.0]);
        assert!((score - 0.9).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_constant_market_echo_model() {
        let orchestrator = orchestrator(
            MockMarketDataService::with_observations(constant_observations(300, 100.0, today())),
            MockForecastModel::echo(),
        );

        let result = orchestrator.generate_forecast_at(today()).await.unwrap();

        assert_eq!(result.predicted_prices, vec![100.0; 30]);
        assert_eq!(result.current_price, 100.0);
        assert_eq!(result.variation_percent, 0.0);
        assert_eq!(result.dca_recommendation.action, DcaAction::Maintain);
        assert_eq!(result.prediction_dates[0], "2024-06-02");
        assert_eq!(result.prediction_dates[29], "2024-07-01");
        assert_eq!(result.model_info.features.len(), 7);
    }

    #[tokio::test]
    async fn test_model_not_loaded_short_circuits() {
        let market_data = Arc::new(MockMarketDataService::new());
        let orchestrator = PredictionOrchestrator::new(
            market_data.clone(),
            Arc::new(MockForecastModel::not_loaded()),
            ForecastSettings::default(),
            ModelMetadata::default(),
        );

        let err = orchestrator.generate_forecast().await.unwrap_err();
        assert_eq!(err, ForecastError::configuration("model not loaded"));
        assert_eq!(market_data.request_count(), 0);
        assert!(!orchestrator.model_status().model_loaded);
    }

    #[tokio::test]
    async fn test_empty_history_is_unavailable() {
        let orchestrator = orchestrator(
            MockMarketDataService::with_observations(vec![]),
            MockForecastModel::echo(),
        );

        let err = orchestrator.generate_forecast().await.unwrap_err();
        assert_eq!(err.kind(), "data_unavailable");
    }

    #[tokio::test]
    async fn test_metrics_record_outcomes() {
        let metrics = Metrics::new().unwrap();
        let orchestrator = orchestrator(
            MockMarketDataService::with_observations(trending_observations(
                300,
                100.0,
                1.0,
                today(),
            )),
            MockForecastModel::echo(),
        )
        .with_metrics(metrics.clone());

        orchestrator.generate_forecast_at(today()).await.unwrap();

        let output = metrics.render();
        assert!(output.contains("rustcast_forecasts_total{outcome=\"success\"} 1"));
        assert!(output.contains("rustcast_model_loaded 1"));
        assert!(output.contains("rustcast_forecast_latency_seconds_count 1"));
    }
}
