//! Prometheus metrics definitions for rustcast
//!
//! All metrics use the `rustcast_` prefix.

use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the forecasting service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Forecast requests by outcome (`success` or a `ForecastError` kind)
    pub forecasts_total: CounterVec,
    /// End-to-end latency of one forecast request
    pub forecast_latency_seconds: Histogram,
    /// Horizon-end price of the last successful forecast
    pub last_predicted_price: GenericGauge<AtomicF64>,
    /// Confidence score of the last successful forecast
    pub last_confidence_score: GenericGauge<AtomicF64>,
    /// 1 when a model artifact is loaded
    pub model_loaded: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let forecasts_total = CounterVec::new(
            Opts::new("rustcast_forecasts_total", "Forecast requests by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(forecasts_total.clone()))?;

        let forecast_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "rustcast_forecast_latency_seconds",
                "Forecast request latency in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(forecast_latency_seconds.clone()))?;

        let last_predicted_price = Gauge::with_opts(Opts::new(
            "rustcast_last_predicted_price",
            "Horizon-end price of the last forecast",
        ))?;
        registry.register(Box::new(last_predicted_price.clone()))?;

        let last_confidence_score = Gauge::with_opts(Opts::new(
            "rustcast_last_confidence_score",
            "Confidence score of the last forecast (0.1-1)",
        ))?;
        registry.register(Box::new(last_confidence_score.clone()))?;

        let model_loaded = Gauge::with_opts(Opts::new(
            "rustcast_model_loaded",
            "Model artifact status (0=missing, 1=loaded)",
        ))?;
        registry.register(Box::new(model_loaded.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            forecasts_total,
            forecast_latency_seconds,
            last_predicted_price,
            last_confidence_score,
            model_loaded,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_forecasts(&self, outcome: &str) {
        self.forecasts_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_forecast(&self, predicted_price: f64, confidence: f64) {
        self.last_predicted_price.set(predicted_price);
        self.last_confidence_score.set(confidence);
    }

    pub fn set_model_loaded(&self, loaded: bool) {
        self.model_loaded.set(if loaded { 1.0 } else { 0.0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_forecasts("success");
        assert!(metrics.render().contains("rustcast_"));
    }

    #[test]
    fn test_forecast_gauges() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.record_forecast(50000.0, 0.5);
        metrics.set_model_loaded(true);

        let output = metrics.render();
        assert!(output.contains("rustcast_last_predicted_price 50000"));
        assert!(output.contains("rustcast_last_confidence_score 0.5"));
        assert!(output.contains("rustcast_model_loaded 1"));
    }

    #[test]
    fn test_outcome_counter() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_forecasts("success");
        metrics.inc_forecasts("data_unavailable");

        let output = metrics.render();
        assert!(output.contains("rustcast_forecasts_total{outcome=\"success\"} 1"));
        assert!(output.contains("outcome=\"data_unavailable\""));
    }
}
