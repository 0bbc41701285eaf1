use crate::application::ml::predictor::ForecastModel;
use crate::domain::forecasting::Observation;
use crate::domain::ports::MarketDataService;
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use ndarray::ArrayView3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

enum MockSource {
    RandomWalk { seed: u64, start_price: f64 },
    Fixed(Vec<Observation>),
    Unavailable(String),
}

/// Offline market data: a seeded random walk, a fixed list, or a forced outage.
pub struct MockMarketDataService {
    source: MockSource,
    end_date: Option<NaiveDate>,
    requests: AtomicUsize,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self::random_walk(42, 96_000.0)
    }

    pub fn random_walk(seed: u64, start_price: f64) -> Self {
        Self {
            source: MockSource::RandomWalk { seed, start_price },
            end_date: None,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn with_observations(observations: Vec<Observation>) -> Self {
        Self {
            source: MockSource::Fixed(observations),
            end_date: None,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            source: MockSource::Unavailable(reason.into()),
            end_date: None,
            requests: AtomicUsize::new(0),
        }
    }

    /// Pins the last generated date (random walk only); defaults to today (UTC)
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn generate(&self, seed: u64, start_price: f64, days: usize) -> Vec<Observation> {
        let mut rng = StdRng::seed_from_u64(seed);
        let end = self.end_date.unwrap_or_else(|| Utc::now().date_naive());
        let mut close = start_price;

        (0..days)
            .map(|i| {
                let open = close;
                let change: f64 = rng.random_range(-0.03..0.03);
                close = (open * (1.0 + change)).max(0.01);
                let wick: f64 = rng.random_range(0.0..0.01);

                Observation {
                    date: end - Duration::days((days - 1 - i) as i64),
                    open,
                    high: open.max(close) * (1.0 + wick),
                    low: open.min(close) * (1.0 - wick),
                    close,
                    volume: rng.random_range(1_000.0..50_000.0),
                }
            })
            .collect()
    }
}

impl Default for MockMarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn get_daily_history(
        &self,
        symbol: &str,
        lookback_days: usize,
    ) -> Result<Vec<Observation>> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let observations = match &self.source {
            MockSource::RandomWalk { seed, start_price } => {
                self.generate(*seed, *start_price, lookback_days)
            }
            MockSource::Fixed(observations) => {
                let skip = observations.len().saturating_sub(lookback_days);
                observations[skip..].to_vec()
            }
            MockSource::Unavailable(reason) => bail!("{}", reason),
        };

        info!(
            "MockMarketDataService: {} daily observations for {}",
            observations.len(),
            symbol
        );
        Ok(observations)
    }

    fn source_name(&self) -> &str {
        "mock"
    }
}

/// `days` observations with every price at `price`, ending the day before `end`.
pub fn constant_observations(days: usize, price: f64, end: NaiveDate) -> Vec<Observation> {
    trending_observations(days, price, 0.0, end)
}

/// Linear close series `start + i * step`, ending the day before `end`.
pub fn trending_observations(
    days: usize,
    start: f64,
    step: f64,
    end: NaiveDate,
) -> Vec<Observation> {
    (0..days)
        .map(|i| {
            let close = start + i as f64 * step;
            Observation {
                date: end - Duration::days((days - i) as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000.0,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockModelBehaviour {
    /// Returns the scaled close it was given
    EchoClose,
    /// Always returns this scaled value
    Constant(f64),
    /// Scaled close plus a fixed increment
    Drift(f64),
    NonFinite,
    Failing,
    /// Echoes for `n` calls, then fails
    FailAfter(usize),
    /// Returns the scaled feature at this index
    EchoFeature(usize),
}

/// Deterministic `ForecastModel` stub that counts its calls.
pub struct MockForecastModel {
    behaviour: MockModelBehaviour,
    loaded: bool,
    calls: AtomicUsize,
}

impl MockForecastModel {
    pub fn new(behaviour: MockModelBehaviour) -> Self {
        Self {
            behaviour,
            loaded: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockModelBehaviour::EchoClose)
    }

    pub fn not_loaded() -> Self {
        Self {
            behaviour: MockModelBehaviour::Failing,
            loaded: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ForecastModel for MockForecastModel {
    fn infer(&self, input: ArrayView3<'_, f32>) -> Result<f64, String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let close = input
            .iter()
            .next()
            .copied()
            .ok_or_else(|| "empty input".to_string())? as f64;

        match self.behaviour {
            MockModelBehaviour::EchoClose => Ok(close),
            MockModelBehaviour::Constant(value) => Ok(value),
            MockModelBehaviour::Drift(step) => Ok(close + step),
            MockModelBehaviour::NonFinite => Ok(f64::NAN),
            MockModelBehaviour::Failing => Err("mock inference failure".to_string()),
            MockModelBehaviour::FailAfter(n) if call > n => {
                Err(format!("mock inference failure on call {}", call))
            }
            MockModelBehaviour::FailAfter(_) => Ok(close),
            MockModelBehaviour::EchoFeature(index) => input
                .get((0, 0, index))
                .map(|v| *v as f64)
                .ok_or_else(|| format!("no feature at index {}", index)),
        }
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn name(&self) -> &str {
        "Mock"
    }

    fn version(&self) -> &str {
        "test"
    }
}
