use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::forecasting::PredictionOrchestrator;
use crate::application::ml::ForecastModel;
use crate::config::{Config, Mode};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::factory::ServiceFactory;
use crate::infrastructure::observability::Metrics;

/// Outcome of one startup check
#[derive(Debug, Clone, PartialEq)]
pub struct PrerequisiteCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// Wired process-wide services.
pub struct Application {
    pub config: Config,
    pub market_service: Arc<dyn MarketDataService>,
    pub model: Arc<dyn ForecastModel>,
    pub orchestrator: Arc<PredictionOrchestrator>,
    pub metrics: Metrics,
}

impl Application {
    pub fn build(config: Config) -> Result<Self> {
        info!("Building rustcast application (Mode: {:?})...", config.mode);

        let market_service = ServiceFactory::create_market_data(&config);
        let model = ServiceFactory::create_model(&config);
        Self::from_parts(config, market_service, model)
    }

    /// Wires an application around injected services.
    pub fn from_parts(
        config: Config,
        market_service: Arc<dyn MarketDataService>,
        model: Arc<dyn ForecastModel>,
    ) -> Result<Self> {
        let metrics = Metrics::new()?;

        if model.is_loaded() {
            info!("Model ready: {} {}", model.name(), model.version());
        } else {
            warn!(
                "Model not loaded from {:?}; forecasts will be refused until restart",
                config.model.path
            );
        }

        let orchestrator = PredictionOrchestrator::new(
            market_service.clone(),
            model.clone(),
            config.forecast.settings(&config.market_data.symbol),
            config.model.metadata(),
        )
        .with_metrics(metrics.clone());

        Ok(Self {
            config,
            market_service,
            model,
            orchestrator: Arc::new(orchestrator),
            metrics,
        })
    }

    /// Filesystem prerequisites for the configured mode. Nothing is loaded.
    pub fn check_prerequisites(config: &Config) -> Vec<PrerequisiteCheck> {
        let mut checks = Vec::new();

        let model_path = &config.model.path;
        checks.push(PrerequisiteCheck {
            name: "model artifact".to_string(),
            passed: model_path.is_file(),
            detail: format!("{} ({:?})", model_path.display(), config.model.backend),
        });

        if config.mode == Mode::Csv {
            let csv_path = &config.market_data.csv_path;
            checks.push(PrerequisiteCheck {
                name: "market data file".to_string(),
                passed: csv_path.is_file(),
                detail: csv_path.display().to_string(),
            });
        }

        for check in &checks {
            if check.passed {
                info!("[OK] {}: {}", check.name, check.detail);
            } else {
                warn!("[MISSING] {}: {}", check.name, check.detail);
            }
        }

        checks
    }
}
