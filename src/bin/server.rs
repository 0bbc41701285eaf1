//! rustcast Server - forecasting HTTP API
//!
//! Loads the model once at startup and serves forecasts over HTTP. A missing model
//! artifact does not stop the server: `/health` and `/model/status` report it and
//! `/predict` answers 503 until the artifact is provided and the server restarted.
//!
//! # Usage
//! ```sh
//! MODE=binance MODEL_PATH=models/model.onnx cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `SERVER_BIND_ADDRESS` - Bind address (default: 0.0.0.0)
//! - `SERVER_PORT` - Port (default: 5001)
//! - `RUST_LOG` - Extra tracing directives

use anyhow::Result;
use rustcast::application::system::Application;
use rustcast::config::Config;
use rustcast::interfaces::api::{ApiState, start_server};
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("rustcast Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Mode={:?}, Symbol={}, Horizon={}d, Lookback={}d",
        config.mode,
        config.market_data.symbol,
        config.forecast.horizon_days,
        config.forecast.lookback_days
    );

    let checks = Application::check_prerequisites(&config);
    if checks.iter().any(|c| !c.passed) {
        warn!("Startup checks incomplete; starting in degraded mode");
    }

    let addr = config.server.socket_addr()?;
    let app = Application::build(config)?;
    let state = ApiState::new(app.orchestrator.clone(), app.metrics.clone());

    start_server(state, addr).await?;

    info!("Server stopped.");
    Ok(())
}
