//! HTTP API over the forecasting pipeline
//!
//! Routes:
//! - `GET /` service description
//! - `GET /health` liveness and model status
//! - `GET /model/status` model metadata
//! - `GET|POST /predict` one forecast
//! - `GET /metrics` Prometheus exposition

use crate::application::forecasting::PredictionOrchestrator;
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::{ForecastResult, ModelStatus};
use crate::infrastructure::observability::Metrics;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// State shared across handlers
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<PredictionOrchestrator>,
    pub metrics: Metrics,
}

impl ApiState {
    pub fn new(orchestrator: Arc<PredictionOrchestrator>, metrics: Metrics) -> Self {
        Self {
            orchestrator,
            metrics,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub predict: &'static str,
    pub model_status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ForecastResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// HTTP status for a failed forecast
pub fn status_for(err: &ForecastError) -> StatusCode {
    match err {
        ForecastError::DataUnavailable { .. } => StatusCode::BAD_GATEWAY,
        ForecastError::Configuration { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ForecastError::InsufficientData { .. } | ForecastError::PredictionFailure { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "rustcast price forecasting API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            health: "/health",
            predict: "/predict",
            model_status: "/model/status",
        },
    })
}

pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: state.orchestrator.is_model_loaded(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

pub async fn model_status(State(state): State<ApiState>) -> Json<ModelStatus> {
    Json(state.orchestrator.model_status())
}

pub async fn predict(State(state): State<ApiState>) -> (StatusCode, Json<PredictResponse>) {
    match state.orchestrator.generate_forecast().await {
        Ok(result) => (
            StatusCode::OK,
            Json(PredictResponse {
                success: true,
                data: Some(result),
                error: None,
            }),
        ),
        Err(e) => (
            status_for(&e),
            Json(PredictResponse {
                success: false,
                data: None,
                error: Some(e.to_string()),
            }),
        ),
    }
}

pub async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Any origin may call the API (browser dashboards)
pub async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    response
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/model/status", get(model_status))
        .route("/predict", get(predict).post(predict).options(preflight))
        .route("/metrics", get(metrics))
        .layer(middleware::map_response(add_cors_headers))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Unable to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C signal, shutting down.");
}

/// Serves the API until Ctrl+C
pub async fn start_server(state: ApiState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
