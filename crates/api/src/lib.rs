//! Healthcare Cost Estimator API Server
//!
//! REST API serving cost estimates, the form's field choices, and
//! feedback acknowledgement.

use anyhow::Context;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use inference_engine::CostEstimator;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

pub mod error;
pub mod rate_limit;
mod routes;
pub mod settings;

pub use error::{ApiError, LoggingError};
pub use rate_limit::{create_governor_config, DefaultGovernorConfig, RateLimitConfig};
pub use settings::{LoggingConfig, ServerConfig, Settings};

/// Application state shared across handlers. Read-only after startup.
pub struct AppState {
    /// Feature builder and model
    pub estimator: CostEstimator,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Prometheus exporter, when installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(estimator: CostEstimator) -> Self {
        Self {
            estimator,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Attach an installed Prometheus exporter
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub type SharedState = Arc<AppState>;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: String,
}

/// Create the application router. Estimate routes are rate limited per
/// peer IP when a governor config is given.
pub fn create_router(state: SharedState, rate_limit: Option<Arc<DefaultGovernorConfig>>) -> Router {
    let mut estimates = Router::new()
        .route("/api/v1/estimates", post(routes::estimates::post_estimate))
        .route(
            "/api/v1/estimates/batch",
            post(routes::estimates::post_estimate_batch),
        );
    if let Some(config) = rate_limit {
        estimates = estimates.layer(GovernorLayer { config });
    }

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/fields", get(routes::fields::get_fields))
        .route("/api/v1/feedback", post(routes::feedback::post_feedback))
        .route("/metrics", get(metrics_handler))
        .merge(estimates)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: state.estimator.model_kind().to_string(),
    })
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<SharedState>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(ApiError::MetricsDisabled)
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let builder = FmtSubscriber::builder()
        .with_max_level(config.max_level()?)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Load the artifacts and run the server until Ctrl-C
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let context = settings
        .artifacts
        .load(settings.validation.clone())
        .context("failed to load model artifacts")?;
    let estimator = CostEstimator::new(context);

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install metrics recorder")?;
    let state = Arc::new(AppState::new(estimator).with_metrics(metrics));

    let governor = create_governor_config(&settings.rate_limit)
        .context("rate limit per_second and burst_size must be non-zero")?;
    let app = create_router(state, Some(governor));

    info!("Starting API server on {}", settings.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind_addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
