//! Health and Board Server - Probes, Display Feed, Metrics
//!
//! Exposes via axum 0.7:
//! - `/live`: process is up
//! - `/ready`: session is armed, not finalized, and the store is writable
//! - `/board`: current Rising/Falling board as JSON
//! - `/metrics`: Prometheus text format

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::sync::{RwLock, broadcast, watch};
use tracing::{error, info, instrument};

use super::prometheus::MetricsRegistry;
use crate::domain::{Session, TrendBoard};
use crate::ports::repository::ReportStore;

/// Shared state read by every handler.
#[derive(Clone)]
pub struct HealthState {
    /// Tracker session.
    pub session: Arc<RwLock<Session>>,
    /// Latest board published by the tracker.
    pub board: watch::Receiver<TrendBoard>,
    /// Metrics registry.
    pub metrics: Arc<MetricsRegistry>,
    /// Report store, checked for writability.
    pub store: Arc<dyn ReportStore>,
}

impl HealthState {
    /// Ready while a session is armed and not yet finalized.
    pub async fn is_ready(&self) -> bool {
        let live = {
            let session = self.session.read().await;
            session.is_armed() && !session.is_finalized()
        };
        live && self.store.is_healthy().await
    }
}

/// Axum-based health/board HTTP server.
pub struct HealthServer {
    /// State shared with handlers.
    state: HealthState,
    /// Bind address, e.g. `0.0.0.0:9090`.
    bind_address: String,
}

impl HealthServer {
    /// Create a new server.
    pub fn new(state: HealthState, bind_address: impl Into<String>) -> Self {
        Self {
            state,
            bind_address: bind_address.into(),
        }
    }

    /// Routes, separated from `run` for in-process tests.
    pub fn router(state: HealthState) -> Router {
        Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .route("/board", get(Self::board))
            .route("/metrics", get(Self::metrics))
            .with_state(state)
    }

    /// Serve until the shutdown signal fires.
    #[instrument(skip(self, shutdown_rx), fields(address = %self.bind_address))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = Self::router(self.state);
        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;

        info!("Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness check: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness check.
    async fn readiness(State(state): State<HealthState>) -> impl IntoResponse {
        if state.is_ready().await {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }

    /// Snapshot of the current board.
    async fn board(State(state): State<HealthState>) -> Json<TrendBoard> {
        Json(state.board.borrow().clone())
    }

    async fn metrics(State(state): State<HealthState>) -> impl IntoResponse {
        match state.metrics.encode() {
            Ok(body) => (StatusCode::OK, body),
            Err(e) => {
                error!(error = %e, "Failed to encode metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, String::new())
            }
        }
    }
}
