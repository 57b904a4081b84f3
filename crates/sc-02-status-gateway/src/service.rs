//! Status gateway service - HTTP entry point.
//!
//! Serves `POST /check_status`, `GET /health` and `GET /metrics`.

use crate::domain::config::GatewayConfig;
use crate::domain::error::{ApiError, GatewayError};
use crate::middleware::{GatewayMetrics, RequestTimer, TimeoutLayer, TracingLayer};
use crate::wire;
use crate::SERVICE_NAME;
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sc_01_auth_protocol::{SubscriptionStatusApi, SubscriptionStatusService};
use sc_telemetry::log_auth_event;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, info, warn};

/// Shared handler state
#[derive(Clone)]
struct AppState {
    api: Arc<dyn SubscriptionStatusApi>,
    metrics: Arc<GatewayMetrics>,
    uniform_errors: bool,
}

/// Triggers graceful shutdown of a running gateway.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) also
/// stops the server.
pub struct ShutdownHandle(oneshot::Sender<()>);

impl ShutdownHandle {
    pub fn shutdown(self) {
        let _ = self.0.send(());
    }
}

/// Status gateway service state
pub struct StatusGatewayService {
    config: GatewayConfig,
    api: Arc<dyn SubscriptionStatusApi>,
    metrics: Arc<GatewayMetrics>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    shutdown_rx: Option<oneshot::Receiver<()>>,
}

impl StatusGatewayService {
    /// Create a gateway backed by an in-memory key store seeded from
    /// `config.users` and the system clock.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let store = config.build_key_store()?;
        if store.is_empty() {
            warn!("No users configured; every status check will be rejected");
        }
        let api = SubscriptionStatusService::with_system_clock(store, config.auth_policy());
        Self::with_api(config, Arc::new(api))
    }

    /// Create a gateway in front of any [`SubscriptionStatusApi`].
    pub fn with_api(
        config: GatewayConfig,
        api: Arc<dyn SubscriptionStatusApi>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        Ok(Self {
            config,
            api,
            metrics: Arc::new(GatewayMetrics::new()),
            shutdown_tx: Some(shutdown_tx),
            shutdown_rx: Some(shutdown_rx),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Take the shutdown handle. Returns `None` after the first call.
    pub fn shutdown_handle(&mut self) -> Option<ShutdownHandle> {
        self.shutdown_tx.take().map(ShutdownHandle)
    }

    /// Build the HTTP router with its middleware stack.
    pub fn router(&self) -> Router {
        let state = AppState {
            api: Arc::clone(&self.api),
            metrics: Arc::clone(&self.metrics),
            uniform_errors: self.config.auth.uniform_errors,
        };

        Router::new()
            .route("/check_status", post(check_status))
            .route("/health", get(health_check))
            .route("/metrics", get(metrics))
            .layer(
                TimeoutLayer::new(self.config.timeouts.request)
                    .with_metrics(Arc::clone(&self.metrics)),
            )
            .layer(RequestBodyLimitLayer::new(self.config.limits.max_request_size))
            .layer(TracingLayer::new())
            .with_state(state)
    }

    /// Bind the configured address and serve until Ctrl+C or shutdown.
    pub async fn start(self) -> Result<(), GatewayError> {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl+C or shutdown.
    pub async fn serve(mut self, listener: TcpListener) -> Result<(), GatewayError> {
        let router = self.router();
        let shutdown_rx = self.shutdown_rx.take();
        let addr = listener.local_addr()?;

        info!(
            addr = %addr,
            freshness_window_secs = self.config.auth.freshness_window.map(|w| w.as_secs()),
            uniform_errors = self.config.auth.uniform_errors,
            "Status gateway listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal(shutdown_rx))
            .await?;

        info!("Status gateway stopped");
        Ok(())
    }
}

async fn shutdown_signal(shutdown_rx: Option<oneshot::Receiver<()>>) {
    let requested = async {
        match shutdown_rx {
            Some(rx) => {
                let _ = rx.await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C"),
        _ = requested => info!("Received shutdown signal"),
    }
}

/// `POST /check_status`
async fn check_status(State(state): State<AppState>, body: Bytes) -> Response {
    let fields = wire::parse_request(&body);
    let timer = RequestTimer::new(Arc::clone(&state.metrics));
    let outcome = state.api.check_status(&fields);
    timer.finish(&outcome);

    match outcome {
        Ok(response) => {
            log_auth_event!(
                info,
                SERVICE_NAME,
                "Status check answered",
                response.user_id,
                active = response.active
            );
            Json(response).into_response()
        }
        Err(e) => {
            let user_id = fields.user_id.as_deref().unwrap_or("-");
            log_auth_event!(
                warn,
                SERVICE_NAME,
                "Status check rejected",
                user_id,
                reason = e.kind()
            );
            debug!(detail = %e, "Rejection detail");
            ApiError::from_auth(&e, state.uniform_errors).into_response()
        }
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `GET /metrics`
async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}
