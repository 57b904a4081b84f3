//! Timeout middleware.
//!
//! Cuts off any request that runs past the configured limit and answers
//! `503 {"error":"request timeout"}`.

use super::metrics::GatewayMetrics;
use crate::domain::error::ApiError;
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tower::{Layer, Service};
use tracing::warn;

/// Timeout layer
#[derive(Clone)]
pub struct TimeoutLayer {
    limit: Duration,
    metrics: Option<Arc<GatewayMetrics>>,
}

impl TimeoutLayer {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            metrics: None,
        }
    }

    /// Count timeouts in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService {
            inner,
            limit: self.limit,
            metrics: self.metrics.clone(),
        }
    }
}

/// Timeout service
#[derive(Clone)]
pub struct TimeoutService<S> {
    inner: S,
    limit: Duration,
    metrics: Option<Arc<GatewayMetrics>>,
}

impl<S> Service<Request<Body>> for TimeoutService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let limit = self.limit;
        let metrics = self.metrics.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match timeout(limit, inner.call(req)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "Request timed out");
                    if let Some(metrics) = metrics {
                        metrics.record_timeout();
                    }
                    Ok(ApiError::timeout().into_response())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    fn app(limit: Duration, metrics: Arc<GatewayMetrics>) -> Router {
        Router::new()
            .route("/fast", get(|| async { "ok" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .layer(TimeoutLayer::new(limit).with_metrics(metrics))
    }

    #[tokio::test]
    async fn test_fast_request_passes() {
        let metrics = Arc::new(GatewayMetrics::new());
        let response = app(Duration::from_millis(200), Arc::clone(&metrics))
            .oneshot(Request::get("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(metrics.timeouts.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let metrics = Arc::new(GatewayMetrics::new());
        let response = app(Duration::from_millis(20), Arc::clone(&metrics))
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(metrics.timeouts.load(Ordering::Relaxed), 1);
    }
}
