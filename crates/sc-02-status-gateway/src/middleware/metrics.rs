//! Request outcome metrics.
//!
//! Exposed as JSON on `GET /metrics`.

use sc_01_auth_protocol::AuthError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Status gateway metrics
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_accepted: AtomicU64,

    // Rejections by reason
    pub rejected_malformed: AtomicU64,
    pub rejected_unknown_user: AtomicU64,
    pub rejected_invalid_tag: AtomicU64,
    pub rejected_stale: AtomicU64,

    // Requests cut off by the timeout layer
    pub timeouts: AtomicU64,

    // Latency tracking
    pub total_latency_us: AtomicU64,
    pub request_count_for_latency: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a status check answered with a signed response
    pub fn record_accepted(&self, latency_us: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.requests_accepted.fetch_add(1, Ordering::Relaxed);
        self.record_latency(latency_us);
    }

    /// Record a status check rejected by the authenticator
    pub fn record_rejected(&self, error: &AuthError, latency_us: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        let counter = match error {
            AuthError::MalformedRequest { .. } => &self.rejected_malformed,
            AuthError::UnknownUser => &self.rejected_unknown_user,
            AuthError::InvalidTag => &self.rejected_invalid_tag,
            AuthError::StaleRequest { .. } => &self.rejected_stale,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.record_latency(latency_us);
    }

    /// Record a request timeout
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    fn record_latency(&self, latency_us: u64) {
        self.total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        self.request_count_for_latency
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_us.load(Ordering::Relaxed);
        let count = self.request_count_for_latency.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64 / 1000.0
        }
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        let accepted = self.requests_accepted.load(Ordering::Relaxed);
        let total = self.requests_total.load(Ordering::Relaxed);
        serde_json::json!({
            "requests": {
                "total": total,
                "accepted": accepted,
                "rejected": total.saturating_sub(accepted),
            },
            "rejections": {
                "malformed_request": self.rejected_malformed.load(Ordering::Relaxed),
                "unknown_user": self.rejected_unknown_user.load(Ordering::Relaxed),
                "invalid_tag": self.rejected_invalid_tag.load(Ordering::Relaxed),
                "stale_request": self.rejected_stale.load(Ordering::Relaxed),
            },
            "timeouts": self.timeouts.load(Ordering::Relaxed),
            "latency": {
                "average_ms": self.average_latency_ms(),
            }
        })
    }
}

/// Request timing helper
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<GatewayMetrics>,
}

impl RequestTimer {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    pub fn finish<T>(self, outcome: &Result<T, AuthError>) {
        let latency_us = self.start.elapsed().as_micros() as u64;
        match outcome {
            Ok(_) => self.metrics.record_accepted(latency_us),
            Err(e) => self.metrics.record_rejected(e, latency_us),
        }
    }
}
