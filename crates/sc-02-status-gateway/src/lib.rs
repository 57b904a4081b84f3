//! # Status Gateway (SC-02)
//!
//! HTTP front end for signed subscription status checks.
//!
//! ## Endpoints
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `POST` | `/check_status` | signed status, or `{"error": ...}` with 400/401 |
//! | `GET` | `/health` | service name and version |
//! | `GET` | `/metrics` | request and rejection counters as JSON |
//!
//! ## Middleware
//!
//! Request → Tracing → BodyLimit → Timeout → Handler

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod service;
pub mod wire;

pub use domain::{
    messages, ApiError, AuthConfig, ConfigError, GatewayConfig, GatewayError, HttpConfig,
    LimitsConfig, TimeoutConfig, UserConfig,
};
pub use middleware::GatewayMetrics;
pub use service::{ShutdownHandle, StatusGatewayService};

/// Service name reported by `/health` and attached to logs
pub const SERVICE_NAME: &str = "status-gateway";
