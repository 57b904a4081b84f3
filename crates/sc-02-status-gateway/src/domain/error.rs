//! Gateway error types and their HTTP rendering.
//!
//! Every error body is `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sc_01_auth_protocol::AuthError;
use std::fmt;

/// Error messages as they appear on the wire
pub mod messages {
    pub const INVALID_REQUEST: &str = "invalid request";
    pub const UNKNOWN_USER: &str = "unknown user";
    pub const INVALID_HMAC: &str = "invalid hmac";
    pub const STALE_REQUEST: &str = "stale request";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const REQUEST_TIMEOUT: &str = "request timeout";
}

/// An error answered to the HTTP caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    /// Map a protocol rejection to its HTTP form.
    ///
    /// With `uniform` set, every 401 carries the same message so callers
    /// cannot probe which user ids exist.
    pub fn from_auth(error: &AuthError, uniform: bool) -> Self {
        match error {
            AuthError::MalformedRequest { .. } => {
                Self::new(StatusCode::BAD_REQUEST, messages::INVALID_REQUEST)
            }
            _ if uniform => Self::new(StatusCode::UNAUTHORIZED, messages::UNAUTHORIZED),
            AuthError::UnknownUser => Self::new(StatusCode::UNAUTHORIZED, messages::UNKNOWN_USER),
            AuthError::InvalidTag => Self::new(StatusCode::UNAUTHORIZED, messages::INVALID_HMAC),
            AuthError::StaleRequest { .. } => {
                Self::new(StatusCode::UNAUTHORIZED, messages::STALE_REQUEST)
            }
        }
    }

    /// Request exceeded the configured timeout
    pub fn timeout() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, messages::REQUEST_TIMEOUT)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Gateway-level errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// The HTTP server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

impl From<crate::domain::config::ConfigError> for GatewayError {
    fn from(e: crate::domain::config::ConfigError) -> Self {
        GatewayError::Config(e.to_string())
    }
}
