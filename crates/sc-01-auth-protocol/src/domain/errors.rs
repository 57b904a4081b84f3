//! # Protocol Errors
//!
//! Error types for request authentication, key material and provisioning.

use thiserror::Error;

/// Errors that terminate an authentication attempt.
///
/// Every variant carries only non-secret context. The expected tag and any
/// byte-level comparison detail are never part of an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// A required field is missing, empty, or not of the expected type
    #[error("malformed request: invalid or missing `{field}`")]
    MalformedRequest {
        /// Name of the offending field
        field: &'static str,
    },

    /// The user id does not resolve to a record in the key store
    #[error("unknown user")]
    UnknownUser,

    /// HMAC verification failed (wrong key, tampered payload or forged tag)
    #[error("invalid authentication tag")]
    InvalidTag,

    /// The request timestamp lies outside the configured freshness window
    #[error("stale request: clock skew {skew_secs}s exceeds window {window_secs}s")]
    StaleRequest { skew_secs: u64, window_secs: u64 },
}

impl AuthError {
    /// Short machine-readable label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MalformedRequest { .. } => "malformed_request",
            AuthError::UnknownUser => "unknown_user",
            AuthError::InvalidTag => "invalid_tag",
            AuthError::StaleRequest { .. } => "stale_request",
        }
    }
}

/// Errors constructing a [`SharedKey`](super::entities::SharedKey).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("shared key too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    #[error("shared key is not valid hex")]
    InvalidHex,
}

/// Errors from key store provisioning.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// User ids must be non-empty and must not contain the canonical delimiter
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),
}
