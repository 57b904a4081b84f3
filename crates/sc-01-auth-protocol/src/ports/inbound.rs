//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::entities::{RawFields, SignedResponse};
use crate::domain::errors::AuthError;

/// Primary subscription status API.
///
/// Implementations must be thread-safe (`Send + Sync`); each call is an
/// independent unit of work with no cross-request state.
pub trait SubscriptionStatusApi: Send + Sync {
    /// Authenticate the request, evaluate the subscription, and return the
    /// signed status.
    ///
    /// # Errors
    /// * `AuthError::MalformedRequest` - missing or ill-typed field
    /// * `AuthError::UnknownUser` - user id not provisioned
    /// * `AuthError::InvalidTag` - HMAC verification failed
    /// * `AuthError::StaleRequest` - outside the freshness window (if enabled)
    fn check_status(&self, request: &RawFields) -> Result<SignedResponse, AuthError>;
}
