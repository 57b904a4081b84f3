//! # Response Signer
//!
//! Signs the outbound status with the same shared key that authenticated
//! the request. [`verify_response`] is the client-side counterpart.

use crate::domain::canonical::{format_expiry, response_message};
use crate::domain::entities::{SharedKey, SignedResponse};
use crate::domain::mac;
use chrono::{DateTime, Utc};

/// Build and sign the status response. Deterministic for identical inputs.
pub fn sign(
    user_id: &str,
    active: bool,
    expires_at: DateTime<Utc>,
    server_time: i64,
    key: &SharedKey,
) -> SignedResponse {
    let expires_at = format_expiry(expires_at);
    let canonical = response_message(user_id, active, &expires_at, server_time);
    let tag = mac::compute(key, &canonical);

    SignedResponse {
        user_id: user_id.to_string(),
        active,
        expires_at,
        server_time,
        tag,
    }
}

/// Recompute the canonical response string from the received fields and
/// check the tag in constant time.
pub fn verify_response(key: &SharedKey, response: &SignedResponse) -> bool {
    let canonical = response_message(
        &response.user_id,
        response.active,
        &response.expires_at,
        response.server_time,
    );
    mac::verify(key, &canonical, &response.tag)
}
