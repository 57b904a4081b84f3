//! Subscription evaluation.

use chrono::{DateTime, Utc};

/// A subscription is active up to and including its expiry instant.
pub fn evaluate(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> bool {
    now <= expires_at
}
