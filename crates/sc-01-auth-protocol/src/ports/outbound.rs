//! # Outbound Ports (Driven Ports / SPI)
//!
//! Traits that define dependencies this subsystem needs.

use crate::domain::entities::UserRecord;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Read-only access to provisioned users.
///
/// Implementations might:
/// - Hold records in memory (see [`InMemoryKeyStore`](crate::InMemoryKeyStore))
/// - Query a database
/// - Fetch from a secret manager
///
/// Lookups run concurrently from many requests and must not mutate state.
pub trait KeyStore: Send + Sync {
    /// Returns the record for `user_id`, or `None` if the user is unknown.
    fn lookup(&self, user_id: &str) -> Option<UserRecord>;
}

impl<K: KeyStore + ?Sized> KeyStore for Arc<K> {
    fn lookup(&self, user_id: &str) -> Option<UserRecord> {
        (**self).lookup(user_id)
    }
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System time implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub DateTime<Utc>);

impl FixedTimeSource {
    /// Frozen at `secs` seconds since the Unix epoch (clamped to the epoch
    /// when out of range).
    pub fn from_secs(secs: i64) -> Self {
        Self(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
