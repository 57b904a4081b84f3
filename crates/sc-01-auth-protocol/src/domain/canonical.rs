//! # Canonical Messages
//!
//! The exact byte strings fed to the MAC in each direction:
//!
//! ```text
//! request:  user_id|timestamp|/check_status
//! response: user_id|active(0/1)|expires_at|server_time|/check_status_response
//! ```
//!
//! Field order, delimiter and discriminators are part of the wire contract
//! with existing clients.

use crate::domain::entities::RawTimestamp;
use chrono::{DateTime, Utc};
use std::fmt::{self, Write};

/// Field separator.
pub const DELIMITER: char = '|';

/// Discriminator closing every canonical request string.
pub const REQUEST_PATH: &str = "/check_status";

/// Discriminator closing every canonical response string.
pub const RESPONSE_PATH: &str = "/check_status_response";

/// Joins scalar fields with [`DELIMITER`], discriminator last.
///
/// Values are written through `Display`; callers pass integers and
/// pre-formatted strings only, so output never depends on locale.
#[derive(Debug, Default)]
pub struct CanonicalMessageBuilder {
    buf: String,
    fields: usize,
}

impl CanonicalMessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one field.
    pub fn field(mut self, value: impl fmt::Display) -> Self {
        if self.fields > 0 {
            self.buf.push(DELIMITER);
        }
        // Writing into a String cannot fail.
        let _ = write!(self.buf, "{}", value);
        self.fields += 1;
        self
    }

    /// Append the discriminator and return the canonical string.
    pub fn finish(self, discriminator: &str) -> String {
        self.field(discriminator).buf
    }
}

/// `user_id|timestamp|/check_status`, timestamp exactly as received.
pub fn request_message(user_id: &str, timestamp: &RawTimestamp) -> String {
    CanonicalMessageBuilder::new()
        .field(user_id)
        .field(timestamp.as_str())
        .finish(REQUEST_PATH)
}

/// `user_id|0 or 1|expires_at|server_time|/check_status_response`.
pub fn response_message(user_id: &str, active: bool, expires_at: &str, server_time: i64) -> String {
    CanonicalMessageBuilder::new()
        .field(user_id)
        .field(u8::from(active))
        .field(expires_at)
        .field(server_time)
        .finish(RESPONSE_PATH)
}

/// Fixed-precision ISO-8601: `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`.
pub fn format_expiry(expires_at: DateTime<Utc>) -> String {
    expires_at
        .format("%Y-%m-%dT%H:%M:%S%.6f+00:00")
        .to_string()
}

/// A user id may appear in a canonical string only if it is non-empty and
/// free of the delimiter.
pub fn is_canonical_user_id(user_id: &str) -> bool {
    !user_id.is_empty() && !user_id.contains(DELIMITER)
}
