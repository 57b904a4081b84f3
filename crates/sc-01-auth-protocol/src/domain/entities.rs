//! # Protocol Entities
//!
//! Key material, user records, and the per-request request/response shapes.

use crate::domain::errors::KeyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum shared key length in bytes.
pub const MIN_KEY_LEN: usize = 32;

// =============================================================================
// KEY MATERIAL
// =============================================================================

/// Symmetric secret shared between the server and one user.
///
/// Construction enforces [`MIN_KEY_LEN`]. The bytes are wiped on drop and
/// never appear in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey(Vec<u8>);

impl SharedKey {
    /// Wrap raw key bytes.
    pub fn new(mut bytes: Vec<u8>) -> Result<Self, KeyError> {
        if bytes.len() < MIN_KEY_LEN {
            let len = bytes.len();
            bytes.zeroize();
            return Err(KeyError::TooShort {
                len,
                min: MIN_KEY_LEN,
            });
        }
        Ok(Self(bytes))
    }

    /// Decode a hex-encoded key.
    pub fn from_hex(encoded: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(encoded.trim()).map_err(|_| KeyError::InvalidHex)?;
        Self::new(bytes)
    }

    /// Use the UTF-8 bytes of `text` as the key.
    pub fn from_text(text: &str) -> Result<Self, KeyError> {
        Self::new(text.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for SharedKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && bool::from(self.0.ct_eq(&other.0))
    }
}

impl Eq for SharedKey {}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedKey(<redacted>, {} bytes)", self.0.len())
    }
}

// =============================================================================
// USER RECORD
// =============================================================================

/// A provisioned user as seen by the protocol. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: String,
    pub shared_key: SharedKey,
    pub subscription_expires_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(
        user_id: impl Into<String>,
        shared_key: SharedKey,
        subscription_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            shared_key,
            subscription_expires_at,
        }
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// Client timestamp kept in the exact textual form it arrived in.
///
/// The canonical request string embeds `as_str()`, never a re-formatted
/// number, so `"0017"` signs as `0017`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawTimestamp {
    text: String,
    value: i64,
}

impl RawTimestamp {
    /// Accepts an optional `-` followed by ASCII digits that fit in `i64`.
    pub fn parse(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let digits = text.strip_prefix('-').unwrap_or(&text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = text.parse::<i64>().ok()?;
        Some(Self { text, value })
    }

    pub fn from_secs(value: i64) -> Self {
        Self {
            text: value.to_string(),
            value,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Seconds since the Unix epoch.
    pub fn value(&self) -> i64 {
        self.value
    }
}

impl fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Unvalidated request fields as delivered by the transport.
///
/// `timestamp` holds the textual form of whatever scalar the client sent;
/// the authenticator decides whether it is an integer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub user_id: Option<String>,
    pub timestamp: Option<String>,
    pub tag: Option<String>,
}

impl RawFields {
    pub fn new(
        user_id: impl Into<String>,
        timestamp: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            timestamp: Some(timestamp.into()),
            tag: Some(tag.into()),
        }
    }
}

/// A request whose tag verified under the resolved user's key.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    pub user: UserRecord,
    pub timestamp: RawTimestamp,
}

impl AuthenticatedRequest {
    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Signed subscription status returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedResponse {
    pub user_id: String,
    pub active: bool,
    /// Fixed-precision ISO-8601 with explicit `+00:00` offset
    pub expires_at: String,
    /// Server clock in whole seconds since the Unix epoch
    pub server_time: i64,
    /// Lowercase hex HMAC-SHA512 over the canonical response string
    pub tag: String,
}
