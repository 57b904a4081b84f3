//! # Subscription Status Authentication (SC-01)
//!
//! Authenticates subscription status checks with a pre-shared key per user
//! and signs the answer so the client can detect tampering.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Canonical messages, HMAC-SHA512, request
//!   authentication, subscription evaluation and response signing. No I/O.
//! - **Ports Layer** (`ports/`): The inbound status API and the outbound
//!   `KeyStore` / `TimeSource` dependencies
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//! - **Adapters Layer** (`adapters/`): In-memory key store
//!
//! ## Protocol
//!
//! ```text
//! client ── {user_id, timestamp, tag} ──→ RequestAuthenticator
//!                                             │  KeyStore::lookup
//!                                             │  canonical("user|ts|/check_status")
//!                                             │  mac::verify (constant time)
//!                                             ↓
//!                                       subscription::evaluate
//!                                             ↓
//!                                       signer::sign
//!                                             │  canonical("user|0/1|expiry|time|/check_status_response")
//!                                             ↓
//! client ←── {user_id, active, expires_at, server_time, tag}
//! ```
//!
//! ## Security Notes
//!
//! - Tags are compared with `subtle::ConstantTimeEq` and never logged
//! - Shared keys are at least 32 bytes and zeroized on drop
//! - The freshness window is off unless configured; without it a captured
//!   request can be replayed for as long as the key is valid

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::memory::InMemoryKeyStore;
pub use domain::authenticator::{AuthPolicy, RequestAuthenticator};
pub use domain::canonical::{
    format_expiry, is_canonical_user_id, request_message, response_message,
    CanonicalMessageBuilder, REQUEST_PATH, RESPONSE_PATH,
};
pub use domain::entities::{
    AuthenticatedRequest, RawFields, RawTimestamp, SharedKey, SignedResponse, UserRecord,
    MIN_KEY_LEN,
};
pub use domain::errors::{AuthError, KeyError, StoreError};
pub use domain::mac;
pub use domain::signer::{sign, verify_response};
pub use domain::subscription::evaluate;
pub use ports::inbound::SubscriptionStatusApi;
pub use ports::outbound::{FixedTimeSource, KeyStore, SystemTimeSource, TimeSource};
pub use service::SubscriptionStatusService;
