//! SC-Client: signed subscription status checks.
//!
//! Builds an HMAC-authenticated request for one user, posts it to a status
//! gateway and accepts the answer only if its tag verifies under the same
//! shared key.

pub mod api;

pub use api::{ClientError, StatusClient, StatusRequest};
