//! # Subscription Status Service
//!
//! Application service layer that implements the `SubscriptionStatusApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`SubscriptionStatusApi`)
//! - Uses the outbound ports (`KeyStore`, `TimeSource`)
//! - Delegates authentication, evaluation and signing to the domain layer

use crate::domain::authenticator::{AuthPolicy, RequestAuthenticator};
use crate::domain::entities::{RawFields, SignedResponse};
use crate::domain::errors::AuthError;
use crate::domain::signer;
use crate::domain::subscription;
use crate::ports::inbound::SubscriptionStatusApi;
use crate::ports::outbound::{KeyStore, SystemTimeSource, TimeSource};
use tracing::debug;

/// Subscription status service.
///
/// The clock is read once per request; that single reading drives the
/// freshness check, the active flag and `server_time`.
pub struct SubscriptionStatusService<K: KeyStore, T: TimeSource = SystemTimeSource> {
    authenticator: RequestAuthenticator<K>,
    clock: T,
}

impl<K: KeyStore> SubscriptionStatusService<K, SystemTimeSource> {
    /// Create a service backed by the system clock.
    pub fn with_system_clock(store: K, policy: AuthPolicy) -> Self {
        Self::new(store, policy, SystemTimeSource)
    }
}

impl<K: KeyStore, T: TimeSource> SubscriptionStatusService<K, T> {
    pub fn new(store: K, policy: AuthPolicy, clock: T) -> Self {
        Self {
            authenticator: RequestAuthenticator::new(store, policy),
            clock,
        }
    }

    pub fn policy(&self) -> &AuthPolicy {
        self.authenticator.policy()
    }

    pub fn store(&self) -> &K {
        self.authenticator.store()
    }
}

impl<K: KeyStore, T: TimeSource> SubscriptionStatusApi for SubscriptionStatusService<K, T> {
    fn check_status(&self, request: &RawFields) -> Result<SignedResponse, AuthError> {
        let now = self.clock.now();

        let authenticated = self.authenticator.authenticate(request, now).map_err(|e| {
            debug!(reason = e.kind(), "Status check rejected: {}", e);
            e
        })?;

        let user = &authenticated.user;
        let active = subscription::evaluate(now, user.subscription_expires_at);
        let response = signer::sign(
            &user.user_id,
            active,
            user.subscription_expires_at,
            now.timestamp(),
            &user.shared_key,
        );

        debug!(user_id = %user.user_id, active, "Status check answered");
        Ok(response)
    }
}
