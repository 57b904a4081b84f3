//! # Request Authenticator
//!
//! Turns raw request fields into an [`AuthenticatedRequest`] or a terminal
//! [`AuthError`].
//!
//! ## Verification Steps (in order)
//!
//! 1. **Shape Check**: `user_id` non-empty, `timestamp` an integer, `tag`
//!    non-empty
//! 2. **Lookup**: resolve the user in the key store
//! 3. **Canonical String**: `user_id|timestamp|/check_status`, timestamp
//!    verbatim
//! 4. **Tag Check**: constant-time HMAC-SHA512 comparison
//! 5. **Freshness Check**: `|now - timestamp| <= window`, only when a window
//!    is configured

use crate::domain::canonical::{is_canonical_user_id, request_message};
use crate::domain::entities::{AuthenticatedRequest, RawFields, RawTimestamp};
use crate::domain::errors::AuthError;
use crate::domain::mac;
use crate::ports::outbound::KeyStore;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, warn};

/// Authentication policy knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthPolicy {
    /// Maximum accepted `|server_now - timestamp|`. `None` disables the
    /// check, which leaves captured requests replayable indefinitely.
    pub freshness_window: Option<Duration>,
}

impl AuthPolicy {
    pub fn with_freshness_window(window: Duration) -> Self {
        Self {
            freshness_window: Some(window),
        }
    }
}

/// Validates and verifies inbound status requests against a [`KeyStore`].
pub struct RequestAuthenticator<K: KeyStore> {
    store: K,
    policy: AuthPolicy,
}

impl<K: KeyStore> RequestAuthenticator<K> {
    pub fn new(store: K, policy: AuthPolicy) -> Self {
        if policy.freshness_window.is_none() {
            warn!("Freshness window disabled - captured requests can be replayed");
        }
        Self { store, policy }
    }

    pub fn policy(&self) -> &AuthPolicy {
        &self.policy
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Authenticate `raw` as of `now`.
    ///
    /// Reads the key store once and has no other side effects.
    pub fn authenticate(
        &self,
        raw: &RawFields,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedRequest, AuthError> {
        // 1. Shape check
        let user_id = raw
            .user_id
            .as_deref()
            .filter(|id| is_canonical_user_id(id))
            .ok_or(AuthError::MalformedRequest { field: "user_id" })?;

        let timestamp = raw
            .timestamp
            .as_deref()
            .and_then(RawTimestamp::parse)
            .ok_or(AuthError::MalformedRequest { field: "timestamp" })?;

        let tag = raw
            .tag
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedRequest { field: "tag" })?;

        // 2. Lookup
        let user = self.store.lookup(user_id).ok_or(AuthError::UnknownUser)?;

        // 3. Canonical string from the resolved id and the verbatim timestamp
        let canonical = request_message(&user.user_id, &timestamp);

        // 4. Tag check
        if !mac::verify(&user.shared_key, &canonical, tag) {
            return Err(AuthError::InvalidTag);
        }

        // 5. Freshness check
        if let Some(window) = self.policy.freshness_window {
            let skew_secs = now
                .timestamp()
                .checked_sub(timestamp.value())
                .map(i64::unsigned_abs)
                .unwrap_or(u64::MAX);
            let window_secs = window.as_secs();
            if skew_secs > window_secs {
                return Err(AuthError::StaleRequest {
                    skew_secs,
                    window_secs,
                });
            }
        }

        debug!(user_id = %user.user_id, timestamp = %timestamp, "Request authenticated");

        Ok(AuthenticatedRequest { user, timestamp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryKeyStore;
    use crate::domain::entities::{SharedKey, UserRecord};
    use chrono::TimeZone;

    const NOW: i64 = 1_700_000_000;

    fn key_a() -> SharedKey {
        SharedKey::from_text("THIS_IS_A_32_BYTE_MINIMUM_SECRET_KEY").unwrap()
    }

    fn key_b() -> SharedKey {
        SharedKey::new(vec![0x42; 48]).unwrap()
    }

    fn store() -> InMemoryKeyStore {
        let expires = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let store = InMemoryKeyStore::new();
        store
            .insert(UserRecord::new("alice", key_a(), expires))
            .unwrap();
        store.insert(UserRecord::new("bob", key_b(), expires)).unwrap();
        store
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(NOW, 0).unwrap()
    }

    fn signed(user_id: &str, ts: &str, key: &SharedKey) -> RawFields {
        let ts_parsed = RawTimestamp::parse(ts).unwrap();
        let tag = mac::compute(key, &request_message(user_id, &ts_parsed));
        RawFields::new(user_id, ts, tag)
    }

    #[test]
    fn test_valid_request_accepted() {
        let auth = RequestAuthenticator::new(store(), AuthPolicy::default());
        let req = auth
            .authenticate(&signed("alice", "1700000000", &key_a()), now())
            .unwrap();
        assert_eq!(req.user_id(), "alice");
        assert_eq!(req.timestamp.value(), NOW);
    }

    #[test]
    fn test_missing_fields_malformed() {
        let auth = RequestAuthenticator::new(store(), AuthPolicy::default());
        let good = signed("alice", "1700000000", &key_a());

        let mut no_user = good.clone();
        no_user.user_id = None;
        assert_eq!(
            auth.authenticate(&no_user, now()).unwrap_err(),
            AuthError::MalformedRequest { field: "user_id" }
        );

        let mut empty_user = good.clone();
        empty_user.user_id = Some(String::new());
        assert_eq!(
            auth.authenticate(&empty_user, now()).unwrap_err(),
            AuthError::MalformedRequest { field: "user_id" }
        );

        let mut no_ts = good.clone();
        no_ts.timestamp = None;
        assert_eq!(
            auth.authenticate(&no_ts, now()).unwrap_err(),
            AuthError::MalformedRequest { field: "timestamp" }
        );

        let mut float_ts = good.clone();
        float_ts.timestamp = Some("1700000000.5".into());
        assert_eq!(
            auth.authenticate(&float_ts, now()).unwrap_err(),
            AuthError::MalformedRequest { field: "timestamp" }
        );

        let mut empty_tag = good;
        empty_tag.tag = Some(String::new());
        assert_eq!(
            auth.authenticate(&empty_tag, now()).unwrap_err(),
            AuthError::MalformedRequest { field: "tag" }
        );
    }

    #[test]
    fn test_delimiter_in_user_id_malformed() {
        let auth = RequestAuthenticator::new(store(), AuthPolicy::default());
        let req = signed("alice|1700000000", "1", &key_a());
        assert_eq!(
            auth.authenticate(&req, now()).unwrap_err(),
            AuthError::MalformedRequest { field: "user_id" }
        );
    }

    #[test]
    fn test_unknown_user() {
        let auth = RequestAuthenticator::new(store(), AuthPolicy::default());
        let req = signed("ghost", "1700000000", &key_a());
        assert_eq!(
            auth.authenticate(&req, now()).unwrap_err(),
            AuthError::UnknownUser
        );
    }

    #[test]
    fn test_altered_tag_rejected() {
        let auth = RequestAuthenticator::new(store(), AuthPolicy::default());
        let mut req = signed("alice", "1700000000", &key_a());
        let tag = req.tag.take().unwrap();
        let last = if tag.ends_with('0') { '1' } else { '0' };
        req.tag = Some(format!("{}{}", &tag[..tag.len() - 1], last));
        assert_eq!(
            auth.authenticate(&req, now()).unwrap_err(),
            AuthError::InvalidTag
        );
    }

    #[test]
    fn test_cross_user_tag_reuse_rejected() {
        let auth = RequestAuthenticator::new(store(), AuthPolicy::default());
        // Signed with alice's key but presented as bob.
        let req = signed("bob", "1700000000", &key_a());
        assert_eq!(
            auth.authenticate(&req, now()).unwrap_err(),
            AuthError::InvalidTag
        );

        // Alice's exact tag replayed under bob's id.
        let alice = signed("alice", "1700000000", &key_a());
        let mut as_bob = alice;
        as_bob.user_id = Some("bob".into());
        assert_eq!(
            auth.authenticate(&as_bob, now()).unwrap_err(),
            AuthError::InvalidTag
        );
    }

    #[test]
    fn test_timestamp_signed_verbatim() {
        let auth = RequestAuthenticator::new(store(), AuthPolicy::default());
        let padded = signed("alice", "0017", &key_a());
        assert!(auth.authenticate(&padded, now()).is_ok());

        // Tag over "17" does not cover the padded form.
        let mut mismatched = signed("alice", "17", &key_a());
        mismatched.timestamp = Some("0017".into());
        assert_eq!(
            auth.authenticate(&mismatched, now()).unwrap_err(),
            AuthError::InvalidTag
        );
    }

    #[test]
    fn test_freshness_disabled_accepts_old_requests() {
        let auth = RequestAuthenticator::new(store(), AuthPolicy::default());
        assert!(auth.authenticate(&signed("alice", "1", &key_a()), now()).is_ok());
    }

    #[test]
    fn test_freshness_window_boundary() {
        let policy = AuthPolicy::with_freshness_window(Duration::from_secs(300));
        let auth = RequestAuthenticator::new(store(), policy);

        let edge_past = (NOW - 300).to_string();
        let edge_future = (NOW + 300).to_string();
        assert!(auth.authenticate(&signed("alice", &edge_past, &key_a()), now()).is_ok());
        assert!(auth.authenticate(&signed("alice", &edge_future, &key_a()), now()).is_ok());

        let too_old = (NOW - 301).to_string();
        assert_eq!(
            auth.authenticate(&signed("alice", &too_old, &key_a()), now())
                .unwrap_err(),
            AuthError::StaleRequest {
                skew_secs: 301,
                window_secs: 300
            }
        );

        let too_new = (NOW + 301).to_string();
        assert!(matches!(
            auth.authenticate(&signed("alice", &too_new, &key_a()), now()),
            Err(AuthError::StaleRequest { skew_secs: 301, .. })
        ));
    }

    #[test]
    fn test_freshness_extreme_timestamp() {
        let policy = AuthPolicy::with_freshness_window(Duration::from_secs(300));
        let auth = RequestAuthenticator::new(store(), policy);
        let req = signed("alice", &i64::MIN.to_string(), &key_a());
        assert!(matches!(
            auth.authenticate(&req, now()),
            Err(AuthError::StaleRequest { .. })
        ));
    }

    #[test]
    fn test_tag_checked_before_freshness() {
        let policy = AuthPolicy::with_freshness_window(Duration::from_secs(300));
        let auth = RequestAuthenticator::new(store(), policy);
        let mut req = signed("alice", "1", &key_a());
        req.tag = Some("00".repeat(64));
        assert_eq!(
            auth.authenticate(&req, now()).unwrap_err(),
            AuthError::InvalidTag
        );
    }
}
