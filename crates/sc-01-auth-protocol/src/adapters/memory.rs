//! # In-Memory Key Store
//!
//! `KeyStore` backed by a `HashMap` behind a `parking_lot::RwLock`. Lookups
//! take the read lock and clone the record out, so provisioning changes never
//! race a request that is mid-verification.

use crate::domain::canonical::is_canonical_user_id;
use crate::domain::entities::UserRecord;
use crate::domain::errors::StoreError;
use crate::ports::outbound::KeyStore;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `records`. Later duplicates replace earlier ones.
    pub fn with_users(records: impl IntoIterator<Item = UserRecord>) -> Result<Self, StoreError> {
        let store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Insert or replace a user. Returns the previous record, if any.
    pub fn insert(&self, record: UserRecord) -> Result<Option<UserRecord>, StoreError> {
        if !is_canonical_user_id(&record.user_id) {
            return Err(StoreError::InvalidUserId(record.user_id));
        }
        Ok(self.users.write().insert(record.user_id.clone(), record))
    }

    pub fn remove(&self, user_id: &str) -> Option<UserRecord> {
        self.users.write().remove(user_id)
    }

    /// Move a user's expiry. Returns `false` if the user is unknown.
    pub fn set_expiry(&self, user_id: &str, expires_at: DateTime<Utc>) -> bool {
        match self.users.write().get_mut(user_id) {
            Some(record) => {
                record.subscription_expires_at = expires_at;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl KeyStore for InMemoryKeyStore {
    fn lookup(&self, user_id: &str) -> Option<UserRecord> {
        self.users.read().get(user_id).cloned()
    }
}
