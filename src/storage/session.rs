// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session credentials on top of a [`KeyValueStore`].

use std::sync::Arc;

use super::{keys, KeyValueStore};
use crate::error::{AppError, Result};
use crate::models::UserProfile;

/// Handle to the persisted session: bearer token and signed-in user.
///
/// Nothing is cached here; every accessor goes to the store, so a token
/// written by one handle is seen by all others on their next read.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current bearer token, if any. An empty stored value counts as none.
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(keys::TOKEN)?
            .filter(|t| !t.trim().is_empty()))
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store.set(keys::TOKEN, token)
    }

    pub fn clear_token(&self) -> Result<()> {
        self.store.remove(keys::TOKEN)
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token()?.is_some())
    }

    /// Persisted user profile. A record that no longer decodes is treated
    /// as absent.
    pub fn user(&self) -> Result<Option<UserProfile>> {
        let Some(raw) = self.store.get(keys::USER)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable stored user profile");
                Ok(None)
            }
        }
    }

    pub fn set_user(&self, user: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(user)
            .map_err(|e| AppError::Storage(format!("Failed to encode user: {}", e)))?;
        self.store.set(keys::USER, &json)
    }

    /// Remove both token and user.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(keys::TOKEN)?;
        self.store.remove(keys::USER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_token_lifecycle() {
        let store = MemoryStore::new();
        let session = Session::new(Arc::new(store.clone()));

        assert_eq!(session.token().unwrap(), None);
        session.set_token("abc").unwrap();
        assert!(session.is_authenticated().unwrap());
        assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some("abc"));

        session.clear_token().unwrap();
        assert!(!session.is_authenticated().unwrap());
    }

    #[test]
    fn test_blank_token_is_none() {
        let store = MemoryStore::new();
        store.set(keys::TOKEN, "").unwrap();
        let session = Session::new(Arc::new(store));
        assert_eq!(session.token().unwrap(), None);
    }

    #[test]
    fn test_user_roundtrip_and_corrupt_record() {
        let store = MemoryStore::new();
        let session = Session::new(Arc::new(store.clone()));
        let user = UserProfile::new("sam@example.com", Some("Sam".to_string()));

        session.set_user(&user).unwrap();
        assert_eq!(session.user().unwrap(), Some(user));

        store.set(keys::USER, "{not json").unwrap();
        assert_eq!(session.user().unwrap(), None);

        session.clear().unwrap();
        assert!(store.is_empty());
    }
}
