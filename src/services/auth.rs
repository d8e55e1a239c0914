// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in state and the token exchange.
//!
//! The identity provider hands us a [`UserProfile`]; we trade it for a
//! backend session token at `POST /jwt` and persist both. Observers see
//! three states so "not yet known" is never confused with "signed out".

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use dashmap::DashMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::services::ApiClient;

/// Observable authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Persisted state not read yet
    #[default]
    Resolving,
    SignedOut,
    SignedIn(UserProfile),
}

impl AuthState {
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthState::Resolving)
    }
}

type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

struct NotifierInner {
    state: Mutex<AuthState>,
    listeners: DashMap<u64, Listener>,
    next_id: AtomicU64,
}

/// Holds the current [`AuthState`] and fans changes out to subscribers.
#[derive(Clone)]
pub struct AuthStateNotifier {
    inner: Arc<NotifierInner>,
}

impl Default for AuthStateNotifier {
    fn default() -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                state: Mutex::new(AuthState::Resolving),
                listeners: DashMap::new(),
                next_id: AtomicU64::new(0),
            }),
        }
    }
}

impl AuthStateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AuthState {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Register `on_change`. It is called right away with the current
    /// state, then after every change until the subscription is dropped.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(on_change);
        self.inner.listeners.insert(id, listener.clone());

        listener(&self.state());

        Subscription {
            id,
            notifier: Arc::downgrade(&self.inner),
        }
    }

    /// Replace the state and notify every subscriber.
    pub fn publish(&self, state: AuthState) {
        {
            let mut current = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            *current = state.clone();
        }

        // Snapshot so listeners may subscribe/unsubscribe while being called.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        for listener in listeners {
            listener(&state);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.len()
    }
}

/// Live subscription; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    notifier: Weak<NotifierInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.notifier.upgrade() {
            inner.listeners.remove(&self.id);
        }
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

/// Sign-in, sign-out and session restoration.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    notifier: AuthStateNotifier,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            notifier: AuthStateNotifier::new(),
        }
    }

    pub fn notifier(&self) -> &AuthStateNotifier {
        &self.notifier
    }

    pub fn state(&self) -> AuthState {
        self.notifier.state()
    }

    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        self.notifier.subscribe(on_change)
    }

    /// Signed-in user or [`AppError::Unauthorized`].
    pub fn require_user(&self) -> Result<UserProfile> {
        self.state().user().cloned().ok_or(AppError::Unauthorized)
    }

    /// Resolve the persisted session. A stored user without a token is
    /// treated as signed out.
    pub fn restore(&self) -> Result<AuthState> {
        let session = self.client.session();
        let state = match (session.user()?, session.is_authenticated()?) {
            (Some(user), true) => AuthState::SignedIn(user),
            _ => AuthState::SignedOut,
        };

        tracing::debug!(signed_in = state.user().is_some(), "Session restored");
        self.notifier.publish(state.clone());
        Ok(state)
    }

    /// Exchange a provider-verified user for a backend token.
    ///
    /// On failure nothing is persisted and the current state is kept.
    pub async fn sign_in(&self, user: UserProfile) -> Result<()> {
        user.validate()?;

        let request = TokenRequest {
            email: &user.email,
            name: user.name_or_email(),
        };

        let response: TokenResponse = self
            .client
            .public_request(Method::POST, "/jwt", Some(&request))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Token exchange failed"))?;

        let token = response
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Decode("Token endpoint returned no token".to_string()))?;

        // User first: a token must never be stored without its user.
        let session = self.client.session();
        session.set_user(&user)?;
        if let Err(e) = session.set_token(&token) {
            if let Err(clear_err) = session.clear() {
                tracing::error!(error = %clear_err, "Failed to roll back stored user");
            }
            return Err(e);
        }

        tracing::info!(email = %user.email, "Signed in");
        self.notifier.publish(AuthState::SignedIn(user));
        Ok(())
    }

    /// Forget token and user.
    pub fn sign_out(&self) -> Result<()> {
        self.client.session().clear()?;
        tracing::info!("Signed out");
        self.notifier.publish(AuthState::SignedOut);
        Ok(())
    }

    /// React to a 401: the client already dropped the token, so drop the
    /// user too and tell observers.
    pub fn expire(&self) -> Result<()> {
        self.client.session().clear()?;
        tracing::info!("Session expired");
        self.notifier.publish(AuthState::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_subscribe_fires_immediately_with_resolving() {
        let notifier = AuthStateNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let _sub = notifier.subscribe(move |s| sink.lock().unwrap().push(s.clone()));

        assert_eq!(*seen.lock().unwrap(), vec![AuthState::Resolving]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let notifier = AuthStateNotifier::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let sub = notifier.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        notifier.publish(AuthState::SignedOut);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        sub.unsubscribe();
        assert_eq!(notifier.subscriber_count(), 0);

        notifier.publish(AuthState::SignedOut);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscription_outliving_notifier() {
        let notifier = AuthStateNotifier::new();
        let sub = notifier.subscribe(|_| {});
        drop(notifier);
        drop(sub);
    }

    #[test]
    fn test_state_helpers() {
        let user = UserProfile::new("sam@example.com", None);
        assert!(!AuthState::Resolving.is_resolved());
        assert!(AuthState::SignedOut.is_resolved());
        assert_eq!(AuthState::SignedIn(user.clone()).user(), Some(&user));
        assert_eq!(AuthState::SignedOut.user(), None);
    }
}
