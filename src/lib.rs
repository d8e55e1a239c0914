// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Habit Tracker: client for a personal habit-tracking service
//!
//! This crate provides the client side of the service: completion
//! bookkeeping for habits, an authenticated API client that manages the
//! bearer token, sign-in state, and habit operations against the backend.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use services::{ApiClient, AuthService, HabitService};
use storage::{FileStore, KeyValueStore, Session};

/// Shared client state.
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub habits: HabitService,
}

impl AppState {
    /// Wire services over `store`. `on_session_expired` runs once per 401.
    pub fn new<F>(config: Config, store: Arc<dyn KeyValueStore>, on_session_expired: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let session = Session::new(store);
        let client = ApiClient::new(config.api_url.clone(), session)
            .with_session_expired_hook(on_session_expired);

        Self {
            auth: AuthService::new(client.clone()),
            habits: HabitService::new(client),
            config,
        }
    }

    /// Wire services over the session file named in `config`.
    pub fn from_config<F>(config: Config, on_session_expired: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let store = Arc::new(FileStore::new(config.session_file.clone()));
        Self::new(config, store, on_session_expired)
    }
}
