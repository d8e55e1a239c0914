// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod api_client;
pub mod auth;
pub mod completion;
pub mod habits;

pub use api_client::{ApiClient, LOGIN_ROUTE};
pub use auth::{AuthService, AuthState, AuthStateNotifier, Subscription};
pub use completion::{CompletionSummary, PROGRESS_WINDOW_DAYS};
pub use habits::HabitService;
