// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Utc};
use habit_tracker::models::UserProfile;
use habit_tracker::services::ApiClient;
use habit_tracker::storage::{MemoryStore, Session};
use habit_tracker::time_utils::format_utc_rfc3339;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::MockServer;

/// Client pointed at `server`, backed by an in-memory store.
/// Returns the store so tests can inspect what the client wrote.
#[allow(dead_code)]
pub fn test_client(server: &MockServer) -> (ApiClient, MemoryStore) {
    let store = MemoryStore::new();
    let session = Session::new(Arc::new(store.clone()));
    (ApiClient::new(server.uri(), session), store)
}

/// Like [`test_client`], with a session-expired hook that counts calls and
/// records the route it was given.
#[allow(dead_code)]
pub fn test_client_with_hook(
    server: &MockServer,
) -> (ApiClient, MemoryStore, Arc<AtomicUsize>, Arc<std::sync::Mutex<Vec<String>>>) {
    let (client, store) = test_client(server);
    let calls = Arc::new(AtomicUsize::new(0));
    let routes = Arc::new(std::sync::Mutex::new(Vec::new()));

    let counter = calls.clone();
    let seen = routes.clone();
    let client = client.with_session_expired_hook(move |route| {
        counter.fetch_add(1, Ordering::SeqCst);
        seen.lock().unwrap().push(route.to_string());
    });

    (client, store, calls, routes)
}

#[allow(dead_code)]
pub fn test_user() -> UserProfile {
    UserProfile::new("owner@example.com", Some("Owner".to_string()))
}

/// Habit JSON in the backend's shape.
#[allow(dead_code)]
pub fn habit_json(id: &str, history: &[DateTime<Utc>]) -> Value {
    json!({
        "_id": id,
        "title": "Morning Run",
        "description": "Jog around the park",
        "category": "Health & Fitness",
        "reminderTime": "07:00",
        "userEmail": "owner@example.com",
        "userName": "Owner",
        "createdAt": "2024-01-01T08:00:00.000Z",
        "currentStreak": history.len(),
        "completionHistory": history
            .iter()
            .map(|d| format_utc_rfc3339(*d))
            .collect::<Vec<_>>(),
    })
}
