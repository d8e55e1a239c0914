// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Habit operations against the backend.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{Habit, HabitFilter, HabitPatch, HabitUpdate, NewHabit, UserProfile};
use crate::services::api_client::encode_segment;
use crate::services::completion::ensure_not_completed_today;
use crate::services::ApiClient;
use crate::time_utils::format_utc_rfc3339;

/// Size of the featured preview.
pub const FEATURED_LIMIT: usize = 6;

/// `POST /habits` body: the draft plus owner fields.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateHabitRequest<'a> {
    #[serde(flatten)]
    habit: &'a NewHabit,
    user_email: &'a str,
    user_name: &'a str,
    created_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    completion_date: String,
}

/// High-level habit service.
#[derive(Clone)]
pub struct HabitService {
    client: ApiClient,
}

impl HabitService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Habits created by `email`.
    pub async fn list_for_user(&self, email: &str) -> Result<Vec<Habit>> {
        let path = format!("/habits?userEmail={}", urlencoding::encode(email));
        let records: Vec<Value> = self.client.get(&path).await?;
        Ok(decode_habits(records))
    }

    /// Habits shared by everyone.
    pub async fn list_public(&self) -> Result<Vec<Habit>> {
        let records: Vec<Value> = self
            .client
            .public_request::<(), _>(reqwest::Method::GET, "/habits/public", None)
            .await?;
        Ok(decode_habits(records))
    }

    /// Public habits narrowed by `filter`.
    pub async fn browse(&self, filter: &HabitFilter) -> Result<Vec<Habit>> {
        let habits = self.list_public().await?;
        Ok(filter.apply(habits))
    }

    /// First few public habits. Failures are logged and yield an empty
    /// preview.
    pub async fn featured(&self) -> Vec<Habit> {
        match self.list_public().await {
            Ok(mut habits) => {
                habits.truncate(FEATURED_LIMIT);
                habits
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load featured habits");
                Vec::new()
            }
        }
    }

    pub async fn get(&self, id: &str) -> Result<Habit> {
        self.client
            .get(&format!("/habits/{}", encode_segment(id)))
            .await
    }

    /// Create a habit owned by `owner`. Returns the new ID when the backend
    /// reports one.
    pub async fn create(
        &self,
        owner: &UserProfile,
        habit: &NewHabit,
    ) -> Result<Option<String>> {
        habit.validate()?;

        let request = CreateHabitRequest {
            habit,
            user_email: &owner.email,
            user_name: owner.name_or_email(),
            created_at: format_utc_rfc3339(Utc::now()),
        };

        let response: Value = self.client.post("/habits", &request).await?;
        let id = inserted_id(&response);

        tracing::info!(id = ?id, title = %habit.title, "Habit created");
        Ok(id)
    }

    /// Replace a habit's editable fields.
    pub async fn update(&self, id: &str, update: &HabitUpdate) -> Result<()> {
        update.validate()?;
        self.client
            .send(
                reqwest::Method::PUT,
                &format!("/habits/{}", encode_segment(id)),
                Some(update),
            )
            .await?;
        tracing::info!(id, "Habit updated");
        Ok(())
    }

    /// Change only the fields set in `patch`.
    pub async fn patch(&self, id: &str, patch: &HabitPatch) -> Result<()> {
        if patch.is_empty() {
            return Err(AppError::Validation("Nothing to update".to_string()));
        }
        patch.validate()?;
        self.client
            .send(
                reqwest::Method::PATCH,
                &format!("/habits/{}", encode_segment(id)),
                Some(patch),
            )
            .await?;
        tracing::info!(id, "Habit patched");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete(&format!("/habits/{}", encode_segment(id)))
            .await?;
        tracing::info!(id, "Habit deleted");
        Ok(())
    }

    /// Record a completion at `now`.
    ///
    /// Refused locally, without a request, when the habit already has a
    /// completion on `now`'s calendar day.
    pub async fn mark_complete<Tz: TimeZone>(
        &self,
        habit: &Habit,
        now: &DateTime<Tz>,
    ) -> Result<Habit> {
        ensure_not_completed_today(&habit.completion_history, now)?;

        let now_utc = now.with_timezone(&Utc);
        let request = CompletionRequest {
            completion_date: format_utc_rfc3339(now_utc),
        };

        let response: Value = self
            .client
            .put(
                &format!("/habits/{}/complete", encode_segment(&habit.id)),
                &request,
            )
            .await?;

        tracing::info!(id = %habit.id, "Habit marked complete");

        // Prefer the backend's view (it owns the streak); otherwise append
        // locally.
        match serde_json::from_value::<Habit>(response) {
            Ok(updated) => Ok(updated),
            Err(_) => {
                let mut updated = habit.clone();
                updated.completion_history.push(now_utc);
                Ok(updated)
            }
        }
    }
}

/// Decode a habit list record by record. Records that do not decode are
/// logged and skipped.
fn decode_habits(records: Vec<Value>) -> Vec<Habit> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.get("_id").cloned();
            serde_json::from_value(record)
                .inspect_err(|e| tracing::warn!(id = ?id, error = %e, "Skipping malformed habit"))
                .ok()
        })
        .collect()
}

/// Pull the new document ID out of an insert response
/// (`{"insertedId": ...}` or a full habit with `_id`).
fn inserted_id(response: &Value) -> Option<String> {
    ["insertedId", "_id"]
        .iter()
        .find_map(|key| match response.get(*key)? {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj.get("$oid")?.as_str().map(str::to_string),
            _ => None,
        })
}
