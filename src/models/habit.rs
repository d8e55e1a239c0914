// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Habit model and the drafts sent to the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::models::UserProfile;
use crate::time_utils::{deserialize_lenient_history, deserialize_lenient_timestamp};

/// Habit category.
///
/// Unknown strings from the backend decode as [`Category::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    HealthAndFitness,
    Productivity,
    Mindfulness,
    Learning,
    Social,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::HealthAndFitness,
        Category::Productivity,
        Category::Mindfulness,
        Category::Learning,
        Category::Social,
        Category::Other,
    ];

    /// Wire and display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::HealthAndFitness => "Health & Fitness",
            Category::Productivity => "Productivity",
            Category::Mindfulness => "Mindfulness",
            Category::Learning => "Learning",
            Category::Social => "Social",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Category::Other)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

/// Strict parse used for user input. Accepts the display name or a short
/// alias (`health`, `fitness`), case-insensitive.
impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "health & fitness" | "health" | "fitness" => Ok(Category::HealthAndFitness),
            "productivity" => Ok(Category::Productivity),
            "mindfulness" => Ok(Category::Mindfulness),
            "learning" => Ok(Category::Learning),
            "social" => Ok(Category::Social),
            "other" => Ok(Category::Other),
            _ => Err(format!(
                "unknown category '{}' (expected one of: {})",
                s,
                Category::ALL
                    .iter()
                    .map(Category::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Habit record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Backend document ID
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Missing, null or unknown values read as [`Category::Other`]
    #[serde(default, deserialize_with = "deserialize_lenient_category")]
    pub category: Category,
    /// Reminder time ("HH:MM")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Owner email (copied from the creating user)
    #[serde(default)]
    pub user_email: String,
    /// Owner display name (copied from the creating user)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Consecutive-day streak, maintained by the backend
    #[serde(default)]
    pub current_streak: u32,
    /// Completion events in chronological order
    #[serde(default, deserialize_with = "deserialize_lenient_history")]
    pub completion_history: Vec<DateTime<Utc>>,
}

impl Habit {
    /// Whether `user` created this habit.
    pub fn is_owned_by(&self, user: &UserProfile) -> bool {
        !self.user_email.is_empty() && self.user_email.eq_ignore_ascii_case(&user.email)
    }

    /// Up to `limit` completions, newest first.
    pub fn recent_completions(&self, limit: usize) -> Vec<DateTime<Utc>> {
        let mut recent = self.completion_history.clone();
        recent.sort_unstable_by(|a, b| b.cmp(a));
        recent.truncate(limit);
        recent
    }

    /// Reminder in 12-hour form ("7:05 AM").
    pub fn reminder_display(&self) -> Option<String> {
        let (hours, minutes) = split_reminder(self.reminder_time.as_deref()?)?;
        let suffix = if hours >= 12 { "PM" } else { "AM" };
        let display_hour = match hours % 12 {
            0 => 12,
            h => h,
        };
        Some(format!("{}:{:02} {}", display_hour, minutes, suffix))
    }
}

/// Draft for `POST /habits`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    #[validate(custom(function = "required", message = "Title is required"))]
    pub title: String,
    #[validate(custom(function = "required", message = "Description is required"))]
    pub description: String,
    pub category: Category,
    #[validate(custom(
        function = "validate_reminder_time",
        message = "Reminder time must be HH:MM"
    ))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[validate(url(message = "Image URL is not a valid URL"))]
    pub image_url: Option<String>,
}

/// Full replacement for `PUT /habits/:id`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HabitUpdate {
    #[validate(custom(function = "required", message = "Title is required"))]
    pub title: String,
    #[validate(custom(function = "required", message = "Description is required"))]
    pub description: String,
    pub category: Category,
    #[validate(custom(
        function = "validate_reminder_time",
        message = "Reminder time must be HH:MM"
    ))]
    pub reminder_time: Option<String>,
}

impl From<&Habit> for HabitUpdate {
    fn from(habit: &Habit) -> Self {
        Self {
            title: habit.title.clone(),
            description: habit.description.clone(),
            category: habit.category,
            reminder_time: habit.reminder_time.clone(),
        }
    }
}

/// Partial update for `PATCH /habits/:id`; unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    #[validate(custom(function = "required", message = "Title cannot be blank"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[validate(custom(function = "required", message = "Description cannot be blank"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[validate(custom(
        function = "validate_reminder_time",
        message = "Reminder time must be HH:MM"
    ))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[validate(url(message = "Image URL is not a valid URL"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.reminder_time.is_none()
            && self.image_url.is_none()
    }
}

/// Client-side filter for the public habit list.
#[derive(Debug, Clone, Default)]
pub struct HabitFilter {
    /// Case-insensitive substring matched against title and description
    pub search: Option<String>,
    pub category: Option<Category>,
}

impl HabitFilter {
    pub fn matches(&self, habit: &Habit) -> bool {
        if let Some(category) = self.category {
            if habit.category != category {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                habit.title.to_lowercase().contains(&term)
                    || habit.description.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }

    pub fn apply(&self, habits: Vec<Habit>) -> Vec<Habit> {
        habits.into_iter().filter(|h| self.matches(h)).collect()
    }
}

fn deserialize_lenient_category<'de, D>(deserializer: D) -> Result<Category, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(name)) => Category::from(name),
        _ => Category::Other,
    })
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn validate_reminder_time(value: &str) -> Result<(), ValidationError> {
    split_reminder(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("reminder_time"))
}

/// Split "HH:MM" into hours and minutes.
fn split_reminder(value: &str) -> Option<(u32, u32)> {
    let (h, m) = value.trim().split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let hours: u32 = h.parse().ok()?;
    let minutes: u32 = m.parse().ok()?;
    (hours < 24 && minutes < 60).then_some((hours, minutes))
}
