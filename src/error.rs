// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing messages.

/// Message shown when the backend cannot be reached at all.
pub const NETWORK_MESSAGE: &str = "Cannot connect to server. Please check your backend URL.";

/// Message shown when the backend rejected the stored session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

/// Message shown when the completion guard trips.
pub const ALREADY_COMPLETED_MESSAGE: &str = "You already completed this habit today!";

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Backend error (HTTP {status}): {}", .message.as_deref().unwrap_or("no details"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    #[error("Habit already completed today")]
    AlreadyCompletedToday,

    #[error("Habit belongs to another user")]
    NotOwner,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True when the backend rejected our credentials.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, AppError::SessionExpired)
    }

    /// Message suitable for showing to the user.
    ///
    /// `fallback` is the action-specific generic message ("Failed to load
    /// habits") used when nothing more precise is known.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Network(_) => NETWORK_MESSAGE.to_string(),
            AppError::SessionExpired => SESSION_EXPIRED_MESSAGE.to_string(),
            AppError::Unauthorized => "Please login to continue.".to_string(),
            AppError::Api {
                message: Some(msg),
                ..
            } if !msg.trim().is_empty() => msg.clone(),
            AppError::AlreadyCompletedToday => ALREADY_COMPLETED_MESSAGE.to_string(),
            AppError::NotOwner => "You can only change your own habits.".to_string(),
            AppError::Api { .. }
            | AppError::Storage(_)
            | AppError::Decode(_)
            | AppError::Internal(_) => fallback.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();

        AppError::Validation(messages.join("; "))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AppError>;
