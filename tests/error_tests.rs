// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use habit_tracker::error::{AppError, ALREADY_COMPLETED_MESSAGE, SESSION_EXPIRED_MESSAGE};

#[test]
fn test_is_session_expired_matches() {
    assert!(AppError::SessionExpired.is_session_expired());
    assert_eq!(
        AppError::SessionExpired.user_message("Failed to load habits"),
        SESSION_EXPIRED_MESSAGE
    );
}

#[test]
fn test_is_session_expired_no_match() {
    let err = AppError::Api {
        status: 401,
        message: Some("Unauthorized".to_string()),
    };
    assert!(!err.is_session_expired());

    assert!(!AppError::Unauthorized.is_session_expired());
    assert!(!AppError::Network("timeout".to_string()).is_session_expired());
}

#[test]
fn test_guard_and_ownership_messages() {
    assert_eq!(
        AppError::AlreadyCompletedToday.user_message("Failed to mark habit as complete"),
        ALREADY_COMPLETED_MESSAGE
    );
    assert_eq!(
        AppError::NotOwner.user_message("Failed to delete habit"),
        "You can only change your own habits."
    );
}

#[test]
fn test_internal_errors_use_fallback() {
    let err: AppError = anyhow::anyhow!("disk on fire").into();
    assert_eq!(err.user_message("Failed to update habit"), "Failed to update habit");
    assert!(err.to_string().contains("disk on fire"));

    let err = AppError::Decode("expected array".to_string());
    assert_eq!(err.user_message("Failed to load habits"), "Failed to load habits");
}

#[test]
fn test_result_alias_propagates_app_error() {
    fn guard() -> habit_tracker::error::Result<()> {
        Err(AppError::AlreadyCompletedToday)
    }

    fn complete_twice() -> habit_tracker::error::Result<u32> {
        guard()?;
        Ok(1)
    }

    assert!(matches!(
        complete_twice(),
        Err(AppError::AlreadyCompletedToday)
    ));
}
