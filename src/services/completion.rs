// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completion bookkeeping over a habit's history.
//!
//! Everything here is a pure function of the history and an injected
//! `now`. The time zone of `now` defines which calendar day is "today".

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{AppError, Result};
use crate::models::Habit;

/// Rolling window used for progress (days).
pub const PROGRESS_WINDOW_DAYS: u32 = 30;

/// True iff some entry falls on `now`'s calendar date, in `now`'s zone.
pub fn is_completed_today<Tz: TimeZone>(history: &[DateTime<Utc>], now: &DateTime<Tz>) -> bool {
    let tz = now.timezone();
    let today = now.date_naive();
    history
        .iter()
        .any(|stamp| stamp.with_timezone(&tz).date_naive() == today)
}

/// Number of entries within `[now - window_days, now]`, both ends inclusive.
pub fn completions_in_window<Tz: TimeZone>(
    history: &[DateTime<Utc>],
    window_days: u32,
    now: &DateTime<Tz>,
) -> usize {
    let end = now.with_timezone(&Utc);
    let start = end - Duration::days(i64::from(window_days));
    history
        .iter()
        .filter(|stamp| **stamp >= start && **stamp <= end)
        .count()
}

/// Completions in the window divided by its length, clamped to `[0, 1]`.
pub fn progress_ratio<Tz: TimeZone>(
    history: &[DateTime<Utc>],
    window_days: u32,
    now: &DateTime<Tz>,
) -> f64 {
    if window_days == 0 {
        return 0.0;
    }
    let count = completions_in_window(history, window_days, now);
    (count as f64 / f64::from(window_days)).min(1.0)
}

/// Local guard run before asking the backend to record a completion.
pub fn ensure_not_completed_today<Tz: TimeZone>(
    history: &[DateTime<Utc>],
    now: &DateTime<Tz>,
) -> Result<()> {
    if is_completed_today(history, now) {
        return Err(AppError::AlreadyCompletedToday);
    }
    Ok(())
}

/// Presentation-ready facts about one habit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSummary {
    pub completed_today: bool,
    pub completions_in_window: usize,
    pub window_days: u32,
    /// In `[0, 1]`
    pub progress_ratio: f64,
    /// Streak as maintained by the backend
    pub current_streak: u32,
}

impl CompletionSummary {
    pub fn evaluate<Tz: TimeZone>(habit: &Habit, window_days: u32, now: &DateTime<Tz>) -> Self {
        let history = &habit.completion_history;
        Self {
            completed_today: is_completed_today(history, now),
            completions_in_window: completions_in_window(history, window_days, now),
            window_days,
            progress_ratio: progress_ratio(history, window_days, now),
            current_streak: habit.current_streak,
        }
    }

    /// Progress as a whole percentage.
    pub fn percent(&self) -> u8 {
        (self.progress_ratio * 100.0).round() as u8
    }
}
