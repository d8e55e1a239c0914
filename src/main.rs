// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Habit Tracker command-line client
//!
//! Signs in against the habits backend, lists and edits habits, and
//! records daily completions.

mod cli;

use chrono::Local;
use clap::Parser;
use cli::{Cli, Command};
use habit_tracker::{
    config::Config,
    error::AppError,
    models::{Habit, HabitFilter, HabitPatch, NewHabit, UserProfile},
    services::{AuthState, CompletionSummary},
    AppState,
};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Completions listed in the detail view.
const RECENT_COMPLETIONS_SHOWN: usize = 14;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(config.log_json);
    tracing::debug!(api_url = %config.api_url, "Starting habit-tracker");

    let state = AppState::from_config(config, |route| {
        tracing::info!(route, "Session expired, sign-in required");
        eprintln!("Run `habit-tracker login` to sign in again.");
    });

    let fallback = cli.command.failure_message();
    match run(&state, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_session_expired() {
                if let Err(clear_err) = state.auth.expire() {
                    tracing::error!(error = %clear_err, "Failed to clear expired session");
                }
            }
            tracing::debug!(error = %e, "Command failed");
            eprintln!("{}", e.user_message(fallback));
            ExitCode::FAILURE
        }
    }
}

async fn run(state: &AppState, command: Command) -> Result<(), AppError> {
    state.auth.restore()?;

    match command {
        Command::Login {
            email,
            name,
            uid,
            photo_url,
        } => {
            let user = UserProfile {
                uid,
                email: email.trim().to_string(),
                display_name: name.map(|n| n.trim().to_string()),
                photo_url,
            };
            state.auth.sign_in(user.clone()).await?;
            println!("Signed in as {}", user.name_or_email());
        }
        Command::Logout => {
            state.auth.sign_out()?;
            println!("Signed out.");
        }
        Command::Status => match state.auth.state() {
            AuthState::SignedIn(user) => {
                println!("Signed in as {} <{}>", user.name_or_email(), user.email)
            }
            _ => println!("Not signed in."),
        },
        Command::List => {
            let user = state.auth.require_user()?;
            let habits = state.habits.list_for_user(&user.email).await?;
            if habits.is_empty() {
                println!("You have no habits yet. Create one with `habit-tracker add`.");
            }
            for habit in &habits {
                print_habit_line(state, habit);
            }
        }
        Command::Browse { search, category } => {
            let filter = HabitFilter { search, category };
            let habits = state.habits.browse(&filter).await?;
            if habits.is_empty() {
                println!("No habits match your search.");
            }
            for habit in &habits {
                print_habit_line(state, habit);
            }
        }
        Command::Featured => {
            let habits = state.habits.featured().await;
            if habits.is_empty() {
                println!("No featured habits yet.");
            }
            for habit in &habits {
                print_habit_line(state, habit);
            }
        }
        Command::Show { id } => {
            let habit = state.habits.get(&id).await?;
            print_habit_details(state, &habit);
        }
        Command::Add {
            title,
            description,
            category,
            reminder,
            image_url,
        } => {
            let user = state.auth.require_user()?;
            let draft = NewHabit {
                title: title.trim().to_string(),
                description: description.trim().to_string(),
                category,
                reminder_time: reminder,
                image_url,
            };
            match state.habits.create(&user, &draft).await? {
                Some(id) => println!("Habit created successfully! ({})", id),
                None => println!("Habit created successfully!"),
            }
        }
        Command::Update {
            id,
            title,
            description,
            category,
            reminder,
            image_url,
        } => {
            let user = state.auth.require_user()?;
            let habit = state.habits.get(&id).await?;
            if !habit.is_owned_by(&user) {
                return Err(AppError::NotOwner);
            }
            let patch = HabitPatch {
                title: title.map(|t| t.trim().to_string()),
                description: description.map(|d| d.trim().to_string()),
                category,
                reminder_time: reminder,
                image_url,
            };
            state.habits.patch(&habit.id, &patch).await?;
            println!("Habit updated successfully!");
        }
        Command::Delete { id } => {
            let user = state.auth.require_user()?;
            let habit = state.habits.get(&id).await?;
            if !habit.is_owned_by(&user) {
                return Err(AppError::NotOwner);
            }
            state.habits.delete(&habit.id).await?;
            println!("Habit deleted successfully!");
        }
        Command::Complete { id } => {
            let user = state.auth.require_user()?;
            let habit = state.habits.get(&id).await?;
            if !habit.is_owned_by(&user) {
                return Err(AppError::NotOwner);
            }
            let updated = state.habits.mark_complete(&habit, &Local::now()).await?;
            println!("Habit marked as complete! Keep up the great work!");
            print_habit_details(state, &updated);
        }
    }

    Ok(())
}

fn summarize(state: &AppState, habit: &Habit) -> CompletionSummary {
    CompletionSummary::evaluate(habit, state.config.progress_window_days, &Local::now())
}

fn print_habit_line(state: &AppState, habit: &Habit) {
    let summary = summarize(state, habit);
    let mark = if summary.completed_today { "x" } else { " " };
    println!(
        "[{}] {}  {} ({})  streak {}  {}%",
        mark,
        habit.id,
        habit.title,
        habit.category,
        summary.current_streak,
        summary.percent()
    );
}

fn print_habit_details(state: &AppState, habit: &Habit) {
    let summary = summarize(state, habit);

    println!("{}", habit.title);
    println!("  Category:    {}", habit.category);
    if !habit.description.is_empty() {
        println!("  Description: {}", habit.description);
    }
    println!(
        "  Reminder:    {}",
        habit.reminder_display().unwrap_or_else(|| "Not set".to_string())
    );
    if let Some(url) = &habit.image_url {
        println!("  Image:       {}", url);
    }
    println!(
        "  Owner:       {} <{}>",
        habit.user_name.as_deref().unwrap_or(&habit.user_email),
        habit.user_email
    );
    if let Some(created) = habit.created_at {
        println!(
            "  Created:     {}",
            created.with_timezone(&Local).format("%B %-d, %Y")
        );
    }
    println!("  Streak:      {} days", summary.current_streak);
    println!(
        "  Progress:    {}/{} days ({}%)",
        summary.completions_in_window,
        summary.window_days,
        summary.percent()
    );
    println!(
        "  Today:       {}",
        if summary.completed_today {
            "completed"
        } else {
            "not yet"
        }
    );

    let recent = habit.recent_completions(RECENT_COMPLETIONS_SHOWN);
    if !recent.is_empty() {
        println!(
            "  Recent completions ({} total):",
            habit.completion_history.len()
        );
        for stamp in recent {
            println!(
                "    {}",
                stamp.with_timezone(&Local).format("%a, %b %-d, %Y %-I:%M %p")
            );
        }
    }
}

/// Initialize logging to stderr, JSON or compact text.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("habit_tracker=warn"));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .flatten_event(true),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }
}
