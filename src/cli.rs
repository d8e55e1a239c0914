// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command-line arguments.

use clap::{Parser, Subcommand};
use habit_tracker::models::Category;

#[derive(Parser)]
#[command(name = "habit-tracker")]
#[command(version)]
#[command(about = "Track personal habits against the Habit Tracker backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in with an identity verified by the identity provider
    Login {
        #[arg(long)]
        email: String,
        /// Display name (defaults to the email)
        #[arg(long)]
        name: Option<String>,
        /// Provider user ID
        #[arg(long)]
        uid: Option<String>,
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show who is signed in
    Status,
    /// List your habits
    List,
    /// Browse public habits
    Browse {
        /// Match against title and description
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long, short)]
        category: Option<Category>,
    },
    /// Show a preview of public habits
    Featured,
    /// Show one habit with its progress
    Show {
        #[arg(value_name = "HABIT_ID")]
        id: String,
    },
    /// Create a habit
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: Category,
        /// Reminder time (HH:MM)
        #[arg(long)]
        reminder: Option<String>,
        /// Already-hosted image URL
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Change fields of one of your habits
    Update {
        #[arg(value_name = "HABIT_ID")]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        /// Reminder time (HH:MM)
        #[arg(long)]
        reminder: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Delete one of your habits
    Delete {
        #[arg(value_name = "HABIT_ID")]
        id: String,
    },
    /// Mark one of your habits complete for today
    Complete {
        #[arg(value_name = "HABIT_ID")]
        id: String,
    },
}

impl Command {
    /// Generic message used when an error carries nothing better.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Command::Login { .. } => "Failed to sign in. Please try again.",
            Command::Logout => "Failed to sign out.",
            Command::Status => "Failed to read the stored session.",
            Command::List => "Failed to load habits. Please try again.",
            Command::Browse { .. } => "Failed to load habits. Please try again.",
            Command::Featured => "Failed to load featured habits.",
            Command::Show { .. } => "Failed to load habit details",
            Command::Add { .. } => "Failed to create habit. Please try again.",
            Command::Update { .. } => "Failed to update habit",
            Command::Delete { .. } => "Failed to delete habit",
            Command::Complete { .. } => "Failed to mark habit as complete",
        }
    }
}
