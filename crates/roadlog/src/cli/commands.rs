//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Driver display name
    pub name: String,

    /// Email address (the account key)
    pub email: String,

    /// Password
    pub password: String,
}

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Email address
    pub email: String,

    /// Password
    pub password: String,
}

/// Trip management commands.
#[derive(Debug, Subcommand)]
pub enum TripCommand {
    /// Record a trip by hand
    Add {
        /// Departure city
        source: String,

        /// Arrival city
        destination: String,

        /// Distance in kilometers
        distance: i64,

        /// Cargo description
        #[arg(long, default_value = "")]
        cargo: String,

        /// Delivery income
        #[arg(short, long)]
        income: Option<i64>,

        /// Completion date (RFC 3339 or YYYY-MM-DD; defaults to now)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List your trips, newest first
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete your entire trip history
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Fine management commands.
#[derive(Debug, Subcommand)]
pub enum FineCommand {
    /// Record a fine by hand
    Add {
        /// What you were fined for
        offence: String,

        /// Fined amount
        amount: i64,

        /// Issue date (RFC 3339 or YYYY-MM-DD; defaults to now)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List your fines, newest first
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Restrict to a calendar month (YYYY-MM); all time when omitted
    #[arg(short, long)]
    pub month: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Drivers leaderboard arguments.
#[derive(Debug, Args)]
pub struct DriversCommand {
    /// Calendar month to rank (YYYY-MM); defaults to the current month
    #[arg(short, long)]
    pub month: Option<String>,

    /// Rank over all recorded history instead of one month
    #[arg(long, conflicts_with = "month")]
    pub all_time: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Profile management commands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show your profile and goal progress
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Update your name and/or password
    Edit {
        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New password
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Upload an avatar image
    Avatar {
        /// Path to the image file (max 2 MiB)
        file: PathBuf,
    },

    /// Set your distance goal in kilometers
    Goal {
        /// The goal; must be positive
        km: i64,
    },

    /// Delete your account and all its records
    Delete {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Admin commands; require the configured admin account.
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List accounts awaiting approval
    Pending,

    /// Approve a pending account
    Approve {
        /// Email of the account to approve
        email: String,
    },

    /// Reject an account, deleting it and all its records
    Reject {
        /// Email of the account to reject
        email: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
