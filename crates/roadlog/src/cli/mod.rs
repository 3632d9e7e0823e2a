//! Command-line interface for roadlog.
//!
//! This module provides the CLI structure and command handlers for the
//! `roadlog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AdminCommand, ConfigCommand, DriversCommand, FineCommand, LoginCommand, ProfileCommand,
    RegisterCommand, StatsCommand, StatusCommand, TripCommand,
};

/// roadlog - Track your trips, fines and driver stats
///
/// A companion tracker for truck simulators: records deliveries and fines
/// by hand or live from game telemetry, and derives levels, leaderboards
/// and goal progress from them.
#[derive(Debug, Parser)]
#[command(name = "roadlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a driver account
    Register(RegisterCommand),

    /// Log in as a driver
    Login(LoginCommand),

    /// Log out
    Logout,

    /// Follow live game telemetry, recording trips and fines
    Watch,

    /// Manage your trips
    #[command(subcommand)]
    Trip(TripCommand),

    /// Manage your fines
    #[command(subcommand)]
    Fine(FineCommand),

    /// Show your totals, level, monthly breakdown and goal progress
    Stats(StatsCommand),

    /// Show the drivers leaderboard (no login required)
    Drivers(DriversCommand),

    /// Manage your profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Approve or reject driver accounts
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Show telemetry and database status
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
