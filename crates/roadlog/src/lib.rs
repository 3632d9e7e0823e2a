//! `roadlog` - A companion tracker for truck simulators
//!
//! This library provides the core functionality for tracking trips, fines
//! and driver statistics, with optional live ingestion of game telemetry
//! from a snapshot file.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod session;
pub mod stats;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{Fine, Trip, User, UserStatus};
pub use session::Session;
pub use stats::Level;
pub use store::{Store, StoreStats};
pub use telemetry::{FileSnapshotSource, Snapshot, SnapshotSource};
