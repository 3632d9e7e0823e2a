//! Error types for roadlog.
//!
//! This module defines all error types used throughout the roadlog crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for roadlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Account Errors ===
    /// Registration attempted with an email that is already taken.
    #[error("email '{email}' is already registered")]
    EmailTaken {
        /// The email address in question.
        email: String,
    },

    /// An email address that does not look like one.
    #[error("'{email}' is not a valid email address")]
    InvalidEmail {
        /// The rejected input.
        email: String,
    },

    /// A required registration field was left blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the blank field.
        field: &'static str,
    },

    /// Login with an unknown email or a wrong password.
    ///
    /// Deliberately does not say which, so the message never leaks
    /// whether an account exists.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Login into an account that is still awaiting approval.
    #[error("account '{email}' is awaiting approval")]
    AccountPending {
        /// The pending account.
        email: String,
    },

    /// An operation referenced a driver that does not exist.
    #[error("no driver registered as '{email}'")]
    UnknownUser {
        /// The missing email.
        email: String,
    },

    // === Session Errors ===
    /// A protected command was run without a session.
    #[error("not logged in; run 'roadlog login' first")]
    NotLoggedIn,

    /// Login/registration attempted while a session is active.
    #[error("already logged in as '{email}'; log out first")]
    AlreadyLoggedIn {
        /// The current session's email.
        email: String,
    },

    /// An admin command was run by a non-admin session.
    #[error("this command requires the configured admin account")]
    AdminRequired,

    // === Input Validation Errors ===
    /// A distance goal that is zero or negative.
    #[error("goal must be a positive number of kilometers, got {value}")]
    InvalidGoal {
        /// The rejected value.
        value: i64,
    },

    /// An avatar image above the size limit.
    #[error("avatar is {size} bytes, the limit is {limit} bytes")]
    AvatarTooLarge {
        /// Size of the rejected image.
        size: u64,
        /// The configured limit.
        limit: u64,
    },

    /// A date string that could not be parsed.
    #[error("could not parse '{input}' as a date")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for roadlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an unknown-user error.
    #[must_use]
    pub fn unknown_user(email: impl Into<String>) -> Self {
        Self::UnknownUser {
            email: email.into(),
        }
    }

    /// Check if this error came from user input rather than the system.
    ///
    /// Validation failures abort the command but are not bugs or
    /// environment problems; callers use this to pick an exit path.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmailTaken { .. }
                | Self::InvalidEmail { .. }
                | Self::EmptyField { .. }
                | Self::InvalidCredentials
                | Self::AccountPending { .. }
                | Self::InvalidGoal { .. }
                | Self::AvatarTooLarge { .. }
                | Self::InvalidDate { .. }
        )
    }

    /// Check if this error indicates a missing session.
    #[must_use]
    pub fn is_not_logged_in(&self) -> bool {
        matches!(self, Self::NotLoggedIn)
    }
}
