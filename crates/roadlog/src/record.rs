//! Core domain records for roadlog.
//!
//! This module defines the data structures for drivers, trips, fines and
//! per-driver preferences that the store persists and the statistics layer
//! consumes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Account status of a driver.
///
/// Registration always produces [`UserStatus::Active`]. `Pending` is a
/// supported value the admin surface operates on, but no current flow
/// creates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// The account may log in.
    Active,
    /// The account awaits admin approval and may not log in.
    Pending,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

impl UserStatus {
    /// Parse a stored status string, defaulting unknown values to `Active`
    /// for backward compatibility with records written before the field
    /// existed.
    #[must_use]
    pub fn parse_or_active(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            _ => Self::Active,
        }
    }
}

/// A registered driver account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name.
    pub name: String,

    /// Email address; the account's unique key.
    pub email: String,

    /// Password, stored and compared in plaintext.
    pub password: String,

    /// Account status.
    pub status: UserStatus,

    /// Optional avatar image bytes. Never serialized to JSON output.
    #[serde(skip)]
    pub avatar: Option<Vec<u8>>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new active account.
    #[must_use]
    pub fn new(name: String, email: String, password: String) -> Self {
        Self {
            name,
            email,
            password,
            status: UserStatus::Active,
            avatar: None,
            created_at: Utc::now(),
        }
    }
}

/// One completed delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Unique identifier (assigned by the store).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Email of the driver the trip belongs to.
    pub user_email: String,

    /// Departure city.
    pub source: String,

    /// Arrival city.
    pub destination: String,

    /// Driven distance in whole kilometers.
    pub distance_km: i64,

    /// Cargo description.
    pub cargo: String,

    /// Delivery income, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income: Option<i64>,

    /// When the trip was completed.
    pub date: DateTime<Utc>,
}

impl Trip {
    /// The `YYYY-MM` grouping key of this trip.
    #[must_use]
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    /// Whether this trip falls in the given `YYYY-MM` calendar month.
    ///
    /// Matches by prefix on the RFC 3339 date string, like the stored form.
    #[must_use]
    pub fn in_month(&self, month: &str) -> bool {
        self.date.to_rfc3339().starts_with(month)
    }
}

/// One penalty event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fine {
    /// Unique identifier (assigned by the store).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Email of the driver the fine belongs to.
    pub user_email: String,

    /// What the driver was fined for.
    pub offence: String,

    /// Fined amount.
    pub amount: i64,

    /// When the fine was issued.
    pub date: DateTime<Utc>,
}

impl Fine {
    /// Whether this fine falls in the given `YYYY-MM` calendar month.
    #[must_use]
    pub fn in_month(&self, month: &str) -> bool {
        self.date.to_rfc3339().starts_with(month)
    }
}

/// Per-driver preferences, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Email of the driver the preferences belong to.
    pub user_email: String,

    /// Distance goal in kilometers.
    pub goal_km: i64,
}

/// Parse a user-supplied date.
///
/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` day, which is
/// taken as midnight UTC.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidDate`] when the input matches neither form.
pub fn parse_date_input(input: &str) -> crate::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(crate::Error::InvalidDate {
        input: input.to_string(),
    })
}
