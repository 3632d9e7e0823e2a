//! `SQLite` schema definitions for roadlog.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the users table.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    email TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    password TEXT NOT NULL,
    status TEXT NOT NULL,
    avatar BLOB,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the trips table.
///
/// `user_email` carries no foreign-key constraint; referential integrity
/// is enforced only at delete time by the cascading user delete.
pub const CREATE_TRIPS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS trips (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_email TEXT NOT NULL,
    source TEXT NOT NULL,
    destination TEXT NOT NULL,
    distance_km INTEGER NOT NULL,
    cargo TEXT NOT NULL,
    income INTEGER,
    date TEXT NOT NULL
)
";

/// SQL statement to create the fines table.
pub const CREATE_FINES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS fines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_email TEXT NOT NULL,
    offence TEXT NOT NULL,
    amount INTEGER NOT NULL,
    date TEXT NOT NULL
)
";

/// SQL statement to create the per-driver preferences table.
pub const CREATE_PREFERENCES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS preferences (
    user_email TEXT PRIMARY KEY,
    goal_km INTEGER NOT NULL
)
";

/// SQL statement to create an index on trips by driver.
pub const CREATE_TRIPS_USER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_trips_user ON trips(user_email)
";

/// SQL statement to create an index on trips by date.
pub const CREATE_TRIPS_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_trips_date ON trips(date DESC)
";

/// SQL statement to create an index on fines by driver.
pub const CREATE_FINES_USER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_fines_user ON fines(user_email)
";

/// SQL statement to create the metadata table for storing key-value pairs.
///
/// Holds the schema version and the current session marker.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_TRIPS_TABLE,
    CREATE_FINES_TABLE,
    CREATE_PREFERENCES_TABLE,
    CREATE_TRIPS_USER_INDEX,
    CREATE_TRIPS_DATE_INDEX,
    CREATE_FINES_USER_INDEX,
    CREATE_METADATA_TABLE,
];
