//! Storage layer for roadlog.
//!
//! This module provides `SQLite`-based persistent storage for drivers and
//! their trips, fines and preferences, replacing the original's
//! whole-collection rewrite model with an indexed store keyed by email.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{Fine, Trip, User, UserStatus};

/// Metadata key holding the email of the currently logged-in driver.
const SESSION_KEY: &str = "session_user";

/// Storage engine for driver records.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Driver accounts keyed by email
/// - Trip and fine insertion and per-driver listing
/// - Cascading driver deletion
/// - Per-driver preferences and the session marker
#[derive(Debug)]
pub struct Store {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Store {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        // Initialize schema
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // === Users ===

    /// Insert a new driver account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmailTaken`] if an account with the same email
    /// already exists, or an error if the database operation fails.
    pub fn insert_user(&self, user: &User) -> Result<()> {
        if self.user(&user.email)?.is_some() {
            return Err(Error::EmailTaken {
                email: user.email.clone(),
            });
        }

        self.conn.execute(
            r"
            INSERT INTO users (email, name, password, status, avatar, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                user.email,
                user.name,
                user.password,
                user.status.to_string(),
                user.avatar,
                user.created_at.to_rfc3339(),
            ],
        )?;

        debug!("Registered driver {}", user.email);
        Ok(())
    }

    /// Look up a driver by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user(&self, email: &str) -> Result<Option<User>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT email, name, password, status, avatar, created_at
                FROM users WHERE email = ?1
                ",
                [email],
                Self::row_to_user,
            )
            .optional()?;
        Ok(result)
    }

    /// Get all drivers in registration order.
    ///
    /// Insertion order matters: it is the leaderboard's tie-break.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT email, name, password, status, avatar, created_at
            FROM users ORDER BY rowid ASC
            ",
        )?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Get all drivers with the given status, in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn users_with_status(&self, status: UserStatus) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT email, name, password, status, avatar, created_at
            FROM users WHERE status = ?1 ORDER BY rowid ASC
            ",
        )?;

        let users = stmt
            .query_map([status.to_string()], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Update a driver's name and, when given, password.
    ///
    /// A `None` password keeps the existing one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUser`] if no such driver exists, or an error
    /// if the database operation fails.
    pub fn update_profile(&self, email: &str, name: &str, password: Option<&str>) -> Result<()> {
        let affected = match password {
            Some(password) => self.conn.execute(
                "UPDATE users SET name = ?1, password = ?2 WHERE email = ?3",
                params![name, password, email],
            )?,
            None => self.conn.execute(
                "UPDATE users SET name = ?1 WHERE email = ?2",
                params![name, email],
            )?,
        };

        if affected == 0 {
            return Err(Error::unknown_user(email));
        }
        Ok(())
    }

    /// Store a driver's avatar image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUser`] if no such driver exists, or an error
    /// if the database operation fails.
    pub fn set_avatar(&self, email: &str, image: &[u8]) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE users SET avatar = ?1 WHERE email = ?2",
            params![image, email],
        )?;

        if affected == 0 {
            return Err(Error::unknown_user(email));
        }
        Ok(())
    }

    /// Change a driver's account status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUser`] if no such driver exists, or an error
    /// if the database operation fails.
    pub fn set_status(&self, email: &str, status: UserStatus) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE users SET status = ?1 WHERE email = ?2",
            params![status.to_string(), email],
        )?;

        if affected == 0 {
            return Err(Error::unknown_user(email));
        }
        Ok(())
    }

    /// Delete a driver and everything that references them: trips, fines
    /// and preferences. Other drivers' records are untouched.
    ///
    /// Returns `true` if a driver was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_user(&self, email: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM users WHERE email = ?1", [email])?;
        if affected == 0 {
            return Ok(false);
        }

        let trips = self
            .conn
            .execute("DELETE FROM trips WHERE user_email = ?1", [email])?;
        let fines = self
            .conn
            .execute("DELETE FROM fines WHERE user_email = ?1", [email])?;
        self.conn
            .execute("DELETE FROM preferences WHERE user_email = ?1", [email])?;

        info!(
            "Deleted driver {} ({} trips, {} fines)",
            email, trips, fines
        );
        Ok(true)
    }

    // === Trips ===

    /// Insert a trip, returning its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_trip(&self, trip: &Trip) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO trips (user_email, source, destination, distance_km, cargo, income, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                trip.user_email,
                trip.source,
                trip.destination,
                trip.distance_km,
                trip.cargo,
                trip.income,
                trip.date.to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted trip {} for {}", id, trip.user_email);
        Ok(id)
    }

    /// Get one driver's trips in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn trips_for(&self, email: &str) -> Result<Vec<Trip>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, user_email, source, destination, distance_km, cargo, income, date
            FROM trips WHERE user_email = ?1 ORDER BY id ASC
            ",
        )?;

        let trips = stmt
            .query_map([email], Self::row_to_trip)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(trips)
    }

    /// Get every trip in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn trips(&self) -> Result<Vec<Trip>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, user_email, source, destination, distance_km, cargo, income, date
            FROM trips ORDER BY id ASC
            ",
        )?;

        let trips = stmt
            .query_map([], Self::row_to_trip)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(trips)
    }

    /// Delete one driver's entire trip history.
    ///
    /// Returns the number of trips deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_trips(&self, email: &str) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM trips WHERE user_email = ?1", [email])?;

        if affected > 0 {
            info!("Cleared {} trips for {}", affected, email);
        }
        Ok(affected)
    }

    // === Fines ===

    /// Insert a fine, returning its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_fine(&self, fine: &Fine) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO fines (user_email, offence, amount, date)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![
                fine.user_email,
                fine.offence,
                fine.amount,
                fine.date.to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted fine {} for {}", id, fine.user_email);
        Ok(id)
    }

    /// Get one driver's fines in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn fines_for(&self, email: &str) -> Result<Vec<Fine>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, user_email, offence, amount, date
            FROM fines WHERE user_email = ?1 ORDER BY id ASC
            ",
        )?;

        let fines = stmt
            .query_map([email], Self::row_to_fine)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(fines)
    }

    /// Get every fine in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn fines(&self) -> Result<Vec<Fine>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, user_email, offence, amount, date
            FROM fines ORDER BY id ASC
            ",
        )?;

        let fines = stmt
            .query_map([], Self::row_to_fine)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(fines)
    }

    // === Preferences ===

    /// Get a driver's distance goal, if one was ever set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn goal(&self, email: &str) -> Result<Option<i64>> {
        let result = self
            .conn
            .query_row(
                "SELECT goal_km FROM preferences WHERE user_email = ?1",
                [email],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }

    /// Set a driver's distance goal.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_goal(&self, email: &str, goal_km: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO preferences (user_email, goal_km) VALUES (?1, ?2)",
            params![email, goal_km],
        )?;
        Ok(())
    }

    // === Session ===

    /// Get the email of the currently logged-in driver, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn current_session(&self) -> Result<Option<String>> {
        let result = self
            .conn
            .query_row(
                "SELECT value FROM metadata WHERE key = ?1",
                [SESSION_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }

    /// Mark a driver as logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_session(&self, email: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![SESSION_KEY, email],
        )?;
        Ok(())
    }

    /// Clear the logged-in marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_session(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM metadata WHERE key = ?1", [SESSION_KEY])?;
        Ok(())
    }

    // === Stats ===

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let drivers: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let trips: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM trips", [], |row| row.get(0))?;
        let fines: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM fines", [], |row| row.get(0))?;

        // Get database file size
        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            drivers,
            trips,
            fines,
            db_size_bytes,
        })
    }

    // === Row mappers ===

    /// Convert a database row to a User struct.
    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let email: String = row.get(0)?;
        let name: String = row.get(1)?;
        let password: String = row.get(2)?;
        let status_str: String = row.get(3)?;
        let avatar: Option<Vec<u8>> = row.get(4)?;
        let created_at_str: String = row.get(5)?;

        Ok(User {
            name,
            email,
            password,
            status: UserStatus::parse_or_active(&status_str),
            avatar,
            created_at: Self::parse_timestamp(&created_at_str),
        })
    }

    /// Convert a database row to a Trip struct.
    fn row_to_trip(row: &rusqlite::Row) -> rusqlite::Result<Trip> {
        let id: i64 = row.get(0)?;
        let user_email: String = row.get(1)?;
        let source: String = row.get(2)?;
        let destination: String = row.get(3)?;
        let distance_km: i64 = row.get(4)?;
        let cargo: String = row.get(5)?;
        let income: Option<i64> = row.get(6)?;
        let date_str: String = row.get(7)?;

        Ok(Trip {
            id: Some(id),
            user_email,
            source,
            destination,
            distance_km,
            cargo,
            income,
            date: Self::parse_timestamp(&date_str),
        })
    }

    /// Convert a database row to a Fine struct.
    fn row_to_fine(row: &rusqlite::Row) -> rusqlite::Result<Fine> {
        let id: i64 = row.get(0)?;
        let user_email: String = row.get(1)?;
        let offence: String = row.get(2)?;
        let amount: i64 = row.get(3)?;
        let date_str: String = row.get(4)?;

        Ok(Fine {
            id: Some(id),
            user_email,
            offence,
            amount,
            date: Self::parse_timestamp(&date_str),
        })
    }

    /// Parse a stored RFC 3339 timestamp, falling back to now on damage.
    fn parse_timestamp(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    /// Number of registered drivers.
    pub drivers: i64,
    /// Total number of trips stored.
    pub trips: i64,
    /// Total number of fines stored.
    pub fines: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> Store {
        Store::open_in_memory().expect("failed to create test store")
    }

    fn test_user(email: &str) -> User {
        User::new("Test Driver".to_string(), email.to_string(), "pw".to_string())
    }

    fn test_trip(email: &str, distance_km: i64) -> Trip {
        Trip {
            id: None,
            user_email: email.to_string(),
            source: "Rotterdam".to_string(),
            destination: "Berlin".to_string(),
            distance_km,
            cargo: "Machinery".to_string(),
            income: Some(9_000),
            date: Utc::now(),
        }
    }

    fn test_fine(email: &str, amount: i64) -> Fine {
        Fine {
            id: None,
            user_email: email.to_string(),
            offence: "Speeding".to_string(),
            amount,
            date: Utc::now(),
        }
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_insert_and_get_user() {
        let store = create_test_store();
        store.insert_user(&test_user("a@example.com")).unwrap();

        let user = store.user("a@example.com").unwrap().unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.name, "Test Driver");
        assert_eq!(user.status, UserStatus::Active);
    }

    #[test]
    fn test_insert_duplicate_email_rejected() {
        let store = create_test_store();
        store.insert_user(&test_user("a@example.com")).unwrap();

        let result = store.insert_user(&test_user("a@example.com"));
        assert!(matches!(result, Err(Error::EmailTaken { .. })));
    }

    #[test]
    fn test_get_nonexistent_user() {
        let store = create_test_store();
        assert!(store.user("ghost@example.com").unwrap().is_none());
    }

    #[test]
    fn test_users_in_insertion_order() {
        let store = create_test_store();
        for email in ["c@example.com", "a@example.com", "b@example.com"] {
            store.insert_user(&test_user(email)).unwrap();
        }

        let users = store.users().unwrap();
        let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(
            emails,
            vec!["c@example.com", "a@example.com", "b@example.com"]
        );
    }

    #[test]
    fn test_users_with_status() {
        let store = create_test_store();
        store.insert_user(&test_user("active@example.com")).unwrap();

        let mut pending = test_user("pending@example.com");
        pending.status = UserStatus::Pending;
        store.insert_user(&pending).unwrap();

        let pending_users = store.users_with_status(UserStatus::Pending).unwrap();
        assert_eq!(pending_users.len(), 1);
        assert_eq!(pending_users[0].email, "pending@example.com");
    }

    #[test]
    fn test_update_profile() {
        let store = create_test_store();
        store.insert_user(&test_user("a@example.com")).unwrap();

        store
            .update_profile("a@example.com", "New Name", Some("newpw"))
            .unwrap();

        let user = store.user("a@example.com").unwrap().unwrap();
        assert_eq!(user.name, "New Name");
        assert_eq!(user.password, "newpw");
    }

    #[test]
    fn test_update_profile_keeps_password_when_none() {
        let store = create_test_store();
        store.insert_user(&test_user("a@example.com")).unwrap();

        store.update_profile("a@example.com", "Renamed", None).unwrap();

        let user = store.user("a@example.com").unwrap().unwrap();
        assert_eq!(user.name, "Renamed");
        assert_eq!(user.password, "pw");
    }

    #[test]
    fn test_update_profile_unknown_user() {
        let store = create_test_store();
        let result = store.update_profile("ghost@example.com", "Name", None);
        assert!(matches!(result, Err(Error::UnknownUser { .. })));
    }

    #[test]
    fn test_set_avatar() {
        let store = create_test_store();
        store.insert_user(&test_user("a@example.com")).unwrap();

        store.set_avatar("a@example.com", &[1, 2, 3]).unwrap();

        let user = store.user("a@example.com").unwrap().unwrap();
        assert_eq!(user.avatar, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_set_status() {
        let store = create_test_store();
        let mut pending = test_user("p@example.com");
        pending.status = UserStatus::Pending;
        store.insert_user(&pending).unwrap();

        store.set_status("p@example.com", UserStatus::Active).unwrap();

        let user = store.user("p@example.com").unwrap().unwrap();
        assert_eq!(user.status, UserStatus::Active);
    }

    #[test]
    fn test_delete_user_cascades() {
        let store = create_test_store();
        store.insert_user(&test_user("gone@example.com")).unwrap();
        store.insert_user(&test_user("stays@example.com")).unwrap();

        store.insert_trip(&test_trip("gone@example.com", 100)).unwrap();
        store.insert_trip(&test_trip("stays@example.com", 200)).unwrap();
        store.insert_fine(&test_fine("gone@example.com", 50)).unwrap();
        store.insert_fine(&test_fine("stays@example.com", 70)).unwrap();
        store.set_goal("gone@example.com", 5_000).unwrap();

        assert!(store.delete_user("gone@example.com").unwrap());

        assert!(store.user("gone@example.com").unwrap().is_none());
        assert!(store.trips_for("gone@example.com").unwrap().is_empty());
        assert!(store.fines_for("gone@example.com").unwrap().is_empty());
        assert!(store.goal("gone@example.com").unwrap().is_none());

        // Other drivers' records are untouched
        assert!(store.user("stays@example.com").unwrap().is_some());
        assert_eq!(store.trips_for("stays@example.com").unwrap().len(), 1);
        assert_eq!(store.fines_for("stays@example.com").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_nonexistent_user() {
        let store = create_test_store();
        assert!(!store.delete_user("ghost@example.com").unwrap());
    }

    #[test]
    fn test_insert_and_list_trips() {
        let store = create_test_store();

        for km in [100, 200, 300] {
            store.insert_trip(&test_trip("a@example.com", km)).unwrap();
        }
        store.insert_trip(&test_trip("b@example.com", 999)).unwrap();

        let trips = store.trips_for("a@example.com").unwrap();
        assert_eq!(trips.len(), 3);
        let distances: Vec<i64> = trips.iter().map(|t| t.distance_km).collect();
        assert_eq!(distances, vec![100, 200, 300]);

        assert_eq!(store.trips().unwrap().len(), 4);
    }

    #[test]
    fn test_trip_roundtrip_preserves_fields() {
        let store = create_test_store();
        let mut trip = test_trip("a@example.com", 650);
        trip.income = None;

        let id = store.insert_trip(&trip).unwrap();
        let stored = store
            .trips_for("a@example.com")
            .unwrap()
            .into_iter()
            .next()
            .unwrap();

        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.source, "Rotterdam");
        assert_eq!(stored.destination, "Berlin");
        assert_eq!(stored.cargo, "Machinery");
        assert_eq!(stored.income, None);
    }

    #[test]
    fn test_clear_trips_only_affects_target() {
        let store = create_test_store();
        store.insert_trip(&test_trip("a@example.com", 100)).unwrap();
        store.insert_trip(&test_trip("a@example.com", 200)).unwrap();
        store.insert_trip(&test_trip("b@example.com", 300)).unwrap();

        let cleared = store.clear_trips("a@example.com").unwrap();
        assert_eq!(cleared, 2);

        assert!(store.trips_for("a@example.com").unwrap().is_empty());
        assert_eq!(store.trips_for("b@example.com").unwrap().len(), 1);
    }

    #[test]
    fn test_insert_and_list_fines() {
        let store = create_test_store();
        store.insert_fine(&test_fine("a@example.com", 250)).unwrap();
        store.insert_fine(&test_fine("a@example.com", 90)).unwrap();

        let fines = store.fines_for("a@example.com").unwrap();
        assert_eq!(fines.len(), 2);
        assert_eq!(fines[0].amount, 250);
        assert_eq!(fines[0].offence, "Speeding");
    }

    #[test]
    fn test_goal_defaults_to_none() {
        let store = create_test_store();
        assert!(store.goal("a@example.com").unwrap().is_none());
    }

    #[test]
    fn test_set_and_get_goal() {
        let store = create_test_store();
        store.set_goal("a@example.com", 20_000).unwrap();
        assert_eq!(store.goal("a@example.com").unwrap(), Some(20_000));

        // Overwrite
        store.set_goal("a@example.com", 30_000).unwrap();
        assert_eq!(store.goal("a@example.com").unwrap(), Some(30_000));
    }

    #[test]
    fn test_session_roundtrip() {
        let store = create_test_store();
        assert!(store.current_session().unwrap().is_none());

        store.set_session("a@example.com").unwrap();
        assert_eq!(
            store.current_session().unwrap(),
            Some("a@example.com".to_string())
        );

        store.clear_session().unwrap();
        assert!(store.current_session().unwrap().is_none());
    }

    #[test]
    fn test_session_overwrite() {
        let store = create_test_store();
        store.set_session("a@example.com").unwrap();
        store.set_session("b@example.com").unwrap();
        assert_eq!(
            store.current_session().unwrap(),
            Some("b@example.com".to_string())
        );
    }

    #[test]
    fn test_stats_empty() {
        let store = create_test_store();
        let stats = store.stats().unwrap();
        assert_eq!(stats.drivers, 0);
        assert_eq!(stats.trips, 0);
        assert_eq!(stats.fines, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let store = create_test_store();
        store.insert_user(&test_user("a@example.com")).unwrap();
        store.insert_trip(&test_trip("a@example.com", 100)).unwrap();
        store.insert_fine(&test_fine("a@example.com", 50)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.drivers, 1);
        assert_eq!(stats.trips, 1);
        assert_eq!(stats.fines, 1);
    }

    #[test]
    fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_open_file_based() {
        let temp_dir = std::env::temp_dir();
        let db_path = temp_dir.join(format!("roadlog_test_{}.db", std::process::id()));

        let store = Store::open(&db_path).unwrap();
        store.insert_user(&test_user("a@example.com")).unwrap();
        assert_eq!(store.stats().unwrap().drivers, 1);
        assert_eq!(store.path(), db_path);

        // Clean up
        drop(store);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = std::env::temp_dir();
        let nested_path = temp_dir.join(format!(
            "roadlog_test_{}/nested/db.sqlite",
            std::process::id()
        ));

        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }

        let store = Store::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent.parent().unwrap());
        }
    }

    #[test]
    fn test_unicode_fields() {
        let store = create_test_store();
        let mut trip = test_trip("a@example.com", 120);
        trip.source = "São Paulo".to_string();
        trip.destination = "Curitiba".to_string();

        store.insert_trip(&trip).unwrap();
        let stored = &store.trips_for("a@example.com").unwrap()[0];
        assert_eq!(stored.source, "São Paulo");
        assert_eq!(stored.destination, "Curitiba");
    }

    #[test]
    fn test_unknown_status_read_as_active() {
        let store = create_test_store();
        store.insert_user(&test_user("a@example.com")).unwrap();
        store
            .conn
            .execute("UPDATE users SET status = 'frozen' WHERE email = 'a@example.com'", [])
            .unwrap();

        let user = store.user("a@example.com").unwrap().unwrap();
        assert_eq!(user.status, UserStatus::Active);
    }
}
