//! Session and identity handling for roadlog.
//!
//! Registration, login/logout and command gating over the store. The
//! logged-in driver is represented by an explicit [`Session`] value that
//! callers pass to statistics and view code; there is no ambient lookup.
//!
//! Passwords are stored and compared in plaintext, matching the system
//! this replaces; this is a documented non-goal, not an oversight.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{User, UserStatus};
use crate::store::Store;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

/// Check whether a string looks like an email address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// The currently logged-in driver.
///
/// Obtained from [`login`] or [`current`]; holds only the identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Email of the logged-in driver.
    pub email: String,
}

impl Session {
    /// Load the full account record behind this session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUser`] if the account was deleted out from
    /// under the session, or an error if the store fails.
    pub fn user(&self, store: &Store) -> Result<User> {
        store
            .user(&self.email)?
            .ok_or_else(|| Error::unknown_user(&self.email))
    }

    /// Whether this session belongs to the configured admin account.
    #[must_use]
    pub fn is_admin(&self, config: &Config) -> bool {
        config
            .admin
            .email
            .as_deref()
            .is_some_and(|admin| admin == self.email)
    }
}

/// Register a new driver account.
///
/// Accounts are always created active; the `pending` status exists in the
/// data model but registration never produces it.
///
/// # Errors
///
/// Returns a validation error for a blank name or password, a malformed
/// email, or an email that is already registered.
pub fn register(store: &Store, name: &str, email: &str, password: &str) -> Result<User> {
    if name.trim().is_empty() {
        return Err(Error::EmptyField { field: "name" });
    }
    if password.is_empty() {
        return Err(Error::EmptyField { field: "password" });
    }
    if !is_valid_email(email) {
        return Err(Error::InvalidEmail {
            email: email.to_string(),
        });
    }

    let user = User::new(name.to_string(), email.to_string(), password.to_string());
    store.insert_user(&user)?;
    Ok(user)
}

/// Log a driver in and persist the session marker.
///
/// # Errors
///
/// Returns [`Error::InvalidCredentials`] for an unknown email or a wrong
/// password (indistinguishable on purpose), or [`Error::AccountPending`]
/// for an account awaiting approval.
pub fn login(store: &Store, email: &str, password: &str) -> Result<Session> {
    let user = store.user(email)?.ok_or(Error::InvalidCredentials)?;

    if user.password != password {
        return Err(Error::InvalidCredentials);
    }

    if user.status == UserStatus::Pending {
        return Err(Error::AccountPending {
            email: user.email.clone(),
        });
    }

    store.set_session(&user.email)?;
    Ok(Session { email: user.email })
}

/// Clear the persisted session marker.
///
/// Logging out while already logged out is a no-op.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn logout(store: &Store) -> Result<()> {
    store.clear_session()
}

/// Get the current session, if a driver is logged in.
///
/// A marker whose account no longer exists is treated as logged out and
/// cleaned up, so a cascading delete cannot leave a dangling session.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn current(store: &Store) -> Result<Option<Session>> {
    let Some(email) = store.current_session()? else {
        return Ok(None);
    };

    if store.user(&email)?.is_none() {
        store.clear_session()?;
        return Ok(None);
    }

    Ok(Some(Session { email }))
}

/// Get the current session or refuse with [`Error::NotLoggedIn`].
///
/// Protected commands call this; the drivers leaderboard is the one
/// record-viewing command exempt from it.
///
/// # Errors
///
/// Returns [`Error::NotLoggedIn`] without a session, or an error if the
/// store fails.
pub fn require(store: &Store) -> Result<Session> {
    current(store)?.ok_or(Error::NotLoggedIn)
}

/// Refuse with [`Error::AlreadyLoggedIn`] when a session is active.
///
/// Mirrors the original's redirect away from the login and registration
/// views for authenticated visitors.
///
/// # Errors
///
/// Returns [`Error::AlreadyLoggedIn`] with a session, or an error if the
/// store fails.
pub fn require_logged_out(store: &Store) -> Result<()> {
    match current(store)? {
        Some(session) => Err(Error::AlreadyLoggedIn {
            email: session.email,
        }),
        None => Ok(()),
    }
}

/// Get the current session if it belongs to the configured admin.
///
/// # Errors
///
/// Returns [`Error::NotLoggedIn`] without a session,
/// [`Error::AdminRequired`] for a non-admin session (or when no admin is
/// configured), or an error if the store fails.
pub fn require_admin(store: &Store, config: &Config) -> Result<Session> {
    let session = require(store)?;
    if !session.is_admin(config) {
        return Err(Error::AdminRequired);
    }
    Ok(session)
}
