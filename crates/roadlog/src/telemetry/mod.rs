//! Telemetry ingestion for roadlog.
//!
//! The game plugin writes a JSON snapshot of live state to a well-known
//! file. This module defines that snapshot, the source abstraction used to
//! fetch it, the edge-detection state machine that turns consecutive
//! snapshots into domain events, and the polling monitor that drives it.

pub mod monitor;
pub mod tracker;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One poll of the game's live state.
///
/// Produced by an external process; every field defaults when absent, so a
/// partial document still parses. A missing or damaged file is represented
/// by [`Snapshot::disconnected`] — never by an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Whether the game reports itself running.
    pub connected: bool,

    /// Whether a delivery job is currently underway.
    pub job_active: bool,

    /// Distance of the current job in kilometers.
    pub trip_distance: f64,

    /// Departure city of the current job.
    pub source: String,

    /// Arrival city of the current job.
    pub destination: String,

    /// Cargo of the current job.
    pub cargo: String,

    /// Income of the current job.
    pub income: i64,

    /// Whether the game is currently holding a fine event.
    pub fine_detected: bool,

    /// Offence of the held fine.
    pub fine_type: String,

    /// Amount of the held fine.
    pub fine_amount: i64,

    /// Truck odometer reading in kilometers.
    pub odometer: f64,

    /// Truck speed in km/h; display only.
    pub speed: f64,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            connected: false,
            job_active: false,
            trip_distance: 0.0,
            source: String::new(),
            destination: String::new(),
            cargo: String::new(),
            income: 0,
            fine_detected: false,
            fine_type: String::new(),
            fine_amount: 0,
            odometer: 0.0,
            speed: 0.0,
        }
    }
}

impl Snapshot {
    /// The snapshot used when the game is not running or unreadable.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// The odometer as whole kilometers, when the reading is usable.
    ///
    /// Only a positive reading counts; the value is display-only and never
    /// creates records.
    #[must_use]
    pub fn odometer_km(&self) -> Option<i64> {
        if self.odometer > 0.0 {
            #[allow(clippy::cast_possible_truncation)]
            Some(self.odometer.floor() as i64)
        } else {
            None
        }
    }
}

/// A source of telemetry snapshots.
///
/// One request/response seam: fetch the current snapshot, no arguments,
/// never an error. Production reads the plugin's file; tests script
/// sequences.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    /// The name of this source (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Fetch the current snapshot.
    ///
    /// Any failure yields [`Snapshot::disconnected`]; this method does not
    /// fail.
    async fn fetch(&self) -> Snapshot;
}

/// Reads snapshots from the JSON file the game plugin writes.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    /// Create a source reading from the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl SnapshotSource for FileSnapshotSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self) -> Snapshot {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) => {
                // Normal when the game is not running
                debug!("Telemetry file unreadable: {}", err);
                return Snapshot::disconnected();
            }
        };

        if raw.trim().is_empty() {
            return Snapshot::disconnected();
        }

        match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                // The plugin may be mid-write; treat as disconnected
                debug!("Telemetry file unparsable: {}", err);
                Snapshot::disconnected()
            }
        }
    }
}
