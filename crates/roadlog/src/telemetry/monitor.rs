//! Polling monitor bridging telemetry snapshots into domain events.
//!
//! A [`TelemetryMonitor`] polls a [`SnapshotSource`] on a fixed interval,
//! feeds each snapshot through the [`Tracker`] state machine, and sends
//! the resulting updates over an mpsc channel. A cloneable handle stops
//! the loop; its lifetime is tied to the command that started it.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::tracker::{Tracker, TrackerEvent};
use super::SnapshotSource;

/// What the monitor reports to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorUpdate {
    /// The game's connection state changed.
    Connection(bool),

    /// The odometer moved to a new whole-kilometer reading.
    /// Display only; never creates records.
    Odometer {
        /// The reading in whole kilometers.
        km: i64,
    },

    /// The state machine produced a domain event.
    Event(TrackerEvent),
}

/// A handle to stop a running monitor.
///
/// Lightweight and cloneable; every clone shares the same signal.
#[derive(Debug, Clone, Default)]
pub struct MonitorHandle {
    stop_signal: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl MonitorHandle {
    /// Create a new handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the monitor to stop.
    pub fn stop(&self) {
        self.stop_signal
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Check if the stop signal has been sent.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// Polls a snapshot source and reports updates.
#[derive(Debug)]
pub struct TelemetryMonitor<S> {
    source: S,
    tracker: Tracker,
    poll_interval: Duration,
    handle: MonitorHandle,
}

impl<S: SnapshotSource> TelemetryMonitor<S> {
    /// Create a monitor over the given source and state machine.
    #[must_use]
    pub fn new(source: S, tracker: Tracker, poll_interval: Duration) -> Self {
        Self {
            source,
            tracker,
            poll_interval,
            handle: MonitorHandle::new(),
        }
    }

    /// Get a handle that stops this monitor.
    #[must_use]
    pub fn handle(&self) -> MonitorHandle {
        self.handle.clone()
    }

    /// Run the poll loop until stopped or the receiver goes away.
    ///
    /// Each tick fetches a snapshot (a fetch failure is a disconnected
    /// snapshot, never an error), reports connection and odometer changes,
    /// and forwards state-machine events.
    pub async fn run(mut self, tx: mpsc::Sender<MonitorUpdate>) {
        info!(
            "Telemetry monitor started ({} source, every {:?})",
            self.source.name(),
            self.poll_interval
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        let mut last_connected = false;
        let mut last_odometer: Option<i64> = None;

        loop {
            ticker.tick().await;

            if self.handle.should_stop() || tx.is_closed() {
                break;
            }

            let snapshot = self.source.fetch().await;

            if snapshot.connected != last_connected {
                last_connected = snapshot.connected;
                if tx
                    .send(MonitorUpdate::Connection(snapshot.connected))
                    .await
                    .is_err()
                {
                    break;
                }
            }

            if let Some(km) = snapshot.odometer_km() {
                if last_odometer != Some(km) {
                    last_odometer = Some(km);
                    if tx.send(MonitorUpdate::Odometer { km }).await.is_err() {
                        break;
                    }
                }
            }

            for event in self.tracker.observe(&snapshot, Utc::now()) {
                debug!("Telemetry event: {:?}", event);
                if tx.send(MonitorUpdate::Event(event)).await.is_err() {
                    break;
                }
            }
        }

        info!("Telemetry monitor stopped");
    }
}
