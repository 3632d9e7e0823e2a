//! Edge-detection state machine for telemetry snapshots.
//!
//! Consecutive snapshots are folded into discrete domain events: a trip
//! completion on the falling edge of `job_active`, a fine on the rising
//! edge of `fine_detected`. The machine holds all cross-tick state
//! explicitly, so the debounce and edge logic is testable without a clock
//! or a file.

use chrono::{DateTime, Duration, Utc};

use super::Snapshot;

/// Offence recorded when the game reports a fine without naming one.
const DEFAULT_OFFENCE: &str = "Unknown offence";

/// A domain event derived from the telemetry stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// A delivery finished.
    TripCompleted {
        /// Departure city.
        source: String,
        /// Arrival city.
        destination: String,
        /// Driven distance, rounded to whole kilometers.
        distance_km: i64,
        /// Cargo description.
        cargo: String,
        /// Delivery income, when the game reported one.
        income: Option<i64>,
    },

    /// A fine was issued.
    FineIssued {
        /// What the driver was fined for.
        offence: String,
        /// Fined amount.
        amount: i64,
    },
}

/// Where the job edge detector currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobPhase {
    /// No job underway.
    Idle,
    /// A job is underway; its falling edge will complete a trip.
    Active,
    /// A trip just completed; further completions are suppressed until
    /// `until`. The job flag is still tracked so an edge that lands on the
    /// expiry tick is not lost.
    Cooldown {
        until: DateTime<Utc>,
        job_active: bool,
    },
}

/// Where the fine edge detector currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinePhase {
    /// No fine flag held.
    Clear,
    /// The fine flag is held high; it already fired and stays silent
    /// until the flag drops.
    Active,
}

/// Folds snapshots into [`TrackerEvent`]s.
///
/// State starts at idle/clear and is never persisted: a job already active
/// at startup is only seen from its next observed edge.
#[derive(Debug)]
pub struct Tracker {
    job: JobPhase,
    fine: FinePhase,
    cooldown: Duration,
    min_trip_km: f64,
}

impl Tracker {
    /// Create a tracker with the given debounce window and minimum
    /// recordable trip distance.
    #[must_use]
    pub fn new(cooldown: Duration, min_trip_km: f64) -> Self {
        Self {
            job: JobPhase::Idle,
            fine: FinePhase::Clear,
            cooldown,
            min_trip_km,
        }
    }

    /// Feed one snapshot, observed at `now`, returning any events it
    /// produced.
    ///
    /// A disconnected snapshot freezes the machine: no events, no
    /// transitions.
    pub fn observe(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<TrackerEvent> {
        if !snapshot.connected {
            return Vec::new();
        }

        let mut events = Vec::new();
        self.job = self.step_job(snapshot, now, &mut events);
        self.fine = Self::step_fine(self.fine, snapshot, &mut events);
        events
    }

    /// Advance the job phase, pushing a trip completion where one fires.
    fn step_job(
        &self,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
        events: &mut Vec<TrackerEvent>,
    ) -> JobPhase {
        match self.job {
            JobPhase::Idle => {
                if snapshot.job_active {
                    JobPhase::Active
                } else {
                    JobPhase::Idle
                }
            }

            JobPhase::Active => {
                if snapshot.job_active {
                    JobPhase::Active
                } else {
                    // Falling edge. The cooldown starts whether or not the
                    // distance gate lets the event through.
                    self.push_trip(snapshot, events);
                    JobPhase::Cooldown {
                        until: now + self.cooldown,
                        job_active: false,
                    }
                }
            }

            JobPhase::Cooldown { until, job_active } => {
                if now <= until {
                    // Still suppressed; keep following the flag so the edge
                    // on the expiry tick is seen.
                    JobPhase::Cooldown {
                        until,
                        job_active: snapshot.job_active,
                    }
                } else if job_active && !snapshot.job_active {
                    // The window closed exactly as a falling edge landed.
                    self.push_trip(snapshot, events);
                    JobPhase::Cooldown {
                        until: now + self.cooldown,
                        job_active: false,
                    }
                } else if snapshot.job_active {
                    JobPhase::Active
                } else {
                    JobPhase::Idle
                }
            }
        }
    }

    /// Push a trip completion unless the distance gate suppresses it.
    fn push_trip(&self, snapshot: &Snapshot, events: &mut Vec<TrackerEvent>) {
        if snapshot.trip_distance <= self.min_trip_km {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let distance_km = snapshot.trip_distance.round() as i64;
        events.push(TrackerEvent::TripCompleted {
            source: snapshot.source.clone(),
            destination: snapshot.destination.clone(),
            distance_km,
            cargo: snapshot.cargo.clone(),
            income: (snapshot.income != 0).then_some(snapshot.income),
        });
    }

    /// Advance the fine phase, pushing a fine on the rising edge only.
    fn step_fine(phase: FinePhase, snapshot: &Snapshot, events: &mut Vec<TrackerEvent>) -> FinePhase {
        match (phase, snapshot.fine_detected) {
            (FinePhase::Clear, true) => {
                let offence = if snapshot.fine_type.is_empty() {
                    DEFAULT_OFFENCE.to_string()
                } else {
                    snapshot.fine_type.clone()
                };
                events.push(TrackerEvent::FineIssued {
                    offence,
                    amount: snapshot.fine_amount,
                });
                FinePhase::Active
            }
            (FinePhase::Active, true) => FinePhase::Active,
            (_, false) => FinePhase::Clear,
        }
    }
}
