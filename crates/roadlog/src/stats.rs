//! Derived statistics for roadlog.
//!
//! Pure functions over trip and fine slices: the driver level ladder,
//! per-driver totals, the leaderboard, monthly aggregation and quota
//! progress. Everything is recomputed on demand; nothing here caches.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::DEFAULT_GOAL_KM;
use crate::record::{Fine, Trip, User};

/// Driver experience tier, derived from total driven distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Under 1 000 km.
    Beginner,
    /// Under 5 000 km.
    Amateur,
    /// Under 10 000 km.
    Trucker,
    /// Under 50 000 km.
    RoadKing,
    /// 50 000 km and beyond.
    Legend,
}

impl Level {
    /// Classify a total driven distance.
    ///
    /// Total over all inputs: every distance maps to exactly one tier.
    #[must_use]
    pub fn for_km(km: i64) -> Self {
        if km < 1_000 {
            Self::Beginner
        } else if km < 5_000 {
            Self::Amateur
        } else if km < 10_000 {
            Self::Trucker
        } else if km < 50_000 {
            Self::RoadKing
        } else {
            Self::Legend
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "Beginner"),
            Self::Amateur => write!(f, "Amateur"),
            Self::Trucker => write!(f, "Trucker"),
            Self::RoadKing => write!(f, "Road King"),
            Self::Legend => write!(f, "Legend"),
        }
    }
}

/// One driver's totals over a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriverTotals {
    /// Sum of trip distances in kilometers.
    pub distance_km: i64,
    /// Number of trips.
    pub trips: usize,
    /// Trip income minus fine amounts.
    pub net_profit: i64,
    /// Number of fines.
    pub fines: usize,
}

/// Compute one driver's totals, optionally restricted to a `YYYY-MM` month.
#[must_use]
pub fn driver_totals(
    email: &str,
    trips: &[Trip],
    fines: &[Fine],
    month: Option<&str>,
) -> DriverTotals {
    let mut totals = DriverTotals::default();

    for trip in trips
        .iter()
        .filter(|t| t.user_email == email)
        .filter(|t| month.map_or(true, |m| t.in_month(m)))
    {
        totals.distance_km += trip.distance_km;
        totals.trips += 1;
        totals.net_profit += trip.income.unwrap_or(0);
    }

    for fine in fines
        .iter()
        .filter(|f| f.user_email == email)
        .filter(|f| month.map_or(true, |m| f.in_month(m)))
    {
        totals.net_profit -= fine.amount;
        totals.fines += 1;
    }

    totals
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// Driver display name.
    pub name: String,
    /// Driver email.
    pub email: String,
    /// Period totals.
    pub totals: DriverTotals,
    /// Level derived from the period's distance.
    pub level: Level,
}

/// Rank every driver by period distance, highest first.
///
/// The sort is stable, so drivers with equal distances keep the order they
/// appear in `users` (registration order).
#[must_use]
pub fn leaderboard(
    users: &[User],
    trips: &[Trip],
    fines: &[Fine],
    month: Option<&str>,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = users
        .iter()
        .map(|user| {
            let totals = driver_totals(&user.email, trips, fines, month);
            LeaderboardEntry {
                name: user.name.clone(),
                email: user.email.clone(),
                totals,
                level: Level::for_km(totals.distance_km),
            }
        })
        .collect();

    entries.sort_by(|a, b| b.totals.distance_km.cmp(&a.totals.distance_km));
    entries
}

/// One calendar month of a driver's activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// Sortable `YYYY-MM` key.
    pub key: String,
    /// Distance driven that month.
    pub distance_km: i64,
    /// Number of loads delivered that month.
    pub loads: usize,
}

impl MonthBucket {
    /// Human-oriented `MM/YYYY` label for this bucket.
    #[must_use]
    pub fn label(&self) -> String {
        match self.key.split_once('-') {
            Some((year, month)) => format!("{month}/{year}"),
            None => self.key.clone(),
        }
    }
}

/// Group trips by calendar month, most recent month first.
#[must_use]
pub fn monthly_breakdown(trips: &[Trip]) -> Vec<MonthBucket> {
    let mut buckets: BTreeMap<String, MonthBucket> = BTreeMap::new();

    for trip in trips {
        let key = trip.month_key();
        let bucket = buckets.entry(key.clone()).or_insert_with(|| MonthBucket {
            key,
            distance_km: 0,
            loads: 0,
        });
        bucket.distance_km += trip.distance_km;
        bucket.loads += 1;
    }

    buckets.into_values().rev().collect()
}

/// A driver's progress toward their distance goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuotaProgress {
    /// The goal in effect, in kilometers.
    pub goal_km: i64,
    /// Distance driven so far.
    pub driven_km: i64,
    /// Distance still to drive; never negative.
    pub remaining_km: i64,
    /// Percentage complete, clamped to 100.
    pub percent: f64,
}

/// Compute quota progress against a goal.
///
/// An unset or non-positive goal falls back to [`DEFAULT_GOAL_KM`], so the
/// division is always well-defined.
#[must_use]
pub fn quota_progress(driven_km: i64, goal_km: Option<i64>) -> QuotaProgress {
    let goal_km = match goal_km {
        Some(goal) if goal > 0 => goal,
        _ => DEFAULT_GOAL_KM,
    };

    let remaining_km = (goal_km - driven_km).max(0);

    #[allow(clippy::cast_precision_loss)]
    let percent = (driven_km as f64 / goal_km as f64 * 100.0).min(100.0);

    QuotaProgress {
        goal_km,
        driven_km,
        remaining_km,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{User, UserStatus};
    use chrono::{DateTime, Utc};

    fn date(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn trip(email: &str, km: i64, income: Option<i64>, when: &str) -> Trip {
        Trip {
            id: None,
            user_email: email.to_string(),
            source: "Rotterdam".to_string(),
            destination: "Berlin".to_string(),
            distance_km: km,
            cargo: "Machinery".to_string(),
            income,
            date: date(when),
        }
    }

    fn fine(email: &str, amount: i64, when: &str) -> Fine {
        Fine {
            id: None,
            user_email: email.to_string(),
            offence: "Speeding".to_string(),
            amount,
            date: date(when),
        }
    }

    fn user(name: &str, email: &str) -> User {
        User {
            name: name.to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
            status: UserStatus::Active,
            avatar: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_level_tiers() {
        assert_eq!(Level::for_km(0), Level::Beginner);
        assert_eq!(Level::for_km(999), Level::Beginner);
        assert_eq!(Level::for_km(1_000), Level::Amateur);
        assert_eq!(Level::for_km(4_999), Level::Amateur);
        assert_eq!(Level::for_km(5_000), Level::Trucker);
        assert_eq!(Level::for_km(9_999), Level::Trucker);
        assert_eq!(Level::for_km(10_000), Level::RoadKing);
        assert_eq!(Level::for_km(49_999), Level::RoadKing);
        assert_eq!(Level::for_km(50_000), Level::Legend);
        assert_eq!(Level::for_km(1_000_000), Level::Legend);
    }

    #[test]
    fn test_level_monotonic() {
        // Tiers never go backwards as distance grows
        let tier = |km| match Level::for_km(km) {
            Level::Beginner => 0,
            Level::Amateur => 1,
            Level::Trucker => 2,
            Level::RoadKing => 3,
            Level::Legend => 4,
        };
        let mut last = 0;
        for km in (0..60_000).step_by(250) {
            let t = tier(km);
            assert!(t >= last, "tier regressed at {km} km");
            last = t;
        }
    }

    #[test]
    fn test_level_display() {
        assert_eq!(Level::Beginner.to_string(), "Beginner");
        assert_eq!(Level::RoadKing.to_string(), "Road King");
        assert_eq!(Level::Legend.to_string(), "Legend");
    }

    #[test]
    fn test_driver_totals_all_time() {
        let trips = vec![
            trip("a@x.com", 100, Some(1_000), "2024-01-05T10:00:00Z"),
            trip("a@x.com", 200, None, "2024-02-01T10:00:00Z"),
            trip("b@x.com", 999, Some(9_999), "2024-01-05T10:00:00Z"),
        ];
        let fines = vec![
            fine("a@x.com", 300, "2024-01-10T10:00:00Z"),
            fine("b@x.com", 1, "2024-01-10T10:00:00Z"),
        ];

        let totals = driver_totals("a@x.com", &trips, &fines, None);
        assert_eq!(totals.distance_km, 300);
        assert_eq!(totals.trips, 2);
        assert_eq!(totals.net_profit, 700);
        assert_eq!(totals.fines, 1);
    }

    #[test]
    fn test_driver_totals_month_filter() {
        let trips = vec![
            trip("a@x.com", 100, Some(1_000), "2024-01-05T10:00:00Z"),
            trip("a@x.com", 200, Some(2_000), "2024-02-01T10:00:00Z"),
        ];
        let fines = vec![fine("a@x.com", 500, "2024-02-02T10:00:00Z")];

        let january = driver_totals("a@x.com", &trips, &fines, Some("2024-01"));
        assert_eq!(january.distance_km, 100);
        assert_eq!(january.trips, 1);
        assert_eq!(january.net_profit, 1_000);
        assert_eq!(january.fines, 0);

        let february = driver_totals("a@x.com", &trips, &fines, Some("2024-02"));
        assert_eq!(february.distance_km, 200);
        assert_eq!(february.net_profit, 1_500);
        assert_eq!(february.fines, 1);
    }

    #[test]
    fn test_driver_totals_empty() {
        let totals = driver_totals("nobody@x.com", &[], &[], None);
        assert_eq!(totals, DriverTotals::default());
    }

    #[test]
    fn test_leaderboard_sorted_by_distance() {
        let users = vec![user("Slow", "slow@x.com"), user("Fast", "fast@x.com")];
        let trips = vec![
            trip("slow@x.com", 100, None, "2024-01-05T10:00:00Z"),
            trip("fast@x.com", 900, None, "2024-01-06T10:00:00Z"),
        ];

        let board = leaderboard(&users, &trips, &[], None);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].email, "fast@x.com");
        assert_eq!(board[0].totals.distance_km, 900);
        assert_eq!(board[1].email, "slow@x.com");
    }

    #[test]
    fn test_leaderboard_ties_keep_registration_order() {
        let users = vec![
            user("First", "first@x.com"),
            user("Second", "second@x.com"),
            user("Third", "third@x.com"),
        ];
        // All tied at zero distance
        let board = leaderboard(&users, &[], &[], None);
        let emails: Vec<&str> = board.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(emails, vec!["first@x.com", "second@x.com", "third@x.com"]);
    }

    #[test]
    fn test_leaderboard_level_follows_period_distance() {
        let users = vec![user("Vet", "vet@x.com")];
        let trips = vec![
            trip("vet@x.com", 60_000, None, "2024-01-05T10:00:00Z"),
            trip("vet@x.com", 500, None, "2024-02-05T10:00:00Z"),
        ];

        let all_time = leaderboard(&users, &trips, &[], None);
        assert_eq!(all_time[0].level, Level::Legend);

        // Within February alone the same driver ranks as a beginner
        let february = leaderboard(&users, &trips, &[], Some("2024-02"));
        assert_eq!(february[0].level, Level::Beginner);
    }

    #[test]
    fn test_monthly_breakdown_groups_and_orders() {
        let trips = vec![
            trip("a@x.com", 80, None, "2024-01-05T10:00:00Z"),
            trip("a@x.com", 20, None, "2024-01-20T10:00:00Z"),
            trip("a@x.com", 10, None, "2024-02-01T10:00:00Z"),
        ];

        let buckets = monthly_breakdown(&trips);
        assert_eq!(buckets.len(), 2);

        // Most recent month first
        assert_eq!(buckets[0].key, "2024-02");
        assert_eq!(buckets[0].distance_km, 10);
        assert_eq!(buckets[0].loads, 1);

        assert_eq!(buckets[1].key, "2024-01");
        assert_eq!(buckets[1].distance_km, 100);
        assert_eq!(buckets[1].loads, 2);
    }

    #[test]
    fn test_monthly_breakdown_empty() {
        assert!(monthly_breakdown(&[]).is_empty());
    }

    #[test]
    fn test_monthly_breakdown_spans_years() {
        let trips = vec![
            trip("a@x.com", 50, None, "2023-12-28T10:00:00Z"),
            trip("a@x.com", 60, None, "2024-01-02T10:00:00Z"),
        ];

        let buckets = monthly_breakdown(&trips);
        assert_eq!(buckets[0].key, "2024-01");
        assert_eq!(buckets[1].key, "2023-12");
    }

    #[test]
    fn test_month_bucket_label() {
        let bucket = MonthBucket {
            key: "2024-01".to_string(),
            distance_km: 100,
            loads: 2,
        };
        assert_eq!(bucket.label(), "01/2024");
    }

    #[test]
    fn test_quota_progress_at_zero() {
        let progress = quota_progress(0, Some(10_000));
        assert_eq!(progress.remaining_km, 10_000);
        assert!((progress.percent - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quota_progress_at_goal() {
        let progress = quota_progress(10_000, Some(10_000));
        assert_eq!(progress.remaining_km, 0);
        assert!((progress.percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quota_progress_clamped_past_goal() {
        let progress = quota_progress(15_000, Some(10_000));
        assert_eq!(progress.remaining_km, 0);
        assert!((progress.percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quota_progress_unset_goal_uses_default() {
        let progress = quota_progress(5_000, None);
        assert_eq!(progress.goal_km, DEFAULT_GOAL_KM);
        assert_eq!(progress.remaining_km, 5_000);
        assert!((progress.percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quota_progress_zero_goal_uses_default() {
        // A zero goal must never divide
        let progress = quota_progress(5_000, Some(0));
        assert_eq!(progress.goal_km, DEFAULT_GOAL_KM);
    }

    #[test]
    fn test_quota_progress_halfway() {
        let progress = quota_progress(2_500, Some(10_000));
        assert_eq!(progress.remaining_km, 7_500);
        assert!((progress.percent - 25.0).abs() < f64::EPSILON);
    }
}
