//! Per-sport fetch timestamps and staleness against a TTL.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::SportType;

/// Default time-to-live for fetched data, in seconds.
pub const DEFAULT_TTL_SECS: i64 = 30 * 60;

/// Last successful fetch of one sport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessRecord {
    /// Sport the record belongs to.
    pub sport_type: SportType,
    /// Start time of the newest fetch that was committed.
    pub last_fetched_at: DateTime<Utc>,
    /// Maximum data age before it counts as stale.
    pub ttl: TimeDelta,
}

impl FreshnessRecord {
    /// Instant at which the data turns stale.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.last_fetched_at
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Time until the next refresh is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshEta {
    /// Data is overdue or was never fetched.
    Refreshing,
    /// Data expires after the contained duration.
    In(TimeDelta),
}

impl fmt::Display for RefreshEta {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RefreshEta::Refreshing => formatter.write_str("refreshing"),
            RefreshEta::In(remaining) => {
                let minutes = remaining.num_minutes();
                if minutes < 1 {
                    formatter.write_str("in less than a minute")
                } else if minutes < 60 {
                    write!(formatter, "in {minutes} min")
                } else {
                    let hours = minutes / 60;
                    let rest = minutes % 60;
                    if rest == 0 {
                        write!(formatter, "in {hours} h")
                    } else {
                        write!(formatter, "in {hours} h {rest} min")
                    }
                }
            }
        }
    }
}

/// Tracks when each sport was last fetched successfully.
#[derive(Debug, Clone)]
pub struct FreshnessTracker {
    default_ttl: TimeDelta,
    ttl_overrides: HashMap<SportType, TimeDelta>,
    records: HashMap<SportType, FreshnessRecord>,
}

impl Default for FreshnessTracker {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(DEFAULT_TTL_SECS))
    }
}

impl FreshnessTracker {
    /// Create a tracker applying `default_ttl` to every sport.
    #[must_use]
    pub fn new(default_ttl: TimeDelta) -> Self {
        Self {
            default_ttl,
            ttl_overrides: HashMap::new(),
            records: HashMap::new(),
        }
    }

    /// Use a dedicated TTL for `sport`.
    #[must_use]
    pub fn with_ttl(mut self, sport: SportType, ttl: TimeDelta) -> Self {
        self.ttl_overrides.insert(sport, ttl);
        self
    }

    /// TTL that applies to `sport`.
    #[must_use]
    pub fn ttl_for(&self, sport: SportType) -> TimeDelta {
        self.ttl_overrides
            .get(&sport)
            .copied()
            .unwrap_or(self.default_ttl)
    }

    /// Record a successful fetch. Returns `false` and keeps the stored value when
    /// `fetched_at` is older than what is already recorded.
    pub fn record_fetch(&mut self, sport: SportType, fetched_at: DateTime<Utc>) -> bool {
        if self.is_outdated(sport, fetched_at) {
            return false;
        }
        let ttl = self.ttl_for(sport);
        self.records.insert(
            sport,
            FreshnessRecord {
                sport_type: sport,
                last_fetched_at: fetched_at,
                ttl,
            },
        );
        true
    }

    /// Whether a fetch tagged `fetched_at` is older than the stored one.
    #[must_use]
    pub fn is_outdated(&self, sport: SportType, fetched_at: DateTime<Utc>) -> bool {
        self.records
            .get(&sport)
            .is_some_and(|record| fetched_at < record.last_fetched_at)
    }

    /// Stored record for `sport`.
    #[must_use]
    pub fn record(&self, sport: SportType) -> Option<&FreshnessRecord> {
        self.records.get(&sport)
    }

    /// Whether the data of `sport` is older than its TTL at `now`.
    ///
    /// Exactly `ttl` of age is still fresh. Never-fetched sports are stale.
    #[must_use]
    pub fn is_stale(&self, sport: SportType, now: DateTime<Utc>) -> bool {
        self.records
            .get(&sport)
            .is_none_or(|record| now > record.expires_at())
    }

    /// Time until `sport` needs refreshing.
    #[must_use]
    pub fn next_refresh_eta(&self, sport: SportType, now: DateTime<Utc>) -> RefreshEta {
        match self.records.get(&sport) {
            Some(record) => {
                let remaining = record.expires_at() - now;
                if remaining < TimeDelta::zero() {
                    RefreshEta::Refreshing
                } else {
                    RefreshEta::In(remaining)
                }
            }
            None => RefreshEta::Refreshing,
        }
    }

    /// Forget every record.
    pub fn reset(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0)
            .single()
            .expect("valid instant")
    }

    #[fixture]
    fn tracker(fetched_at: DateTime<Utc>) -> FreshnessTracker {
        let mut tracker = FreshnessTracker::default();
        assert!(tracker.record_fetch(SportType::Badminton, fetched_at));
        tracker
    }

    #[rstest]
    #[case(TimeDelta::milliseconds(-1), false)]
    #[case(TimeDelta::zero(), false)]
    #[case(TimeDelta::milliseconds(1), true)]
    fn staleness_boundary(
        tracker: FreshnessTracker,
        fetched_at: DateTime<Utc>,
        #[case] offset: TimeDelta,
        #[case] stale: bool,
    ) {
        let now = fetched_at + TimeDelta::seconds(DEFAULT_TTL_SECS) + offset;
        assert_eq!(tracker.is_stale(SportType::Badminton, now), stale);
    }

    #[rstest]
    fn never_fetched_is_stale(tracker: FreshnessTracker, fetched_at: DateTime<Utc>) {
        assert!(tracker.is_stale(SportType::Tennis, fetched_at));
        assert_eq!(
            tracker.next_refresh_eta(SportType::Tennis, fetched_at),
            RefreshEta::Refreshing
        );
    }

    #[rstest]
    fn older_completion_does_not_overwrite(
        mut tracker: FreshnessTracker,
        fetched_at: DateTime<Utc>,
    ) {
        let earlier = fetched_at - TimeDelta::minutes(5);
        assert!(!tracker.record_fetch(SportType::Badminton, earlier));
        assert_eq!(
            tracker.record(SportType::Badminton).map(|record| record.last_fetched_at),
            Some(fetched_at)
        );

        let later = fetched_at + TimeDelta::minutes(5);
        assert!(tracker.record_fetch(SportType::Badminton, later));
        assert_eq!(
            tracker.record(SportType::Badminton).map(|record| record.last_fetched_at),
            Some(later)
        );
    }

    #[rstest]
    #[case(TimeDelta::minutes(5), "in 25 min")]
    #[case(TimeDelta::seconds(29 * 60 + 30), "in less than a minute")]
    #[case(TimeDelta::minutes(30), "in less than a minute")]
    #[case(TimeDelta::minutes(31), "refreshing")]
    fn eta_text(
        tracker: FreshnessTracker,
        fetched_at: DateTime<Utc>,
        #[case] elapsed: TimeDelta,
        #[case] expected: &str,
    ) {
        let eta = tracker.next_refresh_eta(SportType::Badminton, fetched_at + elapsed);
        assert_eq!(eta.to_string(), expected);
    }

    #[rstest]
    fn unbounded_ttl_never_expires(fetched_at: DateTime<Utc>) {
        let mut tracker = FreshnessTracker::new(TimeDelta::MAX);
        assert!(tracker.record_fetch(SportType::Volleyball, fetched_at));

        let record = tracker.record(SportType::Volleyball).expect("recorded");
        assert_eq!(record.expires_at(), DateTime::<Utc>::MAX_UTC);
        let later = fetched_at + TimeDelta::days(365 * 100);
        assert!(!tracker.is_stale(SportType::Volleyball, later));
        assert!(matches!(
            tracker.next_refresh_eta(SportType::Volleyball, later),
            RefreshEta::In(_)
        ));
    }

    #[rstest]
    fn per_sport_ttl_overrides_default(fetched_at: DateTime<Utc>) {
        let mut tracker =
            FreshnessTracker::default().with_ttl(SportType::Tennis, TimeDelta::hours(2));
        tracker.record_fetch(SportType::Tennis, fetched_at);

        let now = fetched_at + TimeDelta::minutes(45);
        assert!(!tracker.is_stale(SportType::Tennis, now));
        assert_eq!(
            tracker.next_refresh_eta(SportType::Tennis, now).to_string(),
            "in 1 h 15 min"
        );
    }

    #[rstest]
    fn reset_forgets_fetches(mut tracker: FreshnessTracker, fetched_at: DateTime<Utc>) {
        tracker.reset();
        assert!(tracker.is_stale(SportType::Badminton, fetched_at));
    }
}
