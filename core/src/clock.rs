//! Refresh clock — owns the reload schedule.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshClock {
    pub interval:    Duration,
    pub last_loaded: DateTime<Utc>,
    pub reloads:     u64,
}

impl RefreshClock {
    pub fn new(interval: Duration, loaded_at: DateTime<Utc>) -> Self {
        Self {
            interval,
            last_loaded: loaded_at,
            reloads: 0,
        }
    }

    /// Saturates at the latest representable instant.
    pub fn next_due(&self) -> DateTime<Utc> {
        self.last_loaded
            .checked_add_signed(self.interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_due()
    }

    /// Record a completed reload.
    pub fn mark_loaded(&mut self, now: DateTime<Utc>) {
        self.last_loaded = now;
        self.reloads += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn due_after_one_full_interval() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut clock = RefreshClock::new(Duration::hours(12), start);
        assert!(!clock.is_due(start + Duration::hours(11)));
        assert!(clock.is_due(start + Duration::hours(12)));

        clock.mark_loaded(start + Duration::hours(12));
        assert_eq!(clock.reloads, 1);
        assert!(!clock.is_due(start + Duration::hours(23)));
        assert_eq!(clock.next_due(), start + Duration::hours(24));
    }

    #[test]
    fn huge_interval_is_never_due() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = RefreshClock::new(Duration::MAX, start);
        assert_eq!(clock.next_due(), DateTime::<Utc>::MAX_UTC);
        assert!(!clock.is_due(start + Duration::days(365 * 100)));
    }
}
