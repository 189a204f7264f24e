//! When to check for news.
//!
//! Checks run every five minutes, fifteen seconds after each five-minute
//! boundary of the hour (UTC).

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Timelike, Utc};

/// Minutes between checks.
pub const POLL_INTERVAL_MINUTES: u32 = 5;
/// Seconds past the boundary at which a check runs.
pub const POLL_OFFSET_SECONDS: u32 = 15;
/// At startup, check right away when the first boundary is further off
/// than this.
pub const IMMEDIATE_CHECK_AFTER: Duration = Duration::from_secs(30);

/// Time from `now` until the first scheduled check.
pub fn initial_delay(now: DateTime<Utc>) -> Duration {
    let interval = f64::from(POLL_INTERVAL_MINUTES);
    let minutes = f64::from(now.minute())
        + f64::from(now.second()) / 60.0
        + f64::from(now.nanosecond().min(999_999_999)) / 60e9;
    let into_interval = minutes % interval;
    Duration::from_secs_f64(60.0 * (interval - into_interval) + f64::from(POLL_OFFSET_SECONDS))
}

/// Whether a check should also run immediately at startup.
pub fn checks_at_startup(now: DateTime<Utc>) -> bool {
    initial_delay(now) > IMMEDIATE_CHECK_AFTER
}

/// When the check after the one running at `now` is due.
pub fn next_check(now: DateTime<Utc>) -> DateTime<Utc> {
    let later = now + TimeDelta::minutes(i64::from(POLL_INTERVAL_MINUTES));
    later
        .with_second(POLL_OFFSET_SECONDS)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(later)
}

/// Time from `now` until [`next_check`].
pub fn delay_until_next(now: DateTime<Utc>) -> Duration {
    (next_check(now) - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 6, 1, h, m, s).unwrap()
    }

    #[test]
    fn first_check_waits_for_boundary_plus_offset() {
        assert_eq!(initial_delay(at(12, 3, 0)), Duration::from_secs(135));
        assert_eq!(initial_delay(at(12, 0, 0)), Duration::from_secs(315));
        assert_eq!(initial_delay(at(12, 59, 30)), Duration::from_secs(45));
    }

    #[test]
    fn startup_check_only_when_boundary_is_far() {
        assert!(checks_at_startup(at(12, 3, 0)));
        assert!(!checks_at_startup(at(12, 4, 50)));
    }

    #[test]
    fn next_check_lands_on_offset_second() {
        assert_eq!(next_check(at(12, 5, 15)), at(12, 10, 15));
        assert_eq!(next_check(at(12, 5, 16)), at(12, 10, 15));
        assert_eq!(next_check(at(23, 58, 0)), Utc.with_ymd_and_hms(2019, 6, 2, 0, 3, 15).unwrap());
        assert_eq!(delay_until_next(at(12, 5, 15)), Duration::from_secs(300));
    }
}
