//! Brute-force throttle window math.
//!
//! Token submissions are tracked per source IP in the `invalid_attempts`
//! table (see `skiff_db`). This module holds the pure lockout decisions
//! so they can be unit-tested without a database.

use chrono::Duration;

use crate::types::Timestamp;

/// Invalid submissions allowed before an IP is locked out.
pub const MAX_INVALID_ATTEMPTS: i64 = 5;

/// Rolling window over which invalid attempts count.
pub fn attempt_window() -> Duration {
    Duration::hours(1)
}

/// Whether an IP with the given tracked state is currently locked out.
///
/// Locked iff the attempt count has reached [`MAX_INVALID_ATTEMPTS`] and
/// the last attempt is strictly newer than the window start. An attempt
/// stamped exactly at `now - window` is treated as outside the window.
pub fn is_locked(attempts: i64, last_attempt_at: Timestamp, now: Timestamp) -> bool {
    attempts >= MAX_INVALID_ATTEMPTS && last_attempt_at > now - attempt_window()
}

/// Attempt count to record after a failed submission.
///
/// Tracked state older than the window restarts the count at 1,
/// otherwise the count increments.
pub fn next_attempt_count(existing: Option<(i64, Timestamp)>, now: Timestamp) -> i64 {
    match existing {
        Some((attempts, last)) if last > now - attempt_window() => attempts + 1,
        _ => 1,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn locked_after_max_attempts_within_window() {
        let now = Utc::now();
        assert!(is_locked(5, now - Duration::minutes(10), now));
        assert!(is_locked(7, now - Duration::minutes(59), now));
    }

    #[test]
    fn not_locked_below_max_attempts() {
        let now = Utc::now();
        assert!(!is_locked(4, now, now));
        assert!(!is_locked(0, now, now));
    }

    #[test]
    fn not_locked_once_window_elapsed() {
        let now = Utc::now();
        assert!(!is_locked(5, now - Duration::hours(2), now));
    }

    #[test]
    fn window_boundary_is_exclusive() {
        // An attempt exactly one window old no longer counts as locked;
        // one second newer still does.
        let now = Utc::now();
        assert!(!is_locked(5, now - attempt_window(), now));
        assert!(is_locked(5, now - attempt_window() + Duration::seconds(1), now));
    }

    #[test]
    fn failure_increments_within_window() {
        let now = Utc::now();
        assert_eq!(next_attempt_count(Some((3, now - Duration::minutes(5))), now), 4);
    }

    #[test]
    fn failure_resets_after_window() {
        let now = Utc::now();
        assert_eq!(next_attempt_count(Some((5, now - Duration::hours(3))), now), 1);
    }

    #[test]
    fn first_failure_starts_at_one() {
        assert_eq!(next_attempt_count(None, Utc::now()), 1);
    }
}
