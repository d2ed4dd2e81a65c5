//! Notification dedup policy.
//!
//! Identical alert messages to the same user within a short window are
//! suppressed as a courtesy. This is not a correctness mechanism; the
//! at-most-once guarantee for alert rules lives in the rule evaluator.

use chrono::{DateTime, Duration, Utc};

/// Default suppression window for identical notifications, in minutes.
pub const DEFAULT_DEDUP_MINUTES: i64 = 5;

/// Returns the default dedup window.
#[must_use]
pub fn default_dedup_window() -> Duration {
    Duration::minutes(DEFAULT_DEDUP_MINUTES)
}

/// Decides whether a new identical message should be suppressed, given when
/// the previous one was stored.
#[must_use]
pub fn within_dedup_window(
    previous_sent_at: DateTime<Utc>,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    now - previous_sent_at < window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_duplicate_is_suppressed() {
        let now = Utc::now();
        let previous = now - Duration::minutes(2);
        assert!(within_dedup_window(previous, now, default_dedup_window()));
    }

    #[test]
    fn test_old_duplicate_is_not_suppressed() {
        let now = Utc::now();
        let previous = now - Duration::minutes(6);
        assert!(!within_dedup_window(previous, now, default_dedup_window()));
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let now = Utc::now();
        let previous = now - Duration::minutes(DEFAULT_DEDUP_MINUTES);
        assert!(!within_dedup_window(previous, now, default_dedup_window()));
    }
}
