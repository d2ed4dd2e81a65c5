//! Alert threshold decisions.
//!
//! Pure decision functions for the alert rule evaluator. The db crate locks
//! the rule set, maps rows to [`RuleState`], and asks these functions which
//! rules cross their threshold; it never re-derives the arithmetic itself.

use rust_decimal::Decimal;

use super::types::{RuleState, ThresholdType};

/// Decides whether a rule's threshold is crossed by the aggregated spend.
///
/// - `Percent`: triggers iff `limit > 0` and
///   `spent >= limit * threshold_value / 100`. A zero limit never triggers;
///   that is defined behavior, not an error.
/// - `Amount`: triggers iff `spent >= threshold_value`.
///
/// Armed/fired state and the enabled flag are the caller's concern; this
/// function only answers the arithmetic question.
#[must_use]
pub fn rule_should_trigger(spent: Decimal, limit: Decimal, rule: &RuleState) -> bool {
    match rule.threshold_type {
        ThresholdType::Percent => {
            if limit <= Decimal::ZERO {
                return false;
            }
            let target = limit * rule.threshold_value / Decimal::ONE_HUNDRED;
            spent >= target
        }
        ThresholdType::Amount => spent >= rule.threshold_value,
    }
}

/// Formats the user-facing alert message for a triggered rule.
#[must_use]
pub fn alert_message(budget_name: &str, spent: Decimal, limit: Decimal, rule: &RuleState) -> String {
    match rule.threshold_type {
        ThresholdType::Percent => format!(
            "Budget '{budget_name}': spending reached {}% of the {limit} limit (spent {spent})",
            rule.threshold_value
        ),
        ThresholdType::Amount => format!(
            "Budget '{budget_name}': spending reached {} (spent {spent} of {limit})",
            rule.threshold_value
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn rule(threshold_type: ThresholdType, threshold_value: Decimal) -> RuleState {
        RuleState {
            id: Uuid::new_v4(),
            threshold_type,
            threshold_value,
            is_enabled: true,
            last_triggered_at: None,
        }
    }

    #[test]
    fn test_percent_threshold_boundary() {
        // limit 1000.00 with a 50% rule; 499.99 is below, 500.00 fires
        let fifty = rule(ThresholdType::Percent, dec!(50));
        assert!(!rule_should_trigger(dec!(499.99), dec!(1000.00), &fifty));
        assert!(rule_should_trigger(dec!(500.00), dec!(1000.00), &fifty));
        assert!(rule_should_trigger(dec!(500.01), dec!(1000.00), &fifty));
    }

    #[test]
    fn test_amount_threshold_boundary() {
        let five_hundred = rule(ThresholdType::Amount, dec!(500.00));
        assert!(!rule_should_trigger(dec!(499.99), dec!(1000.00), &five_hundred));
        assert!(rule_should_trigger(dec!(500.00), dec!(1000.00), &five_hundred));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-100))]
    fn test_percent_with_non_positive_limit_never_triggers(#[case] limit: Decimal) {
        let r = rule(ThresholdType::Percent, dec!(10));
        assert!(!rule_should_trigger(dec!(1_000_000), limit, &r));
    }

    #[test]
    fn test_amount_threshold_ignores_limit() {
        let r = rule(ThresholdType::Amount, dec!(50));
        assert!(rule_should_trigger(dec!(50), dec!(0), &r));
    }

    #[test]
    fn test_over_100_percent_threshold() {
        let r = rule(ThresholdType::Percent, dec!(120));
        assert!(!rule_should_trigger(dec!(1000), dec!(1000), &r));
        assert!(rule_should_trigger(dec!(1200), dec!(1000), &r));
    }

    #[test]
    fn test_trigger_decision_independent_of_fired_state() {
        // The arithmetic ignores last_triggered_at; skipping fired rules is
        // the evaluator's job under the lock.
        let mut r = rule(ThresholdType::Amount, dec!(100));
        r.last_triggered_at = Some(Utc::now());
        assert!(rule_should_trigger(dec!(100), dec!(1000), &r));
    }

    #[test]
    fn test_alert_messages_name_the_budget() {
        let pct = rule(ThresholdType::Percent, dec!(50));
        let msg = alert_message("Food", dec!(500.00), dec!(1000.00), &pct);
        assert!(msg.contains("Food"));
        assert!(msg.contains("50"));

        let amt = rule(ThresholdType::Amount, dec!(500.00));
        let msg = alert_message("Food", dec!(500.00), dec!(1000.00), &amt);
        assert!(msg.contains("500.00"));
    }
}
