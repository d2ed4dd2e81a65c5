//! Budget domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::BudgetError;

/// Kind of threshold an alert rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThresholdType {
    /// Percentage points of the budget limit.
    Percent,
    /// Absolute currency amount.
    Amount,
}

/// What a budget restricts spend aggregation to.
///
/// A tagged union instead of a `(scope_type, scope_ref_id)` pair: scoped
/// variants cannot be constructed without their reference id. `Category` is
/// retained because stored budgets may carry it, but transactions have no
/// category association, so the aggregator degrades that scope to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope_type", content = "scope_ref_id")]
pub enum BudgetScope {
    /// All spend of the owning user.
    #[serde(rename = "ALL")]
    All,
    /// Spend on one account.
    #[serde(rename = "ACCOUNT")]
    Account(Uuid),
    /// Spend in one category. Unsupported by the transaction model;
    /// aggregates to zero.
    #[serde(rename = "CATEGORY")]
    Category(Uuid),
    /// Spend carrying one tag.
    #[serde(rename = "TAG")]
    Tag(Uuid),
}

impl BudgetScope {
    /// Reconstructs a scope from its stored representation.
    ///
    /// # Errors
    ///
    /// Returns `MissingScopeRef` for a scoped type without a reference id,
    /// or `UnknownScopeType` for an unrecognized type string.
    pub fn from_stored(scope_type: &str, scope_ref_id: Option<Uuid>) -> Result<Self, BudgetError> {
        match scope_type {
            "ALL" => Ok(Self::All),
            "ACCOUNT" => scope_ref_id
                .map(Self::Account)
                .ok_or(BudgetError::MissingScopeRef("ACCOUNT")),
            "CATEGORY" => scope_ref_id
                .map(Self::Category)
                .ok_or(BudgetError::MissingScopeRef("CATEGORY")),
            "TAG" => scope_ref_id
                .map(Self::Tag)
                .ok_or(BudgetError::MissingScopeRef("TAG")),
            other => Err(BudgetError::UnknownScopeType(other.to_string())),
        }
    }

    /// The stored type discriminant.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Account(_) => "ACCOUNT",
            Self::Category(_) => "CATEGORY",
            Self::Tag(_) => "TAG",
        }
    }

    /// The stored reference id, if the scope has one.
    #[must_use]
    pub const fn ref_id(&self) -> Option<Uuid> {
        match self {
            Self::All => None,
            Self::Account(id) | Self::Category(id) | Self::Tag(id) => Some(*id),
        }
    }
}

/// An inclusive date range a budget covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPeriod {
    /// First day of the period (inclusive).
    pub start: NaiveDate,
    /// Last day of the period (inclusive).
    pub end: NaiveDate,
}

impl BudgetPeriod {
    /// Creates a period, enforcing `start <= end`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod` if the start is after the end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BudgetError> {
        if start > end {
            return Err(BudgetError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns true if the date falls within the period, inclusive on both ends.
    #[must_use]
    pub fn contains(&self, on: NaiveDate) -> bool {
        self.start <= on && on <= self.end
    }
}

/// Snapshot of an alert rule taken under the rule-set lock.
#[derive(Debug, Clone)]
pub struct RuleState {
    /// The rule ID.
    pub id: Uuid,
    /// Kind of threshold.
    pub threshold_type: ThresholdType,
    /// Threshold value: percentage points if `Percent`, currency if `Amount`.
    pub threshold_value: Decimal,
    /// Whether the rule participates in evaluation.
    pub is_enabled: bool,
    /// When the rule fired, if ever. A fired rule never fires again.
    pub last_triggered_at: Option<DateTime<Utc>>,
}

impl RuleState {
    /// Returns true if the rule has never fired and may still trigger.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.last_triggered_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_rejects_inverted_range() {
        let result = BudgetPeriod::new(date(2026, 2, 1), date(2026, 1, 1));
        assert!(matches!(result, Err(BudgetError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_period_contains_is_inclusive() {
        let period = BudgetPeriod::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        assert!(period.contains(date(2026, 1, 1)));
        assert!(period.contains(date(2026, 1, 15)));
        assert!(period.contains(date(2026, 1, 31)));
        assert!(!period.contains(date(2025, 12, 31)));
        assert!(!period.contains(date(2026, 2, 1)));
    }

    #[test]
    fn test_single_day_period() {
        let day = date(2026, 3, 10);
        let period = BudgetPeriod::new(day, day).unwrap();
        assert!(period.contains(day));
    }

    #[test]
    fn test_scope_from_stored() {
        let id = Uuid::new_v4();
        assert_eq!(BudgetScope::from_stored("ALL", None), Ok(BudgetScope::All));
        assert_eq!(
            BudgetScope::from_stored("ACCOUNT", Some(id)),
            Ok(BudgetScope::Account(id))
        );
        assert_eq!(
            BudgetScope::from_stored("TAG", Some(id)),
            Ok(BudgetScope::Tag(id))
        );
        assert_eq!(
            BudgetScope::from_stored("ACCOUNT", None),
            Err(BudgetError::MissingScopeRef("ACCOUNT"))
        );
        assert_eq!(
            BudgetScope::from_stored("GLOBAL", None),
            Err(BudgetError::UnknownScopeType("GLOBAL".to_string()))
        );
    }

    #[test]
    fn test_scope_stored_roundtrip() {
        let id = Uuid::new_v4();
        for scope in [
            BudgetScope::All,
            BudgetScope::Account(id),
            BudgetScope::Category(id),
            BudgetScope::Tag(id),
        ] {
            let back = BudgetScope::from_stored(scope.type_str(), scope.ref_id()).unwrap();
            assert_eq!(scope, back);
        }
    }

    #[test]
    fn test_rule_armed_state() {
        let mut rule = RuleState {
            id: Uuid::new_v4(),
            threshold_type: ThresholdType::Amount,
            threshold_value: rust_decimal_macros::dec!(500),
            is_enabled: true,
            last_triggered_at: None,
        };
        assert!(rule.is_armed());

        rule.last_triggered_at = Some(Utc::now());
        assert!(!rule.is_armed());
    }
}
