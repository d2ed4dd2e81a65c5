//! Budget validation errors.

use chrono::NaiveDate;
use thiserror::Error;

/// Error types for budget definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// `period_start` is after `period_end`.
    #[error("Budget period start {start} is after end {end}")]
    InvalidPeriod {
        /// First day of the period.
        start: NaiveDate,
        /// Last day of the period.
        end: NaiveDate,
    },

    /// Amount limit is negative.
    #[error("Budget amount limit cannot be negative")]
    NegativeLimit,

    /// A scoped budget (ACCOUNT/CATEGORY/TAG) is missing its reference id.
    #[error("Budget scope {0} requires a scope reference id")]
    MissingScopeRef(&'static str),

    /// Stored scope type string is not one of ALL/ACCOUNT/CATEGORY/TAG.
    #[error("Unknown budget scope type: {0}")]
    UnknownScopeType(String),

    /// Threshold value is zero or negative.
    #[error("Alert rule threshold must be positive")]
    NonPositiveThreshold,
}
