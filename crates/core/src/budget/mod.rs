//! Budget matching, spend scoping, and alert threshold decisions.

pub mod alerts;
pub mod error;
pub mod types;

pub use alerts::{alert_message, rule_should_trigger};
pub use error::BudgetError;
pub use types::{BudgetPeriod, BudgetScope, RuleState, ThresholdType};
