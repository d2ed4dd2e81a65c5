//! Repository abstractions for data access.
//!
//! Repositories own every atomic-unit boundary in the engine: the account
//! row lock taken by the transaction poster and the rule-set lock taken by
//! the alert evaluator both live here, scoped to a single
//! `DatabaseTransaction`.

pub mod account;
pub mod budget;
pub mod notification;
pub mod tag;
pub mod transaction;

pub use account::{AccountError, AccountRepository, CreateAccountInput};
pub use budget::{AlertError, BudgetRepository, CreateBudgetInput, CreateRuleInput};
pub use notification::{DbNotificationSink, NotificationSink, NotifyError};
pub use tag::{CreateTagInput, TagError, TagRepository};
pub use transaction::{PostingError, TransactionFilter, TransactionRepository, TransactionWithTags};

use sea_orm::DbErr;

/// Heuristic for Postgres lock contention: lock-not-available (55P03) and
/// deadlock-detected (40P01) surface through the driver as opaque query
/// errors, so the SQLSTATE is recovered from the message.
pub(crate) fn is_lock_contention(err: &DbErr) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("55p03")
        || msg.contains("40p01")
        || msg.contains("deadlock")
        || msg.contains("lock timeout")
        || msg.contains("lock_not_available")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_contention_detection() {
        assert!(is_lock_contention(&DbErr::Custom(
            "error returned from database: canceling statement due to lock timeout (SQLSTATE 55P03)"
                .to_string()
        )));
        assert!(is_lock_contention(&DbErr::Custom(
            "deadlock detected".to_string()
        )));
        assert!(!is_lock_contention(&DbErr::Custom(
            "duplicate key value violates unique constraint".to_string()
        )));
    }
}
