//! Ledger validation errors.

use thiserror::Error;
use uuid::Uuid;

/// Error types for posting validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Amount is zero or negative.
    #[error("Transaction amount must be positive")]
    NonPositiveAmount,

    /// Amount has more decimal places than money storage allows.
    #[error("Transaction amount has more than 2 decimal places")]
    InvalidAmountScale,

    /// Account has been soft-deleted; ledger operations exclude it.
    #[error("Account is deleted: {0}")]
    AccountDeleted(Uuid),

    /// Account exists but belongs to a different user.
    #[error("Account {0} is not owned by the acting user")]
    NotAccountOwner(Uuid),
}
