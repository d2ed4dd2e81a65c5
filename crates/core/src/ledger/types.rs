//! Ledger domain types for transaction posting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a transaction relative to the account balance.
///
/// Income increases the balance; expense and transfer decrease it.
/// The amount itself is always a non-negative magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money entering the account.
    Income,
    /// Money spent from the account.
    Expense,
    /// Money moved out to another account.
    Transfer,
}

impl Direction {
    /// Returns true for the only direction that participates in budget
    /// spend aggregation.
    #[must_use]
    pub fn is_expense(self) -> bool {
        matches!(self, Self::Expense)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}

/// Snapshot of the account row taken under its exclusive lock.
///
/// The poster resolves against this snapshot; the balance it carries is
/// authoritative for the duration of the enclosing atomic unit.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    /// The account ID.
    pub id: Uuid,
    /// The owning user.
    pub user_id: Uuid,
    /// Current balance.
    pub balance: Decimal,
    /// Whether the account has been soft-deleted.
    pub deleted: bool,
}

/// Input for posting a transaction.
#[derive(Debug, Clone)]
pub struct PostingInput {
    /// Authenticated user performing the posting.
    pub acting_user: Uuid,
    /// Target account.
    pub account_id: Uuid,
    /// Non-negative magnitude of the transaction.
    pub amount: Decimal,
    /// Direction of the transaction.
    pub direction: Direction,
    /// Payment method (free-form, e.g. "card").
    pub method: String,
    /// Free-form description.
    pub description: String,
    /// Business time of the transaction (distinct from creation time).
    pub occurred_at: DateTime<Utc>,
    /// Tags to associate; every tag must exist and belong to the acting user.
    pub tag_ids: Vec<Uuid>,
}

/// Result of resolving a posting against a locked account snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPosting {
    /// The amount with its direction applied (+income, -expense/transfer).
    pub signed_amount: Decimal,
    /// The account balance immediately after this transaction.
    pub balance_after: Decimal,
}

/// Patch for the non-financial fields of an existing transaction.
///
/// `amount`, `direction`, `balance_after`, and `occurred_at` are immutable
/// once posted; this type carries no such fields, so an update that would
/// break the running-balance invariant is unrepresentable.
#[derive(Debug, Clone, Default)]
pub struct MetadataPatch {
    /// New payment method.
    pub method: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement tag set (validated like at posting time).
    pub tags: Option<Vec<Uuid>>,
}

impl MetadataPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.method.is_none() && self.description.is_none() && self.tags.is_none()
    }
}
