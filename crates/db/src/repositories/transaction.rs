//! Transaction repository: the transaction poster.
//!
//! Posting is the only write path for account balances. Each posting runs as
//! one atomic unit: lock the account row, resolve the posting against the
//! locked snapshot, insert the transaction with its balance snapshot, attach
//! tags, update the balance, commit. Budget alert evaluation runs after the
//! commit and can never fail the posting.

use std::collections::BTreeSet;

use centi_core::ledger::{Direction, LedgerError, MetadataPatch, PostingInput, PostingService};
use centi_shared::error::AppError;
use chrono::{Days, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{accounts, tags, transaction_tags, transactions};

use super::account::{AccountError, AccountRepository};
use super::budget::BudgetRepository;

/// Error types for posting operations.
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Account not found (missing or soft-deleted).
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account exists but belongs to another user.
    #[error("Account {0} does not belong to the acting user")]
    PermissionDenied(Uuid),

    /// Posting input failed validation.
    #[error(transparent)]
    InvalidInput(LedgerError),

    /// A tag does not exist or belongs to another user.
    #[error("Unknown tag: {0}")]
    UnknownTag(Uuid),

    /// Lock wait on the account row exceeded the storage threshold.
    #[error("Lock wait on account {0} timed out, please retry")]
    LockTimeout(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for PostingError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(id) => Self::AccountNotFound(id),
            AccountError::LockTimeout(id) => Self::LockTimeout(id),
            AccountError::Database(e) => Self::Database(e),
        }
    }
}

impl From<PostingError> for AppError {
    fn from(err: PostingError) -> Self {
        match err {
            PostingError::NotFound(_) | PostingError::AccountNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            PostingError::PermissionDenied(_) => Self::PermissionDenied(err.to_string()),
            PostingError::InvalidInput(_) | PostingError::UnknownTag(_) => {
                Self::Validation(err.to_string())
            }
            PostingError::LockTimeout(_) => Self::LockTimeout(err.to_string()),
            PostingError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by account.
    pub account_id: Option<Uuid>,
    /// Filter by direction.
    pub direction: Option<Direction>,
    /// Minimum amount, inclusive.
    pub min_amount: Option<Decimal>,
    /// Maximum amount, inclusive.
    pub max_amount: Option<Decimal>,
    /// Earliest business date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest business date, inclusive.
    pub date_to: Option<NaiveDate>,
}

/// A transaction with its attached tag ids.
#[derive(Debug, Clone)]
pub struct TransactionWithTags {
    /// Transaction row.
    pub transaction: transactions::Model,
    /// Attached tag ids.
    pub tag_ids: Vec<Uuid>,
}

/// Transaction repository: posting, metadata updates, and listing.
#[derive(Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
    alerts: BudgetRepository,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    ///
    /// The budget repository is consulted after every committed expense
    /// posting to evaluate alert rules.
    #[must_use]
    pub const fn new(db: DatabaseConnection, alerts: BudgetRepository) -> Self {
        Self { db, alerts }
    }

    /// Posts a transaction against an account.
    ///
    /// Runs one atomic unit: the account row is locked exclusively, the
    /// posting is resolved against the locked balance, the transaction row
    /// is inserted carrying `balance_after`, tags are validated and
    /// attached, and the account balance is updated. Only after the commit
    /// does budget alert evaluation run; its failures are logged and
    /// swallowed, never surfaced to the poster.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing/deleted, owned by another
    /// user, the amount is invalid, a tag is unknown, or the lock wait times
    /// out. A lock timeout is safe to retry.
    pub async fn post(&self, input: PostingInput) -> Result<transactions::Model, PostingError> {
        let txn = self.db.begin().await?;

        let account = AccountRepository::lock_and_fetch(&txn, input.account_id).await?;
        let snapshot = AccountRepository::snapshot(&account);

        let resolved = PostingService::resolve(&snapshot, &input).map_err(|err| match err {
            // A soft-deleted account reads the same as a missing one.
            LedgerError::AccountDeleted(id) => PostingError::AccountNotFound(id),
            LedgerError::NotAccountOwner(id) => PostingError::PermissionDenied(id),
            other => PostingError::InvalidInput(other),
        })?;

        let now = Utc::now();
        let transaction = transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(account.id),
            amount: Set(input.amount),
            direction: Set(input.direction.into()),
            balance_after: Set(resolved.balance_after),
            method: Set(input.method.clone()),
            description: Set(input.description.clone()),
            occurred_at: Set(input.occurred_at.into()),
            deleted_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let created = transaction.insert(&txn).await?;

        if !input.tag_ids.is_empty() {
            Self::attach_tags(&txn, input.acting_user, created.id, &input.tag_ids).await?;
        }

        let mut active: accounts::ActiveModel = account.into();
        active.balance = Set(resolved.balance_after);
        active.updated_at = Set(now.into());
        active.update(&txn).await?;

        txn.commit().await?;

        // Post-commit side effect. The ledger write is already durable;
        // alert evaluation failures must not be visible to the poster.
        if let Err(err) = self.alerts.evaluate_for_transaction(&created).await {
            tracing::error!(
                transaction_id = %created.id,
                error = %err,
                "budget alert evaluation failed after posting"
            );
        }

        Ok(created)
    }

    /// Fetches one transaction with its tags, checking ownership through the
    /// account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing or soft-deleted transaction,
    /// `PermissionDenied` if the account belongs to another user.
    pub async fn get(
        &self,
        acting_user: Uuid,
        transaction_id: Uuid,
    ) -> Result<TransactionWithTags, PostingError> {
        let transaction = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(PostingError::NotFound(transaction_id))?;

        Self::check_ownership(&self.db, &transaction, acting_user).await?;

        let tag_ids = transaction_tags::Entity::find()
            .filter(transaction_tags::Column::TransactionId.eq(transaction_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.tag_id)
            .collect();

        Ok(TransactionWithTags {
            transaction,
            tag_ids,
        })
    }

    /// Updates the non-financial fields of a transaction.
    ///
    /// `amount`, `direction`, `balance_after`, and `occurred_at` are
    /// immutable once posted; the patch type cannot carry them, so no
    /// balance math runs here and no account lock is taken.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing or soft-deleted transaction,
    /// `PermissionDenied` for a foreign one, `UnknownTag` if the replacement
    /// tag set references a tag the user does not own.
    pub async fn update_metadata(
        &self,
        acting_user: Uuid,
        transaction_id: Uuid,
        patch: MetadataPatch,
    ) -> Result<transactions::Model, PostingError> {
        let txn = self.db.begin().await?;

        let transaction = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or(PostingError::NotFound(transaction_id))?;

        Self::check_ownership(&txn, &transaction, acting_user).await?;

        if patch.is_empty() {
            txn.commit().await?;
            return Ok(transaction);
        }

        let mut active: transactions::ActiveModel = transaction.into();
        if let Some(method) = patch.method {
            active.method = Set(method);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        if let Some(tag_ids) = patch.tags {
            transaction_tags::Entity::delete_many()
                .filter(transaction_tags::Column::TransactionId.eq(transaction_id))
                .exec(&txn)
                .await?;
            if !tag_ids.is_empty() {
                Self::attach_tags(&txn, acting_user, transaction_id, &tag_ids).await?;
            }
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Soft-deletes a transaction.
    ///
    /// The account balance is intentionally left untouched: `balance_after`
    /// snapshots on later transactions are immutable history and would be
    /// falsified by a recomputation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `PermissionDenied` as for `update_metadata`.
    pub async fn soft_delete(
        &self,
        acting_user: Uuid,
        transaction_id: Uuid,
    ) -> Result<(), PostingError> {
        let transaction = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(PostingError::NotFound(transaction_id))?;

        Self::check_ownership(&self.db, &transaction, acting_user).await?;

        let now = Utc::now();
        let mut active: transactions::ActiveModel = transaction.into();
        active.deleted_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        active.update(&self.db).await?;

        Ok(())
    }

    /// Lists the user's live transactions, newest business time first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(
        &self,
        acting_user: Uuid,
        filter: TransactionFilter,
    ) -> Result<Vec<transactions::Model>, PostingError> {
        let mut query = transactions::Entity::find()
            .join(JoinType::InnerJoin, transactions::Relation::Accounts.def())
            .filter(accounts::Column::UserId.eq(acting_user))
            .filter(transactions::Column::DeletedAt.is_null());

        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id));
        }
        if let Some(direction) = filter.direction {
            let stored: crate::entities::sea_orm_active_enums::Direction = direction.into();
            query = query.filter(transactions::Column::Direction.eq(stored));
        }
        if let Some(min) = filter.min_amount {
            query = query.filter(transactions::Column::Amount.gte(min));
        }
        if let Some(max) = filter.max_amount {
            query = query.filter(transactions::Column::Amount.lte(max));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(transactions::Column::OccurredAt.gte(day_start_utc(from)));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(transactions::Column::OccurredAt.lt(day_after_utc(to)));
        }

        let rows = query
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Verifies that the transaction's account belongs to the acting user.
    async fn check_ownership<C: sea_orm::ConnectionTrait>(
        conn: &C,
        transaction: &transactions::Model,
        acting_user: Uuid,
    ) -> Result<(), PostingError> {
        let account = accounts::Entity::find_by_id(transaction.account_id)
            .one(conn)
            .await?
            .ok_or(PostingError::AccountNotFound(transaction.account_id))?;

        if account.user_id != acting_user {
            return Err(PostingError::PermissionDenied(account.id));
        }
        Ok(())
    }

    /// Validates that every tag exists and belongs to the user, then links
    /// them to the transaction. Duplicate ids in the input collapse to one
    /// link.
    async fn attach_tags(
        txn: &DatabaseTransaction,
        acting_user: Uuid,
        transaction_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<(), PostingError> {
        let unique: BTreeSet<Uuid> = tag_ids.iter().copied().collect();

        let owned: BTreeSet<Uuid> = tags::Entity::find()
            .filter(tags::Column::Id.is_in(unique.iter().copied()))
            .filter(tags::Column::UserId.eq(acting_user))
            .all(txn)
            .await?
            .into_iter()
            .map(|tag| tag.id)
            .collect();

        if let Some(missing) = unique.difference(&owned).next() {
            return Err(PostingError::UnknownTag(*missing));
        }

        for tag_id in unique {
            let link = transaction_tags::ActiveModel {
                id: Set(Uuid::now_v7()),
                transaction_id: Set(transaction_id),
                tag_id: Set(tag_id),
            };
            link.insert(txn).await?;
        }

        Ok(())
    }
}

/// UTC instant at the start of the given calendar day.
pub(crate) fn day_start_utc(date: NaiveDate) -> chrono::DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// UTC instant at the start of the day after the given calendar day.
/// Used as an exclusive upper bound for inclusive date filters.
pub(crate) fn day_after_utc(date: NaiveDate) -> chrono::DateTime<Utc> {
    let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
    next.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posting_error_maps_to_app_error() {
        let id = Uuid::new_v4();
        assert!(matches!(
            AppError::from(PostingError::AccountNotFound(id)),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(PostingError::PermissionDenied(id)),
            AppError::PermissionDenied(_)
        ));
        assert!(matches!(
            AppError::from(PostingError::UnknownTag(id)),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(PostingError::InvalidInput(LedgerError::NonPositiveAmount)),
            AppError::Validation(_)
        ));
        let lock = AppError::from(PostingError::LockTimeout(id));
        assert!(matches!(lock, AppError::LockTimeout(_)));
        assert!(lock.is_retryable());
    }

    #[test]
    fn test_date_bounds_cover_whole_days() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let start = day_start_utc(date);
        let end = day_after_utc(date);
        assert_eq!(end - start, chrono::Duration::days(1));
        assert_eq!(start.date_naive(), date);
    }

    #[test]
    fn test_filter_default_is_unconstrained() {
        let filter = TransactionFilter::default();
        assert!(filter.account_id.is_none());
        assert!(filter.direction.is_none());
        assert!(filter.min_amount.is_none());
        assert!(filter.max_amount.is_none());
        assert!(filter.date_from.is_none());
        assert!(filter.date_to.is_none());
    }
}
