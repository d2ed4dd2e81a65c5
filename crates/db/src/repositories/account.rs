//! Account repository for ledger account database operations.

use centi_core::ledger::AccountSnapshot;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{accounts, sea_orm_active_enums::SourceType};

use super::is_lock_contention;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found (or soft-deleted, which reads the same to callers).
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Lock wait on the account row exceeded the storage threshold.
    #[error("Lock wait on account {0} timed out, please retry")]
    LockTimeout(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Funding source.
    pub source_type: SourceType,
    /// Opening balance.
    pub initial_balance: Decimal,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, AccountError> {
        let now = Utc::now().into();

        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            name: Set(input.name),
            source_type: Set(input.source_type),
            balance: Set(input.initial_balance),
            is_active: Set(true),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = account.insert(&self.db).await?;
        Ok(result)
    }

    /// Lists the user's live accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn find_for_user(&self, user_id: Uuid) -> Result<Vec<accounts::Model>, AccountError> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .filter(accounts::Column::DeletedAt.is_null())
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await?;

        Ok(accounts)
    }

    /// Fetches one live account owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account is missing, soft-deleted, or owned
    /// by someone else.
    pub async fn get(&self, user_id: Uuid, account_id: Uuid) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::UserId.eq(user_id))
            .filter(accounts::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;

        Ok(account)
    }

    /// Soft-deletes an account. Its transaction history stays queryable, but
    /// no further postings are accepted against it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account is missing, already deleted, or
    /// owned by someone else.
    pub async fn soft_delete(&self, user_id: Uuid, account_id: Uuid) -> Result<(), AccountError> {
        let account = self.get(user_id, account_id).await?;

        let mut active: accounts::ActiveModel = account.into();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.is_active = Set(false);
        active.update(&self.db).await?;

        Ok(())
    }

    /// Fetches the account row under an exclusive lock (`SELECT ... FOR
    /// UPDATE`) inside the given atomic unit.
    ///
    /// The row is locked regardless of its soft-delete state: filtering
    /// deleted rows out here would skip the lock entirely and let a
    /// concurrent poster race against the deletion. The caller inspects the
    /// snapshot's `deleted` flag after the lock is held.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such row exists, `LockTimeout` if the lock
    /// wait exceeds the storage threshold.
    pub async fn lock_and_fetch(
        txn: &DatabaseTransaction,
        account_id: Uuid,
    ) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(account_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(|err| {
                if is_lock_contention(&err) {
                    AccountError::LockTimeout(account_id)
                } else {
                    AccountError::Database(err)
                }
            })?
            .ok_or(AccountError::NotFound(account_id))?;

        Ok(account)
    }

    /// Maps a locked account row to the snapshot the posting resolver
    /// operates on.
    #[must_use]
    pub fn snapshot(account: &accounts::Model) -> AccountSnapshot {
        AccountSnapshot {
            id: account.id,
            user_id: account.user_id,
            balance: account.balance,
            deleted: account.deleted_at.is_some(),
        }
    }
}
