//! Budget repository: budget matching, spend aggregation, and the alert
//! rule evaluator.
//!
//! The evaluator is where the at-most-once guarantee lives: rules for a
//! budget are locked as a set (ordered by id, so two evaluators always
//! collide instead of deadlocking), armed rules that cross their threshold
//! get an event row and a `last_triggered_at` stamp in the same atomic unit,
//! and notification delivery happens only after that unit commits.

use std::sync::Arc;

use centi_core::budget::{
    alert_message, rule_should_trigger, BudgetError, BudgetPeriod, BudgetScope, RuleState,
};
use centi_shared::error::AppError;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use sea_orm::sea_query::Query;
use uuid::Uuid;

use crate::entities::{
    accounts, budget_alert_events, budget_alert_rules, budgets, sea_orm_active_enums::Direction,
    tags, transaction_tags, transactions,
};

use super::is_lock_contention;
use super::notification::NotificationSink;
use super::transaction::{day_after_utc, day_start_utc};

/// Error types for budget and alert operations.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// Budget not found (missing, soft-deleted, or foreign).
    #[error("Budget not found: {0}")]
    NotFound(Uuid),

    /// Budget or rule input failed validation.
    #[error(transparent)]
    Invalid(#[from] BudgetError),

    /// Lock wait on the budget's rule set exceeded the storage threshold.
    #[error("Lock wait on rules of budget {0} timed out, please retry")]
    LockTimeout(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AlertError> for AppError {
    fn from(err: AlertError) -> Self {
        match err {
            AlertError::NotFound(_) => Self::NotFound(err.to_string()),
            AlertError::Invalid(_) => Self::Validation(err.to_string()),
            AlertError::LockTimeout(_) => Self::LockTimeout(err.to_string()),
            AlertError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetInput {
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// First day of the period, inclusive.
    pub period_start: NaiveDate,
    /// Last day of the period, inclusive.
    pub period_end: NaiveDate,
    /// Spending limit for the period.
    pub amount_limit: Decimal,
    /// What spend the budget aggregates.
    pub scope: BudgetScope,
}

/// Input for attaching an alert rule to a budget.
#[derive(Debug, Clone)]
pub struct CreateRuleInput {
    /// Budget the rule belongs to.
    pub budget_id: Uuid,
    /// Kind of threshold.
    pub threshold_type: centi_core::budget::ThresholdType,
    /// Threshold value: percentage points if `Percent`, currency if `Amount`.
    pub threshold_value: Decimal,
    /// Whether the rule starts enabled.
    pub is_enabled: bool,
}

#[derive(Debug, FromQueryResult)]
struct SpentTotal {
    total: Option<Decimal>,
}

/// Budget repository: CRUD, spend aggregation, and rule evaluation.
#[derive(Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
    sink: Arc<dyn NotificationSink>,
}

impl BudgetRepository {
    /// Creates a new budget repository delivering alerts through the given
    /// sink.
    #[must_use]
    pub fn new(db: DatabaseConnection, sink: Arc<dyn NotificationSink>) -> Self {
        Self { db, sink }
    }

    /// Creates a budget.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for an inverted period or a negative limit.
    pub async fn create_budget(
        &self,
        input: CreateBudgetInput,
    ) -> Result<budgets::Model, AlertError> {
        let period = BudgetPeriod::new(input.period_start, input.period_end)?;
        if input.amount_limit < Decimal::ZERO {
            return Err(BudgetError::NegativeLimit.into());
        }

        let budget = budgets::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            name: Set(input.name),
            period_start: Set(period.start),
            period_end: Set(period.end),
            amount_limit: Set(input.amount_limit),
            scope_type: Set(input.scope.type_str().to_string()),
            scope_ref_id: Set(input.scope.ref_id()),
            deleted_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let result = budget.insert(&self.db).await?;
        Ok(result)
    }

    /// Attaches an alert rule to a budget owned by the acting user.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a non-positive threshold, `NotFound` if the
    /// budget is missing, deleted, or foreign.
    pub async fn add_rule(
        &self,
        acting_user: Uuid,
        input: CreateRuleInput,
    ) -> Result<budget_alert_rules::Model, AlertError> {
        if input.threshold_value <= Decimal::ZERO {
            return Err(BudgetError::NonPositiveThreshold.into());
        }

        // Foreign budgets read as missing; ownership is not leaked.
        let budget = budgets::Entity::find_by_id(input.budget_id)
            .filter(budgets::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(AlertError::NotFound(input.budget_id))?;
        if budget.user_id != acting_user {
            return Err(AlertError::NotFound(input.budget_id));
        }

        let rule = budget_alert_rules::ActiveModel {
            id: Set(Uuid::now_v7()),
            budget_id: Set(budget.id),
            threshold_type: Set(input.threshold_type.into()),
            threshold_value: Set(input.threshold_value),
            is_enabled: Set(input.is_enabled),
            last_triggered_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let result = rule.insert(&self.db).await?;
        Ok(result)
    }

    /// Lists the user's live budgets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn find_for_user(&self, user_id: Uuid) -> Result<Vec<budgets::Model>, AlertError> {
        let rows = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::DeletedAt.is_null())
            .order_by_asc(budgets::Column::PeriodStart)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Soft-deletes a budget. Its rules stop being evaluated immediately
    /// because matching only considers live budgets.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the budget is missing, already deleted, or
    /// foreign.
    pub async fn soft_delete(&self, acting_user: Uuid, budget_id: Uuid) -> Result<(), AlertError> {
        let budget = budgets::Entity::find_by_id(budget_id)
            .filter(budgets::Column::UserId.eq(acting_user))
            .filter(budgets::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(AlertError::NotFound(budget_id))?;

        let mut active: budgets::ActiveModel = budget.into();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await?;

        Ok(())
    }

    /// Finds the user's live budgets whose period contains the given date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn find_matching(
        &self,
        user_id: Uuid,
        on: NaiveDate,
    ) -> Result<Vec<budgets::Model>, AlertError> {
        let rows = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::DeletedAt.is_null())
            .filter(budgets::Column::PeriodStart.lte(on))
            .filter(budgets::Column::PeriodEnd.gte(on))
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Aggregates the budget's spend: the sum of live expense transaction
    /// amounts of the owning user whose business time falls inside the
    /// period, narrowed by the budget's scope.
    ///
    /// Scopes that cannot match anything (unknown stored type, `Category`,
    /// or a tag scope whose tag is gone) aggregate to zero rather than
    /// erroring; a misconfigured budget must not break posting.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn compute_spent(&self, budget: &budgets::Model) -> Result<Decimal, AlertError> {
        let scope = match BudgetScope::from_stored(&budget.scope_type, budget.scope_ref_id) {
            Ok(scope) => scope,
            Err(err) => {
                tracing::warn!(budget_id = %budget.id, error = %err, "unreadable budget scope, treating spend as zero");
                return Ok(Decimal::ZERO);
            }
        };

        let mut query = transactions::Entity::find()
            .join(JoinType::InnerJoin, transactions::Relation::Accounts.def())
            .filter(accounts::Column::UserId.eq(budget.user_id))
            .filter(transactions::Column::DeletedAt.is_null())
            .filter(transactions::Column::Direction.eq(Direction::Expense))
            .filter(transactions::Column::OccurredAt.gte(day_start_utc(budget.period_start)))
            .filter(transactions::Column::OccurredAt.lt(day_after_utc(budget.period_end)));

        match scope {
            BudgetScope::All => {}
            BudgetScope::Account(account_id) => {
                query = query.filter(transactions::Column::AccountId.eq(account_id));
            }
            BudgetScope::Category(_) => {
                // Transactions carry no category association.
                tracing::warn!(budget_id = %budget.id, "category-scoped budget has no matchable spend");
                return Ok(Decimal::ZERO);
            }
            BudgetScope::Tag(tag_id) => {
                let tag = tags::Entity::find_by_id(tag_id)
                    .filter(tags::Column::UserId.eq(budget.user_id))
                    .one(&self.db)
                    .await?;
                if tag.is_none() {
                    tracing::warn!(budget_id = %budget.id, %tag_id, "tag-scoped budget references a missing tag");
                    return Ok(Decimal::ZERO);
                }
                query = query.filter(
                    transactions::Column::Id.in_subquery(
                        Query::select()
                            .column(transaction_tags::Column::TransactionId)
                            .from(transaction_tags::Entity)
                            .and_where(transaction_tags::Column::TagId.eq(tag_id))
                            .to_owned(),
                    ),
                );
            }
        }

        let total = query
            .select_only()
            .column_as(transactions::Column::Amount.sum(), "total")
            .into_model::<SpentTotal>()
            .one(&self.db)
            .await?
            .and_then(|row| row.total)
            .unwrap_or(Decimal::ZERO);

        Ok(total)
    }

    /// Evaluates alert rules for a freshly committed transaction.
    ///
    /// Non-expense transactions are a no-op. For expenses, every live budget
    /// of the account's owner whose period contains the transaction's
    /// business date has its spend aggregated and its rules evaluated.
    ///
    /// # Errors
    ///
    /// Returns an error if aggregation or evaluation fails; callers treat
    /// this as a side-effect failure, never a posting failure.
    pub async fn evaluate_for_transaction(
        &self,
        transaction: &transactions::Model,
    ) -> Result<(), AlertError> {
        let direction: centi_core::ledger::Direction = transaction.direction.clone().into();
        if !direction.is_expense() {
            return Ok(());
        }

        let Some(account) = accounts::Entity::find_by_id(transaction.account_id)
            .one(&self.db)
            .await?
        else {
            tracing::warn!(transaction_id = %transaction.id, "account vanished before alert evaluation");
            return Ok(());
        };

        let on = transaction.occurred_at.with_timezone(&Utc).date_naive();
        let budgets = self.find_matching(account.user_id, on).await?;

        for budget in budgets {
            let spent = self.compute_spent(&budget).await?;
            self.evaluate_rules(&budget, spent).await?;
        }

        Ok(())
    }

    /// Evaluates the budget's rules against the aggregated spend.
    ///
    /// One atomic unit: the budget's enabled rules are locked as a set
    /// (ordered by id), armed rules that cross their threshold get an event
    /// row and their `last_triggered_at` stamp, then the unit commits.
    /// Notification delivery runs after the commit and is best-effort; a
    /// failed delivery never rolls back the trigger.
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if the rule-set lock cannot be acquired,
    /// `Database` for other storage failures.
    pub async fn evaluate_rules(
        &self,
        budget: &budgets::Model,
        spent: Decimal,
    ) -> Result<Vec<budget_alert_events::Model>, AlertError> {
        let txn = self.db.begin().await?;

        let rules = budget_alert_rules::Entity::find()
            .filter(budget_alert_rules::Column::BudgetId.eq(budget.id))
            .filter(budget_alert_rules::Column::IsEnabled.eq(true))
            .order_by_asc(budget_alert_rules::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(|err| {
                if is_lock_contention(&err) {
                    AlertError::LockTimeout(budget.id)
                } else {
                    AlertError::Database(err)
                }
            })?;

        let now = Utc::now();
        let mut fired = Vec::new();

        for rule in rules {
            let state = rule_state(&rule);
            if !state.is_armed() {
                continue;
            }
            if !rule_should_trigger(spent, budget.amount_limit, &state) {
                continue;
            }

            let event = budget_alert_events::ActiveModel {
                id: Set(Uuid::now_v7()),
                user_id: Set(budget.user_id),
                budget_id: Set(budget.id),
                rule_id: Set(rule.id),
                spent: Set(spent),
                budget_limit: Set(budget.amount_limit),
                triggered_at: Set(now.into()),
            };
            let event = event.insert(&txn).await?;

            let mut active: budget_alert_rules::ActiveModel = rule.into();
            active.last_triggered_at = Set(Some(now.into()));
            let rule = active.update(&txn).await?;

            fired.push((rule, event));
        }

        txn.commit().await?;

        // The trigger is durable; delivery is a courtesy.
        let mut events = Vec::with_capacity(fired.len());
        for (rule, event) in fired {
            let message = alert_message(&budget.name, spent, budget.amount_limit, &rule_state(&rule));
            if let Err(err) = self.sink.notify(budget.user_id, &message).await {
                tracing::warn!(
                    budget_id = %budget.id,
                    rule_id = %rule.id,
                    error = %err,
                    "alert notification delivery failed"
                );
            }
            events.push(event);
        }

        Ok(events)
    }
}

/// Maps a rule row to the snapshot the decision functions operate on.
fn rule_state(rule: &budget_alert_rules::Model) -> RuleState {
    RuleState {
        id: rule.id,
        threshold_type: rule.threshold_type.clone().into(),
        threshold_value: rule.threshold_value,
        is_enabled: rule.is_enabled,
        last_triggered_at: rule
            .last_triggered_at
            .map(|at| at.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::ThresholdType;
    use rust_decimal_macros::dec;

    fn rule_row(last_triggered_at: Option<chrono::DateTime<Utc>>) -> budget_alert_rules::Model {
        budget_alert_rules::Model {
            id: Uuid::now_v7(),
            budget_id: Uuid::now_v7(),
            threshold_type: ThresholdType::Percent,
            threshold_value: dec!(80),
            is_enabled: true,
            last_triggered_at: last_triggered_at.map(Into::into),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_rule_state_mapping() {
        let armed = rule_state(&rule_row(None));
        assert!(armed.is_armed());
        assert_eq!(
            armed.threshold_type,
            centi_core::budget::ThresholdType::Percent
        );
        assert_eq!(armed.threshold_value, dec!(80));

        let fired = rule_state(&rule_row(Some(Utc::now())));
        assert!(!fired.is_armed());
    }

    #[test]
    fn test_alert_error_maps_to_app_error() {
        let id = Uuid::new_v4();
        assert!(matches!(
            AppError::from(AlertError::NotFound(id)),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(AlertError::Invalid(BudgetError::NonPositiveThreshold)),
            AppError::Validation(_)
        ));
        let lock = AppError::from(AlertError::LockTimeout(id));
        assert!(matches!(lock, AppError::LockTimeout(_)));
        assert!(lock.is_retryable());
    }
}
