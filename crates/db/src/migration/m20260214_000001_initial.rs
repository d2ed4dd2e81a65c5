//! Initial database migration.
//!
//! Creates the ledger and budget-alert tables with their indexes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: LEDGER TABLES
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TAGS_SQL).await?;
        db.execute_unprepared(TRANSACTION_TAGS_SQL).await?;

        // ============================================================
        // PART 2: BUDGETS & ALERT RULES
        // ============================================================
        db.execute_unprepared(BUDGETS_SQL).await?;
        db.execute_unprepared(BUDGET_ALERT_RULES_SQL).await?;
        db.execute_unprepared(BUDGET_ALERT_EVENTS_SQL).await?;

        // ============================================================
        // PART 3: NOTIFICATIONS
        // ============================================================
        db.execute_unprepared(NOTIFICATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS notifications, budget_alert_events, budget_alert_rules, \
             budgets, transaction_tags, tags, transactions, accounts CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    name VARCHAR(50) NOT NULL,
    source_type VARCHAR(10) NOT NULL,
    balance NUMERIC(14, 2) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_accounts_user ON accounts (user_id) WHERE deleted_at IS NULL;
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES accounts (id) ON DELETE CASCADE,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount >= 0),
    direction VARCHAR(10) NOT NULL CHECK (direction IN ('income', 'expense', 'transfer')),
    balance_after NUMERIC(14, 2) NOT NULL,
    method VARCHAR(20) NOT NULL,
    description VARCHAR(255) NOT NULL DEFAULT '',
    occurred_at TIMESTAMPTZ NOT NULL,
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transactions_account ON transactions (account_id) WHERE deleted_at IS NULL;
CREATE INDEX idx_transactions_occurred ON transactions (occurred_at);
CREATE INDEX idx_transactions_direction ON transactions (direction) WHERE deleted_at IS NULL;
";

const TAGS_SQL: &str = r"
CREATE TABLE tags (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    name VARCHAR(50) NOT NULL,
    color VARCHAR(20) NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_tags_user ON tags (user_id);
";

const TRANSACTION_TAGS_SQL: &str = r"
CREATE TABLE transaction_tags (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions (id) ON DELETE CASCADE,
    tag_id UUID NOT NULL REFERENCES tags (id) ON DELETE CASCADE,
    UNIQUE (transaction_id, tag_id)
);

CREATE INDEX idx_transaction_tags_tag ON transaction_tags (tag_id);
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    amount_limit NUMERIC(14, 2) NOT NULL,
    scope_type VARCHAR(20) NOT NULL,
    scope_ref_id UUID,
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (period_start <= period_end)
);

CREATE INDEX idx_budgets_user_period ON budgets (user_id, period_start, period_end)
    WHERE deleted_at IS NULL;
";

const BUDGET_ALERT_RULES_SQL: &str = r"
CREATE TABLE budget_alert_rules (
    id UUID PRIMARY KEY,
    budget_id UUID NOT NULL REFERENCES budgets (id) ON DELETE CASCADE,
    threshold_type VARCHAR(10) NOT NULL CHECK (threshold_type IN ('PERCENT', 'AMOUNT')),
    threshold_value NUMERIC(14, 2) NOT NULL,
    is_enabled BOOLEAN NOT NULL DEFAULT TRUE,
    last_triggered_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_alert_rules_budget ON budget_alert_rules (budget_id) WHERE is_enabled;
";

const BUDGET_ALERT_EVENTS_SQL: &str = r"
CREATE TABLE budget_alert_events (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    budget_id UUID NOT NULL REFERENCES budgets (id) ON DELETE CASCADE,
    rule_id UUID NOT NULL REFERENCES budget_alert_rules (id) ON DELETE CASCADE,
    spent NUMERIC(14, 2) NOT NULL,
    budget_limit NUMERIC(14, 2) NOT NULL,
    triggered_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_alert_events_lookup ON budget_alert_events (user_id, budget_id, rule_id, triggered_at);
";

const NOTIFICATIONS_SQL: &str = r"
CREATE TABLE notifications (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    message TEXT NOT NULL,
    is_read BOOLEAN NOT NULL DEFAULT FALSE,
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_notifications_dedup ON notifications (user_id, created_at);
";
