//! Database seeder for Centi development and testing.
//!
//! Seeds a demo user with accounts, tags, a budget with alert rules, and a
//! handful of transactions posted through the real posting path, so seeded
//! data carries correct balance snapshots and alert state.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use centi_core::budget::{BudgetScope, ThresholdType};
use centi_core::ledger::{Direction, PostingInput};
use centi_db::entities::sea_orm_active_enums::SourceType;
use centi_db::repositories::{
    AccountRepository, BudgetRepository, CreateAccountInput, CreateBudgetInput, CreateRuleInput,
    CreateTagInput, DbNotificationSink, TagRepository, TransactionRepository,
};
use centi_shared::config::AppConfig;
use chrono::{Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Demo user ID (consistent for all seeds).
const DEMO_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let (database_url, dedup_minutes) = match AppConfig::load() {
        Ok(config) => (
            config.database.url,
            i64::try_from(config.alerts.dedup_minutes)
                .unwrap_or(centi_core::notification::DEFAULT_DEDUP_MINUTES),
        ),
        Err(_) => (
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment"),
            centi_core::notification::DEFAULT_DEDUP_MINUTES,
        ),
    };

    tracing::info!("Connecting to database...");
    let db = centi_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let user = demo_user_id();
    let accounts = AccountRepository::new(db.clone());

    if !accounts
        .find_for_user(user)
        .await
        .expect("Failed to query accounts")
        .is_empty()
    {
        tracing::info!("Demo data already present, skipping");
        return;
    }

    let sink = Arc::new(DbNotificationSink::with_window(db.clone(), dedup_minutes));
    let budgets = BudgetRepository::new(db.clone(), sink);
    let transactions = TransactionRepository::new(db.clone(), budgets.clone());

    tracing::info!("Seeding accounts...");
    let checking = accounts
        .create(CreateAccountInput {
            user_id: user,
            name: "Checking".to_string(),
            source_type: SourceType::Bank,
            initial_balance: dec!(2500.00),
        })
        .await
        .expect("Failed to create checking account");
    let card = accounts
        .create(CreateAccountInput {
            user_id: user,
            name: "Credit Card".to_string(),
            source_type: SourceType::Card,
            initial_balance: Decimal::ZERO,
        })
        .await
        .expect("Failed to create card account");

    tracing::info!("Seeding tags...");
    let tags = TagRepository::new(db.clone());
    let groceries = seed_tag(&tags, user, "groceries", "#4caf50").await;
    let dining = seed_tag(&tags, user, "dining", "#ff9800").await;

    tracing::info!("Seeding budget and alert rules...");
    let (start, end) = current_month();
    let budget = budgets
        .create_budget(CreateBudgetInput {
            user_id: user,
            name: "Monthly spending".to_string(),
            period_start: start,
            period_end: end,
            amount_limit: dec!(1200.00),
            scope: BudgetScope::All,
        })
        .await
        .expect("Failed to create budget");
    budgets
        .add_rule(
            user,
            CreateRuleInput {
                budget_id: budget.id,
                threshold_type: ThresholdType::Percent,
                threshold_value: dec!(80),
                is_enabled: true,
            },
        )
        .await
        .expect("Failed to add percent rule");
    budgets
        .add_rule(
            user,
            CreateRuleInput {
                budget_id: budget.id,
                threshold_type: ThresholdType::Amount,
                threshold_value: dec!(1000.00),
                is_enabled: true,
            },
        )
        .await
        .expect("Failed to add amount rule");

    tracing::info!("Posting sample transactions...");
    let samples = [
        (checking.id, dec!(3200.00), Direction::Income, "salary", vec![]),
        (
            checking.id,
            dec!(86.40),
            Direction::Expense,
            "weekly groceries",
            vec![groceries],
        ),
        (
            card.id,
            dec!(42.50),
            Direction::Expense,
            "dinner out",
            vec![dining],
        ),
        (
            checking.id,
            dec!(120.00),
            Direction::Transfer,
            "savings transfer",
            vec![],
        ),
    ];
    for (account_id, amount, direction, description, tag_ids) in samples {
        transactions
            .post(PostingInput {
                acting_user: user,
                account_id,
                amount,
                direction,
                method: "card".to_string(),
                description: description.to_string(),
                occurred_at: Utc::now(),
                tag_ids,
            })
            .await
            .expect("Failed to post sample transaction");
    }

    tracing::info!("Seeding complete");
}

fn demo_user_id() -> Uuid {
    Uuid::parse_str(DEMO_USER_ID).expect("valid demo user id")
}

/// First and last day of the current month.
fn current_month() -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    let start = today.with_day(1).expect("valid first of month");
    let end = start
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .expect("valid last of month");
    (start, end)
}

async fn seed_tag(tags: &TagRepository, user: Uuid, name: &str, color: &str) -> Uuid {
    if let Some(existing) = tags
        .find_for_user(user)
        .await
        .expect("Failed to query tags")
        .into_iter()
        .find(|tag| tag.name == name)
    {
        return existing.id;
    }

    tags.create(CreateTagInput {
        user_id: user,
        name: name.to_string(),
        color: color.to_string(),
    })
    .await
    .expect("Failed to insert tag")
    .id
}
