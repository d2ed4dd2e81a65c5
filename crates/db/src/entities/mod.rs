//! `SeaORM` entity definitions.

pub mod accounts;
pub mod budget_alert_events;
pub mod budget_alert_rules;
pub mod budgets;
pub mod notifications;
pub mod sea_orm_active_enums;
pub mod tags;
pub mod transaction_tags;
pub mod transactions;
