//! `SeaORM` Entity for the budget_alert_events table.
//!
//! Append-only audit log; one row per successful rule trigger. Never
//! updated or deleted by the engine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_alert_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub budget_id: Uuid,
    pub rule_id: Uuid,
    /// Aggregated spend at trigger time.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub spent: Decimal,
    /// Budget limit at trigger time.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub budget_limit: Decimal,
    pub triggered_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id"
    )]
    Budgets,
    #[sea_orm(
        belongs_to = "super::budget_alert_rules::Entity",
        from = "Column::RuleId",
        to = "super::budget_alert_rules::Column::Id"
    )]
    BudgetAlertRules,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::budget_alert_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetAlertRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
