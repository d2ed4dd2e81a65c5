//! `SeaORM` Entity for the budgets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// First day of the period, inclusive.
    pub period_start: Date,
    /// Last day of the period, inclusive.
    pub period_end: Date,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount_limit: Decimal,
    /// Stored scope discriminant; parsed into `BudgetScope`. Unknown values
    /// degrade to zero spend rather than erroring.
    pub scope_type: String,
    pub scope_ref_id: Option<Uuid>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_alert_rules::Entity")]
    BudgetAlertRules,
}

impl Related<super::budget_alert_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetAlertRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
