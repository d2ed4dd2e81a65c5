//! String-backed active enums shared by the entities.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a transaction relative to the account balance.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money entering the account.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money spent from the account.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Money moved out to another account.
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

impl From<centi_core::ledger::Direction> for Direction {
    fn from(value: centi_core::ledger::Direction) -> Self {
        match value {
            centi_core::ledger::Direction::Income => Self::Income,
            centi_core::ledger::Direction::Expense => Self::Expense,
            centi_core::ledger::Direction::Transfer => Self::Transfer,
        }
    }
}

impl From<Direction> for centi_core::ledger::Direction {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Income => Self::Income,
            Direction::Expense => Self::Expense,
            Direction::Transfer => Self::Transfer,
        }
    }
}

/// Account funding source.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Bank account.
    #[sea_orm(string_value = "bank")]
    Bank,
    /// Credit/debit card.
    #[sea_orm(string_value = "card")]
    Card,
    /// Physical cash.
    #[sea_orm(string_value = "cash")]
    Cash,
}

/// Kind of threshold an alert rule checks.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "UPPERCASE")]
pub enum ThresholdType {
    /// Percentage points of the budget limit.
    #[sea_orm(string_value = "PERCENT")]
    Percent,
    /// Absolute currency amount.
    #[sea_orm(string_value = "AMOUNT")]
    Amount,
}

impl From<centi_core::budget::ThresholdType> for ThresholdType {
    fn from(value: centi_core::budget::ThresholdType) -> Self {
        match value {
            centi_core::budget::ThresholdType::Percent => Self::Percent,
            centi_core::budget::ThresholdType::Amount => Self::Amount,
        }
    }
}

impl From<ThresholdType> for centi_core::budget::ThresholdType {
    fn from(value: ThresholdType) -> Self {
        match value {
            ThresholdType::Percent => Self::Percent,
            ThresholdType::Amount => Self::Amount,
        }
    }
}
