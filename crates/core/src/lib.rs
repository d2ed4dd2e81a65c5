//! Core business logic for Centi.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and decision functions live here; the
//! db crate supplies locking and atomicity around them.
//!
//! # Modules
//!
//! - `ledger` - Transaction posting validation and running-balance math
//! - `budget` - Budget matching, spend scoping, and alert threshold decisions
//! - `notification` - Notification dedup policy

pub mod budget;
pub mod ledger;
pub mod notification;
