//! Posting resolution: validation and balance math.
//!
//! This module is the pure half of the transaction poster. The db crate
//! acquires the account row lock, hands the locked snapshot to
//! [`PostingService::resolve`], and persists the result in the same atomic
//! unit.

use rust_decimal::Decimal;

use centi_shared::types::money::is_valid_magnitude;

use super::error::LedgerError;
use super::types::{AccountSnapshot, Direction, PostingInput, ResolvedPosting};

/// Applies a direction to a non-negative magnitude.
///
/// Income adds to the balance; expense and transfer subtract from it.
#[must_use]
pub fn signed_amount(direction: Direction, magnitude: Decimal) -> Decimal {
    match direction {
        Direction::Income => magnitude,
        Direction::Expense | Direction::Transfer => -magnitude,
    }
}

/// Pure posting validation and resolution.
pub struct PostingService;

impl PostingService {
    /// Validates a posting against the locked account snapshot and computes
    /// the resulting balance.
    ///
    /// Checks, in order:
    /// 1. The account is not soft-deleted
    /// 2. The account belongs to the acting user (evaluated after the lock,
    ///    never before)
    /// 3. The amount is strictly positive with at most 2 decimal places
    ///
    /// Balances may go negative: this is a passive ledger, not an overdraft
    /// enforcement system.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if any validation fails.
    pub fn resolve(
        account: &AccountSnapshot,
        input: &PostingInput,
    ) -> Result<ResolvedPosting, LedgerError> {
        if account.deleted {
            return Err(LedgerError::AccountDeleted(account.id));
        }
        if account.user_id != input.acting_user {
            return Err(LedgerError::NotAccountOwner(account.id));
        }

        Self::validate_amount(input.amount)?;

        let signed = signed_amount(input.direction, input.amount);
        Ok(ResolvedPosting {
            signed_amount: signed,
            balance_after: account.balance + signed,
        })
    }

    /// Validates a transaction magnitude.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` for zero/negative amounts and
    /// `InvalidAmountScale` for amounts finer than 2 decimal places.
    pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        if !is_valid_magnitude(amount) {
            return Err(LedgerError::InvalidAmountScale);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn snapshot(balance: Decimal) -> AccountSnapshot {
        AccountSnapshot {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            balance,
            deleted: false,
        }
    }

    fn input_for(account: &AccountSnapshot, amount: Decimal, direction: Direction) -> PostingInput {
        PostingInput {
            acting_user: account.user_id,
            account_id: account.id,
            amount,
            direction,
            method: "card".to_string(),
            description: "lunch".to_string(),
            occurred_at: Utc::now(),
            tag_ids: vec![],
        }
    }

    #[test]
    fn test_expense_decreases_balance() {
        // balance 1000.00, expense 150.00 -> 850.00
        let account = snapshot(dec!(1000.00));
        let input = input_for(&account, dec!(150.00), Direction::Expense);

        let resolved = PostingService::resolve(&account, &input).unwrap();
        assert_eq!(resolved.signed_amount, dec!(-150.00));
        assert_eq!(resolved.balance_after, dec!(850.00));
    }

    #[test]
    fn test_income_increases_balance() {
        let account = snapshot(dec!(10.50));
        let input = input_for(&account, dec!(4.50), Direction::Income);

        let resolved = PostingService::resolve(&account, &input).unwrap();
        assert_eq!(resolved.balance_after, dec!(15.00));
    }

    #[test]
    fn test_transfer_decreases_balance() {
        let account = snapshot(dec!(100));
        let input = input_for(&account, dec!(30), Direction::Transfer);

        let resolved = PostingService::resolve(&account, &input).unwrap();
        assert_eq!(resolved.balance_after, dec!(70));
    }

    #[test]
    fn test_overdraft_is_allowed() {
        let account = snapshot(dec!(50));
        let input = input_for(&account, dec!(80), Direction::Expense);

        let resolved = PostingService::resolve(&account, &input).unwrap();
        assert_eq!(resolved.balance_after, dec!(-30));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let account = snapshot(dec!(100));
        let input = input_for(&account, dec!(0), Direction::Expense);

        assert_eq!(
            PostingService::resolve(&account, &input),
            Err(LedgerError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        let account = snapshot(dec!(100));
        let input = input_for(&account, dec!(-5), Direction::Income);

        assert_eq!(
            PostingService::resolve(&account, &input),
            Err(LedgerError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_sub_cent_amount_rejected() {
        let account = snapshot(dec!(100));
        let input = input_for(&account, dec!(1.005), Direction::Expense);

        assert_eq!(
            PostingService::resolve(&account, &input),
            Err(LedgerError::InvalidAmountScale)
        );
    }

    #[test]
    fn test_deleted_account_rejected() {
        let mut account = snapshot(dec!(100));
        account.deleted = true;
        let input = input_for(&account, dec!(10), Direction::Expense);

        assert_eq!(
            PostingService::resolve(&account, &input),
            Err(LedgerError::AccountDeleted(account.id))
        );
    }

    #[test]
    fn test_foreign_account_rejected() {
        let account = snapshot(dec!(100));
        let mut input = input_for(&account, dec!(10), Direction::Expense);
        input.acting_user = Uuid::new_v4();

        assert_eq!(
            PostingService::resolve(&account, &input),
            Err(LedgerError::NotAccountOwner(account.id))
        );
    }

    #[test]
    fn test_deleted_check_precedes_ownership_check() {
        // A soft-deleted account must read as "not found", not as a
        // permission failure, even for a foreign user.
        let mut account = snapshot(dec!(100));
        account.deleted = true;
        let mut input = input_for(&account, dec!(10), Direction::Expense);
        input.acting_user = Uuid::new_v4();

        assert_eq!(
            PostingService::resolve(&account, &input),
            Err(LedgerError::AccountDeleted(account.id))
        );
    }

    #[test]
    fn test_signed_amount_directions() {
        assert_eq!(signed_amount(Direction::Income, dec!(5)), dec!(5));
        assert_eq!(signed_amount(Direction::Expense, dec!(5)), dec!(-5));
        assert_eq!(signed_amount(Direction::Transfer, dec!(5)), dec!(-5));
    }
}
