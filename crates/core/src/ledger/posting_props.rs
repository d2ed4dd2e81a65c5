//! Property tests for posting resolution.
//!
//! Validates the balance-consistency invariant: after any sequence of
//! successful postings, the balance equals the starting balance plus the sum
//! of all signed amounts.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::posting::{signed_amount, PostingService};
use super::types::{AccountSnapshot, Direction, PostingInput};

/// Strategy for positive amounts with at most 2 decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Income),
        Just(Direction::Expense),
        Just(Direction::Transfer),
    ]
}

fn make_input(account: &AccountSnapshot, amount: Decimal, direction: Direction) -> PostingInput {
    PostingInput {
        acting_user: account.user_id,
        account_id: account.id,
        amount,
        direction,
        method: "card".to_string(),
        description: String::new(),
        occurred_at: Utc::now(),
        tag_ids: vec![],
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Income carries a positive sign, expense and transfer a negative one,
    /// and the magnitude is never altered.
    #[test]
    fn prop_signed_amount_sign_and_magnitude(
        amount in amount_strategy(),
        direction in direction_strategy(),
    ) {
        let signed = signed_amount(direction, amount);
        prop_assert_eq!(signed.abs(), amount);
        match direction {
            Direction::Income => prop_assert!(signed > Decimal::ZERO),
            Direction::Expense | Direction::Transfer => prop_assert!(signed < Decimal::ZERO),
        }
    }

    /// Folding any sequence of postings through resolve keeps the balance
    /// equal to the running sum of signed amounts.
    #[test]
    fn prop_sequential_postings_preserve_balance_sum(
        start in -1_000_000i64..1_000_000i64,
        postings in proptest::collection::vec(
            (amount_strategy(), direction_strategy()),
            1..32,
        ),
    ) {
        let mut account = AccountSnapshot {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            balance: Decimal::new(start, 2),
            deleted: false,
        };
        let initial = account.balance;
        let mut signed_sum = Decimal::ZERO;

        for (amount, direction) in postings {
            let input = make_input(&account, amount, direction);
            let resolved = PostingService::resolve(&account, &input).unwrap();

            prop_assert_eq!(
                resolved.balance_after,
                account.balance + resolved.signed_amount
            );

            signed_sum += resolved.signed_amount;
            account.balance = resolved.balance_after;
        }

        prop_assert_eq!(account.balance, initial + signed_sum);
    }

    /// Non-positive amounts never resolve, regardless of direction.
    #[test]
    fn prop_non_positive_amounts_rejected(
        raw in -10_000_000i64..=0i64,
        direction in direction_strategy(),
    ) {
        let account = AccountSnapshot {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            balance: Decimal::ZERO,
            deleted: false,
        };
        let input = make_input(&account, Decimal::new(raw, 2), direction);
        prop_assert!(PostingService::resolve(&account, &input).is_err());
    }
}
