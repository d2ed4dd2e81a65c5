//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Monetary values are `rust_decimal::Decimal` throughout, stored as
//! NUMERIC(14,2). Inputs finer than the storage scale are rejected by the
//! validation layer, never silently rounded.

use rust_decimal::Decimal;

/// Number of decimal places monetary values are stored with.
pub const MONEY_SCALE: u32 = 2;

/// Returns true if the amount fits the storage scale (at most 2 decimal places).
///
/// Trailing zeros do not count against the scale: `10.100` is valid.
#[must_use]
pub fn has_money_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// Returns true if the amount is a valid transaction magnitude:
/// strictly positive and within the storage scale.
#[must_use]
pub fn is_valid_magnitude(amount: Decimal) -> bool {
    amount > Decimal::ZERO && has_money_scale(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(100))]
    #[case(dec!(150.00))]
    #[case(dec!(0.01))]
    #[case(dec!(10.100))]
    #[case(dec!(-42.50))]
    fn test_valid_scales(#[case] amount: Decimal) {
        assert!(has_money_scale(amount));
    }

    #[rstest]
    #[case(dec!(0.001))]
    #[case(dec!(99.999))]
    #[case(dec!(-0.005))]
    fn test_invalid_scales(#[case] amount: Decimal) {
        assert!(!has_money_scale(amount));
    }

    #[test]
    fn test_magnitude_requires_positive() {
        assert!(is_valid_magnitude(dec!(0.01)));
        assert!(is_valid_magnitude(dec!(150.00)));
        assert!(!is_valid_magnitude(dec!(0)));
        assert!(!is_valid_magnitude(dec!(-1)));
        assert!(!is_valid_magnitude(dec!(1.005)));
    }
}
