//! Amounts

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};

/// Number of minor units in one major unit for the supported currencies.
pub const MINOR_UNITS: i64 = 100;

/// Format an amount with exactly two decimal places (`165.00`).
pub fn format_amount(amount: &Money<'_, Currency>) -> String {
    format!("{:.2}", Decimal::new(amount.to_minor_units(), 2))
}

/// Convert a decimal amount (e.g. `42.505`) to minor units, rounding half-up.
///
/// Returns `None` if the amount does not fit into an `i64` of minor units.
pub fn decimal_to_minor(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::from(MINOR_UNITS))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Sum a set of amounts, starting from zero in `currency`.
///
/// # Errors
///
/// Returns a [`MoneyError`] if any amount has a different currency.
pub fn total_amount<'a, 'b>(
    amounts: impl IntoIterator<Item = &'b Money<'a, Currency>>,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, MoneyError>
where
    'a: 'b,
{
    amounts
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, amount| acc.add(*amount))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, PLN};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn format_amount_always_has_two_decimals() {
        assert_eq!(format_amount(&Money::from_minor(16_500, PLN)), "165.00");
        assert_eq!(format_amount(&Money::from_minor(4_250, PLN)), "42.50");
        assert_eq!(format_amount(&Money::from_minor(7, PLN)), "0.07");
    }

    #[test]
    fn decimal_to_minor_rounds_half_up() -> TestResult {
        assert_eq!(decimal_to_minor("42.505".parse()?), Some(4_251));
        assert_eq!(decimal_to_minor("42.504".parse()?), Some(4_250));
        assert_eq!(decimal_to_minor("100".parse()?), Some(10_000));

        Ok(())
    }

    #[test]
    fn total_amount_sums_in_currency() -> TestResult {
        let amounts = [Money::from_minor(100, PLN), Money::from_minor(250, PLN)];

        assert_eq!(total_amount(&amounts, PLN)?, Money::from_minor(350, PLN));

        Ok(())
    }

    #[test]
    fn total_amount_of_nothing_is_zero() -> TestResult {
        let amounts: [Money<'static, Currency>; 0] = [];

        assert!(total_amount(&amounts, PLN)?.is_zero());

        Ok(())
    }

    #[test]
    fn total_amount_rejects_mixed_currencies() {
        let amounts = [Money::from_minor(100, PLN), Money::from_minor(100, EUR)];

        assert!(total_amount(&amounts, PLN).is_err());
    }
}
