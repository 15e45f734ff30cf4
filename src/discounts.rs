//! Discounts
//!
//! Percentage discount arithmetic shared by candidate generation and the
//! fallback chain. Every discount in the crate is computed here.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Build a percentage from whole percentage points (`15` becomes 15%).
pub fn percent_points(points: u8) -> Percentage {
    Percentage::from(Decimal::new(i64::from(points), 2))
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// The product is exact in [`Decimal`] and only then rounded half-up to a whole
/// minor unit, so `v * p / 100` never carries more than two decimal places.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Discount granted on `value` at `percent`, in the currency of `value`.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percentage_discount<'a>(
    value: &Money<'a, Currency>,
    percent: &Percentage,
) -> Result<Money<'a, Currency>, DiscountError> {
    let discount_minor = percent_of_minor(percent, value.to_minor_units())?;

    Ok(Money::from_minor(discount_minor, value.currency()))
}

/// Returns `(discount, value after discount)` for `value` at `percent`.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the discount cannot be computed or subtracted.
pub fn apply_percentage<'a>(
    value: &Money<'a, Currency>,
    percent: &Percentage,
) -> Result<(Money<'a, Currency>, Money<'a, Currency>), DiscountError> {
    let discount = percentage_discount(value, percent)?;
    let discounted = value.sub(discount)?;

    Ok((discount, discounted))
}
