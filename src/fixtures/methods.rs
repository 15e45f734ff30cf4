//! Payment Method Fixtures

use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    fixtures::{AmountFixture, FixtureError},
    methods::PaymentMethod,
};

/// Discount written either as a number (`10`) or a string (`"10"` or `"10%"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PercentFixture {
    /// Whole percentage points
    Integer(i64),

    /// Percentage points as text
    Text(String),
}

impl PercentFixture {
    /// Parse into whole percentage points between 0 and 100.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidPercentage`] if the value is not a whole
    /// number in range.
    pub fn to_points(&self) -> Result<u8, FixtureError> {
        let points = match self {
            PercentFixture::Integer(value) => *value,
            PercentFixture::Text(value) => {
                let trimmed = value.trim();

                trimmed
                    .strip_suffix('%')
                    .unwrap_or(trimmed)
                    .trim()
                    .parse::<i64>()
                    .map_err(|_err| FixtureError::InvalidPercentage(value.clone()))?
            }
        };

        u8::try_from(points)
            .ok()
            .filter(|points| *points <= 100)
            .ok_or_else(|| FixtureError::InvalidPercentage(points.to_string()))
    }
}

/// Payment method fixture from JSON or YAML
#[derive(Debug, Deserialize)]
pub struct MethodFixture {
    /// Payment method identifier
    pub id: String,

    /// Discount in whole percentage points
    pub discount: PercentFixture,

    /// Spending limit, e.g. `"180.00"`
    pub limit: AmountFixture,
}

impl MethodFixture {
    /// Convert to a [`PaymentMethod`] with amounts in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, the discount is out of range, or
    /// the limit is negative or malformed.
    pub fn into_method(
        self,
        currency: &'static Currency,
    ) -> Result<PaymentMethod<'static>, FixtureError> {
        if self.id.trim().is_empty() {
            return Err(FixtureError::EmptyId {
                kind: "payment method",
            });
        }

        let discount = self.discount.to_points()?;
        let limit = self.limit.to_money(currency)?;

        if limit.is_negative() {
            return Err(FixtureError::NegativeLimit {
                method_id: self.id,
                limit: self.limit.to_string(),
            });
        }

        Ok(PaymentMethod::new(self.id, discount, limit))
    }
}
