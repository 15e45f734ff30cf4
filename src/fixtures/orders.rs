//! Order Fixtures

use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    fixtures::{AmountFixture, FixtureError},
    orders::Order,
};

/// Order fixture from JSON or YAML
#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    /// Order identifier
    pub id: String,

    /// Order value before discounts, e.g. `"150.00"`
    pub value: AmountFixture,

    /// Payment method identifiers with a card promotion on this order
    #[serde(default)]
    pub promotions: Option<Vec<String>>,
}

impl OrderFixture {
    /// Convert to an [`Order`] with amounts in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or the value is not a positive amount.
    pub fn into_order(self, currency: &'static Currency) -> Result<Order<'static>, FixtureError> {
        if self.id.trim().is_empty() {
            return Err(FixtureError::EmptyId { kind: "order" });
        }

        let value = self.value.to_money(currency)?;

        if !value.is_positive() {
            return Err(FixtureError::NonPositiveValue {
                order_id: self.id,
                value: self.value.to_string(),
            });
        }

        Ok(Order::new(self.id, value, self.promotions.unwrap_or_default()))
    }
}
