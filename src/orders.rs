//! Orders

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

/// A purchase order waiting to be paid.
#[derive(Debug, Clone, PartialEq)]
pub struct Order<'a> {
    id: String,
    value: Money<'a, Currency>,
    promotions: SmallVec<[String; 4]>,
}

impl<'a> Order<'a> {
    /// Create a new order.
    ///
    /// `promotions` lists the payment method identifiers that offer a card
    /// promotion on this order, in the order they were supplied.
    pub fn new<P>(
        id: impl Into<String>,
        value: Money<'a, Currency>,
        promotions: impl IntoIterator<Item = P>,
    ) -> Self
    where
        P: Into<String>,
    {
        Self {
            id: id.into(),
            value,
            promotions: promotions.into_iter().map(Into::into).collect(),
        }
    }

    /// Order identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Order value before any discount
    pub fn value(&self) -> &Money<'a, Currency> {
        &self.value
    }

    /// Promotion identifiers attached to the order
    pub fn promotions(&self) -> &[String] {
        &self.promotions
    }
}
