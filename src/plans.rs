//! Payment Plans

use std::fmt;

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::{SmallVec, smallvec};

use crate::pricing::total_amount;

/// How a plan pays for its order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanKind {
    /// Whole order on a card that carries a promotion for it
    Card,

    /// Whole order paid with loyalty points at the points discount
    LoyaltyFull,

    /// Part of the order paid with points, the rest on a card
    LoyaltyPartial,

    /// Whole order on a card, no discount
    FullPrice,
}

impl PlanKind {
    /// Stable label used in reports
    pub fn label(self) -> &'static str {
        match self {
            PlanKind::Card => "CARD",
            PlanKind::LoyaltyFull => "LOYALTY_FULL",
            PlanKind::LoyaltyPartial => "LOYALTY_PARTIAL",
            PlanKind::FullPrice => "FULL_PRICE",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Amount charged to a single payment method.
#[derive(Debug, Clone, PartialEq)]
pub struct Charge<'a> {
    /// Payment method identifier
    pub method_id: String,

    /// Amount charged to the method
    pub amount: Money<'a, Currency>,
}

impl<'a> Charge<'a> {
    /// Create a new charge.
    pub fn new(method_id: impl Into<String>, amount: Money<'a, Currency>) -> Self {
        Self {
            method_id: method_id.into(),
            amount,
        }
    }
}

/// A split of one order's discounted value across one or two payment methods.
///
/// The charges always add up to the order value minus `discount`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<'a> {
    kind: PlanKind,
    charges: SmallVec<[Charge<'a>; 2]>,
    discount: Money<'a, Currency>,
}

impl<'a> Plan<'a> {
    /// Plan charging a single method.
    pub fn single(kind: PlanKind, charge: Charge<'a>, discount: Money<'a, Currency>) -> Self {
        Self {
            kind,
            charges: smallvec![charge],
            discount,
        }
    }

    /// Plan splitting the order across two methods.
    pub fn split(
        kind: PlanKind,
        first: Charge<'a>,
        second: Charge<'a>,
        discount: Money<'a, Currency>,
    ) -> Self {
        Self {
            kind,
            charges: smallvec![first, second],
            discount,
        }
    }

    /// How the plan pays
    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    /// Amount charged per method
    pub fn charges(&self) -> &[Charge<'a>] {
        &self.charges
    }

    /// Total discount granted on the order
    pub fn discount(&self) -> &Money<'a, Currency> {
        &self.discount
    }

    /// Amount charged to `method_id`, if the plan uses it.
    pub fn amount_for(&self, method_id: &str) -> Option<&Money<'a, Currency>> {
        self.charges
            .iter()
            .find(|charge| charge.method_id == method_id)
            .map(|charge| &charge.amount)
    }

    /// Sum of all charges, the order value after discount.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the charges use different currencies.
    pub fn total(&self) -> Result<Money<'a, Currency>, MoneyError> {
        total_amount(
            self.charges.iter().map(|charge| &charge.amount),
            self.discount.currency(),
        )
    }
}
