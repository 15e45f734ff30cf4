//! Solvers for Payment Allocation

use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::DiscountError,
    ledger::LedgerError,
    methods::PaymentMethod,
    orders::Order,
    plans::{Charge, Plan},
    pricing::total_amount,
};

pub mod greedy;

/// Solver Errors
#[derive(Debug, Error)]
pub enum SolverError {
    /// The catalog has no payment method other than loyalty points, so nothing
    /// can ever pay what points do not cover. Raised before any allocation.
    #[error("no payment method other than `{loyalty_method_id}` is available to pay for orders")]
    NoDefaultMethod {
        /// Identifier of the loyalty points method
        loyalty_method_id: String,
    },

    /// An order could not be paid by any plan in the fallback chain.
    #[error("order {order_id} cannot be paid with the remaining capacity of any payment method")]
    Exhausted {
        /// Identifier of the order that could not be paid
        order_id: String,
    },

    /// Wrapped ledger error
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

impl SolverError {
    /// Whether the error comes from the method catalog rather than from running
    /// out of capacity while allocating.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SolverError::NoDefaultMethod { .. })
    }

    /// Identifier of the order that could not be paid, for exhaustion errors.
    pub fn exhausted_order(&self) -> Option<&str> {
        match self {
            SolverError::Exhausted { order_id } => Some(order_id),
            _ => None,
        }
    }
}

/// Committed plans for every order of a run, with the resulting spend per method.
#[derive(Debug, Clone)]
pub struct Allocation<'a> {
    plans: Vec<(String, Plan<'a>)>,
    index: FxHashMap<String, usize>,
    spend_summary: Vec<Charge<'a>>,
    currency: &'a Currency,
}

impl<'a> Allocation<'a> {
    /// Create an allocation from plans in order input order and a spend summary
    /// in catalog order.
    pub fn new(
        plans: Vec<(String, Plan<'a>)>,
        spend_summary: Vec<Charge<'a>>,
        currency: &'a Currency,
    ) -> Self {
        let mut index = FxHashMap::default();

        for (position, (order_id, _)) in plans.iter().enumerate() {
            index.entry(order_id.clone()).or_insert(position);
        }

        Self {
            plans,
            index,
            spend_summary,
            currency,
        }
    }

    /// `(order id, plan)` pairs in order input order.
    pub fn plans(&self) -> &[(String, Plan<'a>)] {
        &self.plans
    }

    /// Plan committed for `order_id`.
    pub fn plan_for(&self, order_id: &str) -> Option<&Plan<'a>> {
        self.index
            .get(order_id)
            .and_then(|&position| self.plans.get(position))
            .map(|(_, plan)| plan)
    }

    /// Cumulative amount charged per payment method, in catalog order.
    pub fn spend_summary(&self) -> &[Charge<'a>] {
        &self.spend_summary
    }

    /// Amount charged to `method_id` across all orders.
    pub fn spent_on(&self, method_id: &str) -> Option<&Money<'a, Currency>> {
        self.spend_summary
            .iter()
            .find(|charge| charge.method_id == method_id)
            .map(|charge| &charge.amount)
    }

    /// Sum of the discounts of every committed plan.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if plans use different currencies.
    pub fn total_discount(&self) -> Result<Money<'a, Currency>, MoneyError> {
        total_amount(self.plans.iter().map(|(_, plan)| plan.discount()), self.currency)
    }

    /// Currency of every amount in the allocation.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Number of orders covered.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Whether the allocation covers no orders.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

/// Trait for allocating orders to payment methods
pub trait Solver {
    /// Assign exactly one payment plan to every order.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the catalog cannot pay for anything or an
    /// order cannot be covered.
    fn solve<'a>(
        &self,
        orders: &[Order<'a>],
        methods: &[PaymentMethod<'a>],
    ) -> Result<Allocation<'a>, SolverError>;
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::PLN;
    use testresult::TestResult;

    use super::*;
    use crate::plans::PlanKind;

    fn pln(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, PLN)
    }

    fn allocation() -> Allocation<'static> {
        Allocation::new(
            vec![
                (
                    "ORDER1".to_string(),
                    Plan::single(
                        PlanKind::Card,
                        Charge::new("mZysk", pln(9_000)),
                        pln(1_000),
                    ),
                ),
                (
                    "ORDER2".to_string(),
                    Plan::single(
                        PlanKind::FullPrice,
                        Charge::new("mZysk", pln(5_000)),
                        pln(0),
                    ),
                ),
            ],
            vec![
                Charge::new("PUNKTY", pln(0)),
                Charge::new("mZysk", pln(14_000)),
            ],
            PLN,
        )
    }

    #[test]
    fn plan_lookup_by_order_id() {
        let allocation = allocation();

        assert_eq!(
            allocation.plan_for("ORDER2").map(Plan::kind),
            Some(PlanKind::FullPrice)
        );
        assert!(allocation.plan_for("ORDER3").is_none());
        assert_eq!(allocation.len(), 2);
    }

    #[test]
    fn total_discount_sums_plans() -> TestResult {
        assert_eq!(allocation().total_discount()?, pln(1_000));

        Ok(())
    }

    #[test]
    fn spent_on_reads_summary() {
        let allocation = allocation();

        assert_eq!(allocation.spent_on("mZysk"), Some(&pln(14_000)));
        assert_eq!(allocation.spent_on("PUNKTY"), Some(&pln(0)));
        assert_eq!(allocation.spent_on("UNKNOWN"), None);
    }

    #[test]
    fn error_classification() {
        let configuration = SolverError::NoDefaultMethod {
            loyalty_method_id: "PUNKTY".to_string(),
        };
        let exhausted = SolverError::Exhausted {
            order_id: "ORDER7".to_string(),
        };

        assert!(configuration.is_configuration());
        assert!(!exhausted.is_configuration());
        assert_eq!(exhausted.exhausted_order(), Some("ORDER7"));
        assert_eq!(configuration.exhausted_order(), None);
    }
}
