//! Capacity Ledger
//!
//! Remaining capacity and cumulative spend per payment method. The ledger is
//! the only mutable state of an allocation run and changes only through
//! [`CapacityLedger::commit`], which checks and applies a plan in one call.

use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    methods::MethodCatalog,
    plans::{Charge, Plan},
    pricing::format_amount,
};

/// Errors raised when committing a plan.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    /// The plan charges a method the ledger does not track.
    #[error("unknown payment method: {0}")]
    UnknownMethod(String),

    /// The plan charges more than a method has left.
    #[error("payment method {method_id} cannot cover {requested}, {remaining} remaining")]
    InsufficientCapacity {
        /// Payment method identifier
        method_id: String,

        /// Amount the plan charges to the method
        requested: String,

        /// Capacity the method has left
        remaining: String,
    },

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Pending `(position, remaining, spent)` for one method during a commit.
type Balance<'a> = (usize, Money<'a, Currency>, Money<'a, Currency>);

#[derive(Debug, Clone)]
struct LedgerEntry<'a> {
    method_id: String,
    limit: Money<'a, Currency>,
    remaining: Money<'a, Currency>,
    spent: Money<'a, Currency>,
}

/// Remaining capacity per payment method.
///
/// Invariant: for every method, `remaining = limit - spent` and `remaining >= 0`.
#[derive(Debug, Clone)]
pub struct CapacityLedger<'a> {
    entries: Vec<LedgerEntry<'a>>,
    index: FxHashMap<String, usize>,
}

impl<'a> CapacityLedger<'a> {
    /// Start a ledger with every method at its full limit.
    pub fn from_catalog(catalog: &MethodCatalog<'a>) -> Self {
        let mut entries = Vec::with_capacity(catalog.len());
        let mut index = FxHashMap::default();

        for method in catalog.iter() {
            if index.contains_key(method.id()) {
                continue;
            }

            index.insert(method.id().to_string(), entries.len());
            entries.push(LedgerEntry {
                method_id: method.id().to_string(),
                limit: *method.limit(),
                remaining: *method.limit(),
                spent: Money::from_minor(0, method.limit().currency()),
            });
        }

        Self { entries, index }
    }

    fn entry(&self, method_id: &str) -> Option<&LedgerEntry<'a>> {
        self.index
            .get(method_id)
            .and_then(|&position| self.entries.get(position))
    }

    /// Capacity left on `method_id`, `None` if the method is unknown.
    pub fn remaining(&self, method_id: &str) -> Option<&Money<'a, Currency>> {
        self.entry(method_id).map(|entry| &entry.remaining)
    }

    /// Capacity left on `method_id` in minor units; unknown methods have none.
    pub fn remaining_minor(&self, method_id: &str) -> i64 {
        self.remaining(method_id).map_or(0, Money::to_minor_units)
    }

    /// Amount committed to `method_id` so far, `None` if the method is unknown.
    pub fn spent(&self, method_id: &str) -> Option<&Money<'a, Currency>> {
        self.entry(method_id).map(|entry| &entry.spent)
    }

    /// Limit the ledger started `method_id` at, `None` if the method is unknown.
    pub fn limit(&self, method_id: &str) -> Option<&Money<'a, Currency>> {
        self.entry(method_id).map(|entry| &entry.limit)
    }

    /// Whether every charge of `plan` fits into its method's remaining capacity.
    ///
    /// Unknown methods have zero capacity, so a plan charging one never fits.
    pub fn can_afford(&self, plan: &Plan<'_>) -> bool {
        self.shortfall(plan).is_none()
    }

    /// First charge of `plan` that does not fit, together with the total the
    /// plan asks of that method.
    fn shortfall<'p>(&self, plan: &'p Plan<'_>) -> Option<(&'p Charge<'p>, i64)> {
        plan.charges().iter().find_map(|charge| {
            let requested: i64 = plan
                .charges()
                .iter()
                .filter(|other| other.method_id == charge.method_id)
                .map(|other| other.amount.to_minor_units())
                .sum();

            let fits = self
                .entry(&charge.method_id)
                .is_some_and(|entry| entry.remaining.to_minor_units() >= requested);

            (!fits).then_some((charge, requested))
        })
    }

    /// Charge `plan` against the ledger.
    ///
    /// Either every charge is applied or none is.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UnknownMethod`]: the plan charges a method the ledger does not track.
    /// - [`LedgerError::InsufficientCapacity`]: a charge exceeds the method's remaining capacity.
    /// - [`LedgerError::Money`]: a charge uses a different currency than its method.
    pub fn commit(&mut self, plan: &Plan<'a>) -> Result<(), LedgerError> {
        if let Some((charge, requested)) = self.shortfall(plan) {
            let Some(entry) = self.entry(&charge.method_id) else {
                return Err(LedgerError::UnknownMethod(charge.method_id.clone()));
            };

            return Err(LedgerError::InsufficientCapacity {
                method_id: charge.method_id.clone(),
                requested: format_amount(&Money::from_minor(
                    requested,
                    entry.remaining.currency(),
                )),
                remaining: format_amount(&entry.remaining),
            });
        }

        // Compute every new balance before writing any of them.
        let mut updates: SmallVec<[Balance<'a>; 2]> = SmallVec::new();

        for charge in plan.charges() {
            let position = self
                .index
                .get(&charge.method_id)
                .copied()
                .ok_or_else(|| LedgerError::UnknownMethod(charge.method_id.clone()))?;

            let pending = updates
                .iter()
                .rev()
                .find(|(p, _, _)| *p == position)
                .map(|&(_, remaining, spent)| (remaining, spent));

            let (remaining, spent) = match pending {
                Some(balance) => balance,
                None => self
                    .entries
                    .get(position)
                    .map(|entry| (entry.remaining, entry.spent))
                    .ok_or_else(|| LedgerError::UnknownMethod(charge.method_id.clone()))?,
            };

            updates.push((
                position,
                remaining.sub(charge.amount)?,
                spent.add(charge.amount)?,
            ));
        }

        for (position, remaining, spent) in updates {
            if let Some(entry) = self.entries.get_mut(position) {
                debug!(
                    method_id = %entry.method_id,
                    remaining = %format_amount(&remaining),
                    spent = %format_amount(&spent),
                    "capacity updated"
                );

                entry.remaining = remaining;
                entry.spent = spent;
            }
        }

        Ok(())
    }

    /// Cumulative spend per method, in catalog order, every method listed.
    pub fn spend_summary(&self) -> Vec<Charge<'a>> {
        self.entries
            .iter()
            .map(|entry| Charge::new(entry.method_id.clone(), entry.spent))
            .collect()
    }
}
