//! Greedy Solver
//!
//! Ranks every candidate plan of every order by the promotion limit it uses,
//! commits the largest ones first while capacity lasts, and hands whatever is
//! left to the fallback chain in input order.

use tracing::{debug, info, warn};

use crate::{
    candidates::{Candidate, generate_candidates, rank_candidates},
    ledger::CapacityLedger,
    methods::{MethodCatalog, PaymentMethod},
    orders::Order,
    plans::{Plan, PlanKind},
    policy::AllocationPolicy,
    solvers::{Allocation, Solver, SolverError},
};

pub mod fallback;

/// Solver committing the most valuable candidates first.
#[derive(Debug, Clone, Default)]
pub struct GreedySolver {
    policy: AllocationPolicy,
}

impl GreedySolver {
    /// Create a solver running under `policy`.
    pub fn new(policy: AllocationPolicy) -> Self {
        Self { policy }
    }

    /// Policy the solver runs under.
    pub fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    /// Commit ranked candidates while they fit. Orders stay `None` when none of
    /// their candidates could be committed.
    fn greedy_pass<'a>(
        &self,
        orders: &[Order<'a>],
        catalog: &MethodCatalog<'_>,
        candidates: Vec<Candidate<'a>>,
        ledger: &mut CapacityLedger<'a>,
        assigned: &mut [Option<Plan<'a>>],
    ) -> Result<(), SolverError> {
        for candidate in candidates {
            let Some(slot) = assigned.get_mut(candidate.order_idx) else {
                return Err(SolverError::InvariantViolation {
                    message: "candidate refers to an order outside the input",
                });
            };

            if slot.is_some() {
                continue;
            }

            let Some(order) = orders.get(candidate.order_idx) else {
                return Err(SolverError::InvariantViolation {
                    message: "candidate refers to an order outside the input",
                });
            };

            let plan = if candidate.plan.kind() == PlanKind::LoyaltyPartial {
                if !candidate.partial_points_eligible {
                    debug!(
                        order_id = order.id(),
                        "partial points skipped, a card promotion reaches the threshold"
                    );

                    continue;
                }

                match fallback::sized_partial_points_plan(order, catalog, ledger, &self.policy)? {
                    Some(plan) => plan,
                    None => {
                        debug!(order_id = order.id(), "partial points do not fit");

                        continue;
                    }
                }
            } else {
                candidate.plan
            };

            if !ledger.can_afford(&plan) {
                debug!(order_id = order.id(), kind = %plan.kind(), "plan does not fit");

                continue;
            }

            ledger.commit(&plan)?;

            debug!(
                order_id = order.id(),
                kind = %plan.kind(),
                "committed plan"
            );

            *slot = Some(plan);
        }

        Ok(())
    }
}

impl Solver for GreedySolver {
    fn solve<'a>(
        &self,
        orders: &[Order<'a>],
        methods: &[PaymentMethod<'a>],
    ) -> Result<Allocation<'a>, SolverError> {
        let catalog = MethodCatalog::new(methods.to_vec(), self.policy.loyalty_method_id.clone());

        let Some(default_method) = catalog.default_method() else {
            return Err(SolverError::NoDefaultMethod {
                loyalty_method_id: self.policy.loyalty_method_id.clone(),
            });
        };

        let currency = default_method.limit().currency();

        let mut candidates = generate_candidates(orders, &catalog, default_method, &self.policy)?;

        rank_candidates(&mut candidates);

        info!(
            orders = orders.len(),
            methods = catalog.len(),
            candidates = candidates.len(),
            "generated candidate plans"
        );

        let mut ledger = CapacityLedger::from_catalog(&catalog);
        let mut assigned: Vec<Option<Plan<'a>>> = vec![None; orders.len()];

        self.greedy_pass(orders, &catalog, candidates, &mut ledger, &mut assigned)?;

        let uncovered = assigned.iter().filter(|plan| plan.is_none()).count();

        info!(
            covered = orders.len() - uncovered,
            uncovered, "greedy pass finished"
        );

        let mut plans = Vec::with_capacity(orders.len());

        for (order, slot) in orders.iter().zip(assigned) {
            let plan = match slot {
                Some(plan) => plan,
                None => {
                    warn!(
                        order_id = order.id(),
                        "order not covered by a promotion, trying fallback chain"
                    );

                    let plan = fallback::resolve(order, &catalog, &ledger, &self.policy)?
                        .ok_or_else(|| SolverError::Exhausted {
                            order_id: order.id().to_string(),
                        })?;

                    ledger.commit(&plan)?;

                    debug!(order_id = order.id(), kind = %plan.kind(), "committed fallback plan");

                    plan
                }
            };

            plans.push((order.id().to_string(), plan));
        }

        Ok(Allocation::new(plans, ledger.spend_summary(), currency))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{Currency, PLN},
    };
    use testresult::TestResult;

    use super::*;

    fn pln(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, PLN)
    }

    #[test]
    fn empty_orders_give_empty_allocation() -> TestResult {
        let methods = [
            PaymentMethod::new("PUNKTY", 15, pln(10_000)),
            PaymentMethod::new("mZysk", 10, pln(18_000)),
        ];

        let allocation = GreedySolver::default().solve(&[], &methods)?;

        assert!(allocation.is_empty());
        assert_eq!(allocation.spend_summary().len(), 2);

        Ok(())
    }

    #[test]
    fn no_card_method_is_a_configuration_error() {
        let methods = [PaymentMethod::new("PUNKTY", 15, pln(10_000))];
        let orders = [Order::new("ORDER1", pln(100), Vec::<String>::new())];

        let result = GreedySolver::default().solve(&orders, &methods);

        assert!(matches!(result, Err(SolverError::NoDefaultMethod { .. })));
    }

    #[test]
    fn empty_catalog_is_a_configuration_error() {
        let result = GreedySolver::default().solve(&[], &[]);

        assert!(matches!(result, Err(ref error) if error.is_configuration()));
    }

    #[test]
    fn exhaustion_names_the_order() {
        let methods = [PaymentMethod::new("card", 0, pln(1_000))];
        let orders = [
            Order::new("ORDER1", pln(800), Vec::<String>::new()),
            Order::new("ORDER2", pln(800), Vec::<String>::new()),
        ];

        let result = GreedySolver::default().solve(&orders, &methods);

        assert!(matches!(
            result,
            Err(SolverError::Exhausted { ref order_id }) if order_id == "ORDER2"
        ));
    }

    #[test]
    fn custom_loyalty_method_is_respected() -> TestResult {
        let methods = [
            PaymentMethod::new("POINTS", 20, pln(10_000)),
            PaymentMethod::new("card", 0, pln(10_000)),
        ];
        let orders = [Order::new("ORDER1", pln(5_000), Vec::<String>::new())];

        let solver = GreedySolver::new(AllocationPolicy::with_loyalty_method("POINTS"));
        let allocation = solver.solve(&orders, &methods)?;

        let plan = allocation.plan_for("ORDER1").ok_or("missing plan")?;

        assert_eq!(plan.kind(), PlanKind::LoyaltyFull);
        assert_eq!(plan.amount_for("POINTS"), Some(&pln(4_000)));

        Ok(())
    }

    #[test]
    fn greedy_prefers_larger_promotion_limit() -> TestResult {
        let methods = [
            PaymentMethod::new("PUNKTY", 0, pln(0)),
            PaymentMethod::new("low", 5, pln(10_000)),
            PaymentMethod::new("high", 20, pln(10_000)),
        ];
        let orders = [Order::new("ORDER1", pln(10_000), ["low", "high"])];

        let allocation = GreedySolver::default().solve(&orders, &methods)?;
        let plan = allocation.plan_for("ORDER1").ok_or("missing plan")?;

        assert_eq!(plan.amount_for("high"), Some(&pln(8_000)));
        assert_eq!(plan.discount(), &pln(2_000));

        Ok(())
    }
}
