//! Fallback Chain
//!
//! Plans for orders the greedy pass left uncovered, tried in a fixed order:
//! full points, partial points plus a card, then a card at full price.

use rusty_money::Money;
use tracing::debug;

use crate::{
    candidates::{full_points_plan, partial_points_allowed, partial_points_minimum},
    ledger::CapacityLedger,
    methods::MethodCatalog,
    orders::Order,
    plans::{Charge, Plan, PlanKind},
    policy::AllocationPolicy,
    solvers::SolverError,
};

/// Partial-points plan sized against the current ledger.
///
/// Spends as many points as are left, at least the partial-points minimum and
/// at most the discounted value, and charges the rest to the first card (in
/// catalog order) that can take it. Returns `None` when points are exhausted,
/// the minimum does not fit, or no card can take the rest.
///
/// # Errors
///
/// Returns a [`SolverError`] if the amounts cannot be computed.
pub fn sized_partial_points_plan<'a>(
    order: &Order<'a>,
    catalog: &MethodCatalog<'_>,
    ledger: &CapacityLedger<'_>,
    policy: &AllocationPolicy,
) -> Result<Option<Plan<'a>>, SolverError> {
    let Some(loyalty) = catalog.loyalty() else {
        return Ok(None);
    };

    let available = ledger.remaining_minor(loyalty.id());

    if available <= 0 {
        return Ok(None);
    }

    let discount = partial_points_minimum(order, policy)?;
    let discounted = order.value().sub(discount)?;

    let minimum = discount.to_minor_units();
    let discounted_minor = discounted.to_minor_units();

    let points_minor = minimum
        .max(available.min(discounted_minor))
        .min(discounted_minor);

    if points_minor > available || points_minor <= 0 {
        return Ok(None);
    }

    let currency = order.value().currency();
    let points = Charge::new(loyalty.id(), Money::from_minor(points_minor, currency));
    let remainder_minor = discounted_minor - points_minor;

    if remainder_minor == 0 {
        return Ok(Some(Plan::single(PlanKind::LoyaltyPartial, points, discount)));
    }

    let card = catalog
        .cards()
        .find(|method| ledger.remaining_minor(method.id()) >= remainder_minor);

    Ok(card.map(|method| {
        Plan::split(
            PlanKind::LoyaltyPartial,
            points,
            Charge::new(method.id(), Money::from_minor(remainder_minor, currency)),
            discount,
        )
    }))
}

/// First plan in the fallback chain the ledger can afford, without committing it.
///
/// # Errors
///
/// Returns a [`SolverError`] if the amounts cannot be computed.
pub fn resolve<'a>(
    order: &Order<'a>,
    catalog: &MethodCatalog<'_>,
    ledger: &CapacityLedger<'_>,
    policy: &AllocationPolicy,
) -> Result<Option<Plan<'a>>, SolverError> {
    if let Some(loyalty) = catalog.loyalty() {
        if let Some(plan) = full_points_plan(order, loyalty)? {
            if ledger.can_afford(&plan) {
                return Ok(Some(plan));
            }
        }

        debug!(order_id = order.id(), "full points payment not possible");

        if partial_points_allowed(order, catalog, policy) {
            if let Some(plan) = sized_partial_points_plan(order, catalog, ledger, policy)? {
                if ledger.can_afford(&plan) {
                    return Ok(Some(plan));
                }
            }

            debug!(order_id = order.id(), "partial points payment not possible");
        }
    }

    let value_minor = order.value().to_minor_units();

    let card = catalog
        .cards()
        .find(|method| ledger.remaining_minor(method.id()) >= value_minor);

    Ok(card.map(|method| {
        Plan::single(
            PlanKind::FullPrice,
            Charge::new(method.id(), *order.value()),
            Money::from_minor(0, order.value().currency()),
        )
    }))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{Currency, PLN};
    use testresult::TestResult;

    use super::*;
    use crate::methods::PaymentMethod;

    fn pln(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, PLN)
    }

    fn catalog(points_discount: u8, points: i64, card: i64) -> MethodCatalog<'static> {
        MethodCatalog::new(
            [
                PaymentMethod::new("PUNKTY", points_discount, pln(points)),
                PaymentMethod::new("card", 0, pln(card)),
            ],
            "PUNKTY",
        )
    }

    fn no_promotions(value: i64) -> Order<'static> {
        Order::new("ORDER1", pln(value), Vec::<String>::new())
    }

    #[test]
    fn full_points_comes_first() -> TestResult {
        let catalog = catalog(15, 10_000, 10_000);
        let ledger = CapacityLedger::from_catalog(&catalog);
        let policy = AllocationPolicy::default();

        let plan = resolve(&no_promotions(5_000), &catalog, &ledger, &policy)?
            .ok_or("expected a plan")?;

        assert_eq!(plan.kind(), PlanKind::LoyaltyFull);
        assert_eq!(plan.amount_for("PUNKTY"), Some(&pln(4_250)));
        assert_eq!(plan.discount(), &pln(750));

        Ok(())
    }

    #[test]
    fn partial_points_spends_all_available_points() -> TestResult {
        let catalog = catalog(15, 1_500, 10_000);
        let ledger = CapacityLedger::from_catalog(&catalog);
        let policy = AllocationPolicy::default();

        let plan = resolve(&no_promotions(5_000), &catalog, &ledger, &policy)?
            .ok_or("expected a plan")?;

        assert_eq!(plan.kind(), PlanKind::LoyaltyPartial);
        assert_eq!(plan.amount_for("PUNKTY"), Some(&pln(1_500)));
        assert_eq!(plan.amount_for("card"), Some(&pln(3_000)));
        assert_eq!(plan.discount(), &pln(500));

        Ok(())
    }

    #[test]
    fn partial_points_needs_the_minimum() -> TestResult {
        let catalog = catalog(15, 400, 10_000);
        let ledger = CapacityLedger::from_catalog(&catalog);
        let policy = AllocationPolicy::default();

        let plan = resolve(&no_promotions(5_000), &catalog, &ledger, &policy)?
            .ok_or("expected a plan")?;

        assert_eq!(plan.kind(), PlanKind::FullPrice);
        assert_eq!(plan.amount_for("card"), Some(&pln(5_000)));
        assert!(plan.discount().is_zero());

        Ok(())
    }

    #[test]
    fn partial_points_skipped_when_card_promotion_reaches_threshold() -> TestResult {
        let catalog = MethodCatalog::new(
            [
                PaymentMethod::new("PUNKTY", 15, pln(1_000)),
                PaymentMethod::new("card", 0, pln(10_000)),
                PaymentMethod::new("mZysk", 10, pln(0)),
            ],
            "PUNKTY",
        );
        let ledger = CapacityLedger::from_catalog(&catalog);
        let order = Order::new("ORDER1", pln(5_000), ["mZysk"]);

        let plan = resolve(&order, &catalog, &ledger, &AllocationPolicy::default())?
            .ok_or("expected a plan")?;

        assert_eq!(plan.kind(), PlanKind::FullPrice);

        Ok(())
    }

    #[test]
    fn points_covering_everything_leave_no_card_charge() -> TestResult {
        let catalog = catalog(100, 10_000, 0);
        let ledger = CapacityLedger::from_catalog(&catalog);
        let policy = AllocationPolicy::default();

        let plan = sized_partial_points_plan(&no_promotions(5_000), &catalog, &ledger, &policy)?
            .ok_or("expected a plan")?;

        assert_eq!(plan.charges().len(), 1);
        assert_eq!(plan.amount_for("PUNKTY"), Some(&pln(4_500)));
        assert_eq!(plan.total()?, pln(4_500));

        Ok(())
    }

    #[test]
    fn no_plan_when_nothing_fits() -> TestResult {
        let catalog = catalog(15, 0, 1_000);
        let ledger = CapacityLedger::from_catalog(&catalog);

        let plan = resolve(
            &no_promotions(5_000),
            &catalog,
            &ledger,
            &AllocationPolicy::default(),
        )?;

        assert!(plan.is_none());

        Ok(())
    }

    #[test]
    fn full_price_scans_cards_in_catalog_order() -> TestResult {
        let catalog = MethodCatalog::new(
            [
                PaymentMethod::new("small", 0, pln(1_000)),
                PaymentMethod::new("large", 0, pln(10_000)),
                PaymentMethod::new("larger", 0, pln(20_000)),
            ],
            "PUNKTY",
        );
        let ledger = CapacityLedger::from_catalog(&catalog);

        let plan = resolve(
            &no_promotions(5_000),
            &catalog,
            &ledger,
            &AllocationPolicy::default(),
        )?
        .ok_or("expected a plan")?;

        assert_eq!(plan.amount_for("large"), Some(&pln(5_000)));

        Ok(())
    }
}
