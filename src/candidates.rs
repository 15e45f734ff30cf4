//! Candidate Plans
//!
//! Every discount plan an order could structurally use, ignoring capacity
//! pressure from other orders. Generation is pure: it reads the order and the
//! catalog and never touches a ledger, so it can run per order in any order.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    discounts::{DiscountError, apply_percentage, percent_points, percentage_discount},
    methods::{MethodCatalog, PaymentMethod},
    orders::Order,
    plans::{Charge, Plan, PlanKind},
    policy::AllocationPolicy,
};

/// A plan proposed for one order, not yet checked against capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    /// Index of the order in the input sequence
    pub order_idx: usize,

    /// Proposed plan
    pub plan: Plan<'a>,

    /// Amount of promotion limit the plan draws on, used to rank candidates
    pub limit_used: Money<'a, Currency>,

    /// For partial-points plans: no card promotion on the order reaches the
    /// partial-points percentage. Always `true` for other plans.
    pub partial_points_eligible: bool,
}

/// Highest configured discount percentage among the card promotions on `order`.
///
/// Promotions naming unknown methods or the loyalty method are ignored.
pub fn best_card_percent(order: &Order<'_>, catalog: &MethodCatalog<'_>) -> Option<u8> {
    order
        .promotions()
        .iter()
        .filter_map(|promotion| catalog.card(promotion))
        .map(PaymentMethod::discount_percent)
        .max()
}

/// Whether a partial-points payment may be used for `order` under `policy`.
pub fn partial_points_allowed(
    order: &Order<'_>,
    catalog: &MethodCatalog<'_>,
    policy: &AllocationPolicy,
) -> bool {
    best_card_percent(order, catalog).is_none_or(|percent| percent < policy.partial_points_percent)
}

/// Plan paying the whole order with a promoted card.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the discount cannot be computed.
pub fn card_plan<'a>(
    order: &Order<'a>,
    method: &PaymentMethod<'_>,
) -> Result<Plan<'a>, DiscountError> {
    let (discount, to_pay) = apply_percentage(order.value(), &method.discount())?;

    Ok(Plan::single(
        PlanKind::Card,
        Charge::new(method.id(), to_pay),
        discount,
    ))
}

/// Plan paying the whole order with loyalty points.
///
/// Returns `None` when the points discount leaves nothing to pay: a points
/// payment has to redeem at least one minor unit.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the discount cannot be computed.
pub fn full_points_plan<'a>(
    order: &Order<'a>,
    loyalty: &PaymentMethod<'_>,
) -> Result<Option<Plan<'a>>, DiscountError> {
    let (discount, to_pay) = apply_percentage(order.value(), &loyalty.discount())?;

    if !to_pay.is_positive() {
        return Ok(None);
    }

    Ok(Some(Plan::single(
        PlanKind::LoyaltyFull,
        Charge::new(loyalty.id(), to_pay),
        discount,
    )))
}

/// Points that must be spent to earn the partial-points discount. This is also
/// the discount it earns.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the percentage cannot be computed.
pub fn partial_points_minimum<'a>(
    order: &Order<'a>,
    policy: &AllocationPolicy,
) -> Result<Money<'a, Currency>, DiscountError> {
    percentage_discount(order.value(), &percent_points(policy.partial_points_percent))
}

/// Nominal partial-points plan: the minimum points plus the rest of the
/// discounted value on `default_method`.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the amounts cannot be computed.
pub fn partial_points_plan<'a>(
    order: &Order<'a>,
    loyalty: &PaymentMethod<'_>,
    default_method: &PaymentMethod<'_>,
    policy: &AllocationPolicy,
) -> Result<Plan<'a>, DiscountError> {
    let points = partial_points_minimum(order, policy)?;
    let remainder = order.value().sub(points)?.sub(points)?;

    Ok(Plan::split(
        PlanKind::LoyaltyPartial,
        Charge::new(loyalty.id(), points),
        Charge::new(default_method.id(), remainder),
        points,
    ))
}

/// All candidates for a single order: card promotions in the order they are
/// listed, then the full and partial loyalty points plans.
///
/// # Errors
///
/// Returns a [`DiscountError`] if any discount cannot be computed.
pub fn order_candidates<'a>(
    order_idx: usize,
    order: &Order<'a>,
    catalog: &MethodCatalog<'_>,
    default_method: &PaymentMethod<'_>,
    policy: &AllocationPolicy,
) -> Result<SmallVec<[Candidate<'a>; 4]>, DiscountError> {
    let mut candidates = SmallVec::new();

    for method in order.promotions().iter().filter_map(|id| catalog.card(id)) {
        let plan = card_plan(order, method)?;

        candidates.push(Candidate {
            order_idx,
            limit_used: *plan.discount(),
            plan,
            partial_points_eligible: true,
        });
    }

    let Some(loyalty) = catalog.loyalty() else {
        return Ok(candidates);
    };

    if let Some(plan) = full_points_plan(order, loyalty)? {
        let points = plan.total()?;

        candidates.push(Candidate {
            order_idx,
            limit_used: points,
            plan,
            partial_points_eligible: true,
        });
    }

    let plan = partial_points_plan(order, loyalty, default_method, policy)?;

    candidates.push(Candidate {
        order_idx,
        limit_used: *plan.discount(),
        plan,
        partial_points_eligible: partial_points_allowed(order, catalog, policy),
    });

    Ok(candidates)
}

/// Candidates for every order, in input order.
///
/// # Errors
///
/// Returns a [`DiscountError`] if any discount cannot be computed.
pub fn generate_candidates<'a>(
    orders: &[Order<'a>],
    catalog: &MethodCatalog<'_>,
    default_method: &PaymentMethod<'_>,
    policy: &AllocationPolicy,
) -> Result<Vec<Candidate<'a>>, DiscountError> {
    let mut candidates = Vec::with_capacity(orders.len() * 3);

    for (order_idx, order) in orders.iter().enumerate() {
        candidates.extend(order_candidates(
            order_idx,
            order,
            catalog,
            default_method,
            policy,
        )?);
    }

    Ok(candidates)
}

/// Sort candidates by limit used, largest first. Equal keys keep input order.
pub fn rank_candidates(candidates: &mut [Candidate<'_>]) {
    candidates.sort_by(|a, b| {
        b.limit_used
            .to_minor_units()
            .cmp(&a.limit_used.to_minor_units())
    });
}
