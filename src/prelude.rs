//! Tender prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    candidates::Candidate,
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError, parse_currency},
    ledger::{CapacityLedger, LedgerError},
    methods::{MethodCatalog, PaymentMethod},
    orders::Order,
    plans::{Charge, Plan, PlanKind},
    policy::{AllocationPolicy, DEFAULT_LOYALTY_METHOD_ID, PARTIAL_POINTS_PERCENT},
    receipt::{Receipt, ReceiptError},
    solvers::{Allocation, Solver, SolverError, greedy::GreedySolver},
};
