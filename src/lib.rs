//! Tender
//!
//! Tender assigns a batch of orders to payment methods (a loyalty points store
//! plus any number of cards), each with a spending limit and a discount, so that
//! the total discount is as large as the greedy ranking can make it without
//! ever overspending a method.

pub mod candidates;
pub mod discounts;
pub mod fixtures;
pub mod ledger;
pub mod methods;
pub mod orders;
pub mod plans;
pub mod policy;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod solvers;
