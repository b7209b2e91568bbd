//! Monthly price calculation
//!
//! Each stage is a pure function over a validated [`Catalog`](crate::catalog::Catalog):
//!
//! - [`subsidy::resolve_subsidy`] finds the exact (device, plan, join type) entry
//! - [`amortize::amortize`] turns the remaining principal into a rounded installment
//! - [`plan_fee::plan_fee`] applies the selective-contract and bundle discounts
//! - [`engine::PricingEngine`] wires them together and compares contract types

pub mod amortize;
pub mod engine;
pub mod error;
pub mod plan_fee;
pub mod subsidy;
pub mod types;

pub use amortize::{amortize, monthly_payment};
pub use engine::{calculate, compare, PricingEngine};
pub use error::{CalculationError, Missing};
pub use plan_fee::{discount_amount, plan_fee, PlanFeeBreakdown};
pub use subsidy::resolve_subsidy;
pub use types::{
    CalculationInput, CalculationResult, ComparisonInput, ComparisonResult, ContractBreakdown,
    ContractType, RawCalculationInput,
};
