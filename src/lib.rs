//! Handset Pricing - Monthly cost engine for carrier handset plans
//!
//! This library provides:
//! - Catalog snapshots of devices, plans, subsidies and pricing settings
//! - Canonical JSON, admin CSV and legacy catalog loading with validation
//! - A TTL-cached catalog repository with retries
//! - Installment amortization and plan fee discounts
//! - Subsidy-discount vs selective-contract comparison
//! - Parallel batch quoting for device list pages

pub mod catalog;
pub mod pricing;
pub mod quote;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, GlobalSettings, JoinType, BundleOption};
pub use pricing::{
    calculate, compare, CalculationError, CalculationInput, CalculationResult, ComparisonInput,
    ComparisonResult, ContractType, PricingEngine,
};
pub use quote::QuoteRunner;
