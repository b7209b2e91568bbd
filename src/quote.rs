//! Batch quoting over one shared catalog snapshot
//!
//! Holds the catalog once and prices many selections in parallel without reloading it.

use crate::catalog::{BundleOption, Catalog, JoinType};
use crate::pricing::{
    CalculationError, CalculationInput, CalculationResult, ComparisonInput, ComparisonResult,
    ContractType, PricingEngine,
};
use rayon::prelude::*;
use std::sync::Arc;

/// Pre-loaded quote runner
///
/// # Example
/// ```ignore
/// let runner = QuoteRunner::new(Arc::new(load_default_catalog()?));
/// let rows = runner.device_list("5g-premium", JoinType::Change, ContractType::SelectiveContract, 24, BundleOption::None)?;
/// ```
#[derive(Debug, Clone)]
pub struct QuoteRunner {
    catalog: Arc<Catalog>,
}

impl QuoteRunner {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Price one selection
    pub fn quote(&self, input: &CalculationInput) -> Result<CalculationResult, CalculationError> {
        PricingEngine::new(&self.catalog).calculate(input)
    }

    /// Price many selections in parallel; one result per input, in input order
    pub fn quote_many(&self, inputs: &[CalculationInput]) -> Vec<Result<CalculationResult, CalculationError>> {
        let engine = PricingEngine::new(&self.catalog);
        inputs.par_iter().map(|input| engine.calculate(input)).collect()
    }

    /// Devices that can be priced on `plan_id` for `join_type`: exposed, with an exposed subsidy entry
    pub fn priceable_devices(&self, plan_id: &str, join_type: JoinType) -> Vec<&str> {
        let subsidies = self.catalog.subsidies().entries(join_type);
        self.catalog
            .devices()
            .iter()
            .filter(|d| d.exposed)
            .filter(|d| {
                subsidies
                    .iter()
                    .any(|e| e.exposed && e.matches(&d.id, plan_id))
            })
            .map(|d| d.id.as_str())
            .collect()
    }

    /// Price every priceable device on one plan, cheapest first (ties by device id)
    pub fn device_list(
        &self,
        plan_id: &str,
        join_type: JoinType,
        contract_type: ContractType,
        installment_months: i32,
        bundle_option: BundleOption,
    ) -> Result<Vec<CalculationResult>, CalculationError> {
        let engine = PricingEngine::new(&self.catalog);
        let mut results = self
            .priceable_devices(plan_id, join_type)
            .par_iter()
            .map(|device_id| {
                engine.calculate(&CalculationInput {
                    device_id: device_id.to_string(),
                    plan_id: plan_id.to_string(),
                    join_type,
                    contract_type,
                    installment_months,
                    bundle_option,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        results.sort_by(|a, b| {
            a.total_monthly
                .cmp(&b.total_monthly)
                .then_with(|| a.device_id.cmp(&b.device_id))
        });
        Ok(results)
    }

    /// Compare both contract types for every priceable device on one plan, in catalog order
    pub fn best_contract_per_device(
        &self,
        plan_id: &str,
        join_type: JoinType,
        installment_months: i32,
        bundle_option: BundleOption,
    ) -> Result<Vec<ComparisonResult>, CalculationError> {
        let engine = PricingEngine::new(&self.catalog);
        self.priceable_devices(plan_id, join_type)
            .par_iter()
            .map(|device_id| {
                engine.compare(&ComparisonInput {
                    device_id: device_id.to_string(),
                    plan_id: plan_id.to_string(),
                    join_type,
                    installment_months,
                    bundle_option,
                })
            })
            .collect()
    }
}
