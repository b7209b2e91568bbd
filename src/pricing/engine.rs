//! Calculation orchestrator: validates a selection and assembles the price breakdown

use super::amortize::amortize;
use super::error::{CalculationError, Missing};
use super::plan_fee::plan_fee;
use super::subsidy::resolve_subsidy;
use super::types::{
    CalculationInput, CalculationResult, ComparisonInput, ComparisonResult, ContractBreakdown,
    ContractType,
};
use crate::catalog::{Catalog, Device, Plan};

/// Pricing engine bound to one catalog snapshot.
///
/// Holds no state of its own; every call reads only its input and the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> PricingEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Price one selection
    pub fn calculate(&self, input: &CalculationInput) -> Result<CalculationResult, CalculationError> {
        let settings = self.catalog.settings();

        // Validate before touching the catalog
        let months = self.validate_months(input.installment_months)?;

        let device = self.resolve_device(&input.device_id)?;
        let plan = self.resolve_plan(&input.plan_id)?;
        let entry = resolve_subsidy(
            self.catalog.subsidies(),
            &device.id,
            &plan.id,
            input.join_type,
        )?;

        let mut contract = ContractBreakdown::from_entry(entry, input.contract_type);
        let applied_subsidy = contract.applied_subsidy().ok_or_else(|| {
            CalculationError::DataIntegrity(format!(
                "subsidy total overflows for device '{}' on plan '{}'",
                device.id, plan.id
            ))
        })?;

        let principal = device.list_price.saturating_sub(applied_subsidy);
        let monthly_installment = amortize(
            principal,
            input.installment_months,
            settings.annual_interest_rate,
            settings.rounding(),
        )?;

        let fee = plan_fee(plan.base_price, input.contract_type, input.bundle_option, settings);
        if let ContractBreakdown::SelectiveContract { plan_discount, .. } = &mut contract {
            *plan_discount = fee.plan_discount;
        }

        let total_monthly = monthly_installment
            .checked_add(fee.monthly_fee)
            .ok_or_else(|| CalculationError::DataIntegrity("monthly total overflows".into()))?;

        log::debug!(
            "{} {} {} {} {}m: principal={} installment={} plan_fee={} total={}",
            device.id,
            plan.id,
            input.join_type,
            input.contract_type,
            months,
            principal,
            monthly_installment,
            fee.monthly_fee,
            total_monthly
        );

        Ok(CalculationResult {
            device_id: device.id.clone(),
            plan_id: plan.id.clone(),
            join_type: input.join_type,
            installment_months: months,
            bundle_option: input.bundle_option,
            list_price: device.list_price,
            contract,
            applied_subsidy,
            principal,
            monthly_installment,
            plan_base_fee: fee.base_fee,
            bundle_discount_amount: fee.bundle_discount,
            monthly_plan_fee: fee.monthly_fee,
            total_monthly,
        })
    }

    /// Price both contract types and recommend the cheaper over the installment term.
    ///
    /// Cash purchases are totalled over `comparison_horizon_months`. Ties go to the
    /// subsidy discount.
    pub fn compare(&self, input: &ComparisonInput) -> Result<ComparisonResult, CalculationError> {
        let subsidy_discount = self.calculate(&input.with_contract(ContractType::SubsidyDiscount))?;
        let selective_contract = self.calculate(&input.with_contract(ContractType::SelectiveContract))?;

        let horizon_months = match subsidy_discount.installment_months {
            0 => self.catalog.settings().comparison_horizon_months,
            months => months,
        };

        let subsidy_discount_total = horizon_total(&subsidy_discount, horizon_months)?;
        let selective_contract_total = horizon_total(&selective_contract, horizon_months)?;

        let (recommended, savings) = if selective_contract_total < subsidy_discount_total {
            (
                ContractType::SelectiveContract,
                subsidy_discount_total - selective_contract_total,
            )
        } else {
            (
                ContractType::SubsidyDiscount,
                selective_contract_total - subsidy_discount_total,
            )
        };

        log::debug!(
            "compare {} {} over {}m: subsidy={} selective={} -> {}",
            input.device_id,
            input.plan_id,
            horizon_months,
            subsidy_discount_total,
            selective_contract_total,
            recommended
        );

        Ok(ComparisonResult {
            horizon_months,
            subsidy_discount,
            selective_contract,
            subsidy_discount_total,
            selective_contract_total,
            recommended,
            savings,
        })
    }

    fn validate_months(&self, months: i32) -> Result<u32, CalculationError> {
        let settings = self.catalog.settings();
        if months < 0 || !settings.allows_installment_months(months) {
            return Err(CalculationError::validation(
                "installmentMonths",
                format!(
                    "{} is not an offered term (allowed: {:?})",
                    months, settings.allowed_installment_months
                ),
            ));
        }
        Ok(months as u32)
    }

    fn resolve_device(&self, id: &str) -> Result<&'a Device, CalculationError> {
        self.catalog
            .device(id)
            .filter(|d| d.exposed)
            .ok_or_else(|| CalculationError::NotFound(Missing::Device(id.to_string())))
    }

    fn resolve_plan(&self, id: &str) -> Result<&'a Plan, CalculationError> {
        self.catalog
            .plan(id)
            .filter(|p| p.exposed)
            .ok_or_else(|| CalculationError::NotFound(Missing::Plan(id.to_string())))
    }
}

fn horizon_total(result: &CalculationResult, months: u32) -> Result<u64, CalculationError> {
    result.total_cost_over(months).ok_or_else(|| {
        CalculationError::DataIntegrity(format!(
            "{} total for device '{}' over {} months overflows",
            result.contract_type(),
            result.device_id,
            months
        ))
    })
}

/// Price one selection against a catalog snapshot
pub fn calculate(input: &CalculationInput, catalog: &Catalog) -> Result<CalculationResult, CalculationError> {
    PricingEngine::new(catalog).calculate(input)
}

/// Price both contract types for a selection and recommend the cheaper
pub fn compare(input: &ComparisonInput, catalog: &Catalog) -> Result<ComparisonResult, CalculationError> {
    PricingEngine::new(catalog).compare(input)
}
