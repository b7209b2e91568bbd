//! Calculation inputs and results

use super::error::CalculationError;
use crate::catalog::{BundleOption, JoinType, SubsidyEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the carrier discount is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractType {
    /// Full device subsidy, full-price plan
    SubsidyDiscount,
    /// Reduced device subsidy, percentage-discounted plan fee
    SelectiveContract,
}

impl ContractType {
    /// Preference order for ties: subsidy discount first
    pub const ALL: [ContractType; 2] = [ContractType::SubsidyDiscount, ContractType::SelectiveContract];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::SubsidyDiscount => "subsidyDiscount",
            ContractType::SelectiveContract => "selectiveContract",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subsidyDiscount" => Ok(ContractType::SubsidyDiscount),
            "selectiveContract" => Ok(ContractType::SelectiveContract),
            other => Err(format!("Unknown contract type: {}", other)),
        }
    }
}

/// A fully specified pricing request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    pub device_id: String,
    pub plan_id: String,
    pub join_type: JoinType,
    pub contract_type: ContractType,
    /// 0 for a cash purchase
    pub installment_months: i32,
    #[serde(default)]
    pub bundle_option: BundleOption,
}

impl CalculationInput {
    pub fn without_contract(&self) -> ComparisonInput {
        ComparisonInput {
            device_id: self.device_id.clone(),
            plan_id: self.plan_id.clone(),
            join_type: self.join_type,
            installment_months: self.installment_months,
            bundle_option: self.bundle_option,
        }
    }
}

/// A pricing request with the contract type left open, for [`compare`](super::compare)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonInput {
    pub device_id: String,
    pub plan_id: String,
    pub join_type: JoinType,
    pub installment_months: i32,
    #[serde(default)]
    pub bundle_option: BundleOption,
}

impl ComparisonInput {
    pub fn with_contract(&self, contract_type: ContractType) -> CalculationInput {
        CalculationInput {
            device_id: self.device_id.clone(),
            plan_id: self.plan_id.clone(),
            join_type: self.join_type,
            contract_type,
            installment_months: self.installment_months,
            bundle_option: self.bundle_option,
        }
    }
}

/// Untyped selection as it arrives from a form or query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCalculationInput {
    pub device_id: String,
    pub plan_id: String,
    pub join_type: String,
    pub contract_type: String,
    pub installment_months: i64,
    #[serde(default)]
    pub bundle_option: Option<String>,
}

impl TryFrom<RawCalculationInput> for CalculationInput {
    type Error = CalculationError;

    fn try_from(raw: RawCalculationInput) -> Result<Self, Self::Error> {
        let join_type = raw
            .join_type
            .parse::<JoinType>()
            .map_err(|msg| CalculationError::validation("joinType", msg))?;

        let contract_type = raw
            .contract_type
            .parse::<ContractType>()
            .map_err(|msg| CalculationError::validation("contractType", msg))?;

        let bundle_option = match raw.bundle_option.as_deref() {
            None | Some("") => BundleOption::None,
            Some(s) => s
                .parse::<BundleOption>()
                .map_err(|msg| CalculationError::validation("bundleOption", msg))?,
        };

        let installment_months = i32::try_from(raw.installment_months).map_err(|_| {
            CalculationError::validation(
                "installmentMonths",
                format!("{} is out of range", raw.installment_months),
            )
        })?;

        Ok(CalculationInput {
            device_id: raw.device_id,
            plan_id: raw.plan_id,
            join_type,
            contract_type,
            installment_months,
            bundle_option,
        })
    }
}

/// Subsidy and discount components, tagged by contract type.
///
/// Subsidy-discount amounts and selective-contract amounts never share a variant, so a
/// result for one contract type cannot carry the other's numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "contractType", rename_all = "camelCase")]
pub enum ContractBreakdown {
    #[serde(rename_all = "camelCase")]
    SubsidyDiscount {
        common_subsidy: u64,
        additional_subsidy: u64,
    },
    #[serde(rename_all = "camelCase")]
    SelectiveContract {
        select_subsidy: u64,
        /// Monthly plan fee discount
        plan_discount: u64,
    },
}

impl ContractBreakdown {
    /// Pick the subsidy components that apply under `contract_type`.
    /// The plan discount is filled in later by the plan fee calculator.
    pub fn from_entry(entry: &SubsidyEntry, contract_type: ContractType) -> Self {
        match contract_type {
            ContractType::SubsidyDiscount => ContractBreakdown::SubsidyDiscount {
                common_subsidy: entry.common_subsidy,
                additional_subsidy: entry.additional_subsidy,
            },
            ContractType::SelectiveContract => ContractBreakdown::SelectiveContract {
                select_subsidy: entry.select_subsidy,
                plan_discount: 0,
            },
        }
    }

    pub fn contract_type(&self) -> ContractType {
        match self {
            ContractBreakdown::SubsidyDiscount { .. } => ContractType::SubsidyDiscount,
            ContractBreakdown::SelectiveContract { .. } => ContractType::SelectiveContract,
        }
    }

    /// Device subsidy applied against the list price; `None` on overflow
    pub fn applied_subsidy(&self) -> Option<u64> {
        match *self {
            ContractBreakdown::SubsidyDiscount {
                common_subsidy,
                additional_subsidy,
            } => common_subsidy.checked_add(additional_subsidy),
            ContractBreakdown::SelectiveContract { select_subsidy, .. } => Some(select_subsidy),
        }
    }

    pub fn plan_discount(&self) -> u64 {
        match *self {
            ContractBreakdown::SubsidyDiscount { .. } => 0,
            ContractBreakdown::SelectiveContract { plan_discount, .. } => plan_discount,
        }
    }
}

/// Full monthly price breakdown for one selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub device_id: String,
    pub plan_id: String,
    pub join_type: JoinType,
    pub installment_months: u32,
    pub bundle_option: BundleOption,

    pub list_price: u64,

    #[serde(flatten)]
    pub contract: ContractBreakdown,

    pub applied_subsidy: u64,

    /// Device price financed over the term: max(0, list price - applied subsidy)
    pub principal: u64,
    pub monthly_installment: u64,

    pub plan_base_fee: u64,
    pub bundle_discount_amount: u64,
    pub monthly_plan_fee: u64,

    pub total_monthly: u64,
}

impl CalculationResult {
    pub fn contract_type(&self) -> ContractType {
        self.contract.contract_type()
    }

    /// Plan fee discount; always 0 under a subsidy-discount contract
    pub fn plan_discount(&self) -> u64 {
        self.contract.plan_discount()
    }

    /// Sum of all installments over the term; `None` on overflow
    pub fn total_installments(&self) -> Option<u64> {
        self.monthly_installment
            .checked_mul(u64::from(self.installment_months))
    }

    /// Installments paid beyond the principal. Can dip slightly below 0 when rounding
    /// trims more than the term's interest. Saturates at the `i64` bounds.
    pub fn total_interest(&self) -> i64 {
        let paid = i128::from(self.monthly_installment) * i128::from(self.installment_months);
        let interest = paid - i128::from(self.principal);
        i64::try_from(interest).unwrap_or(if interest < 0 { i64::MIN } else { i64::MAX })
    }

    /// Amount paid at purchase: the whole principal for a cash purchase
    pub fn upfront_payment(&self) -> u64 {
        if self.installment_months == 0 {
            self.principal
        } else {
            0
        }
    }

    /// Everything the customer pays over `months` of service; `None` on overflow
    pub fn total_cost_over(&self, months: u32) -> Option<u64> {
        self.total_monthly
            .checked_mul(u64::from(months))?
            .checked_add(self.upfront_payment())
    }
}

/// Both contract types priced side by side, with a recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Months the totals are taken over
    pub horizon_months: u32,

    pub subsidy_discount: CalculationResult,
    pub selective_contract: CalculationResult,

    pub subsidy_discount_total: u64,
    pub selective_contract_total: u64,

    pub recommended: ContractType,

    /// How much cheaper the recommended contract is over the horizon
    pub savings: u64,
}

impl ComparisonResult {
    pub fn result_for(&self, contract_type: ContractType) -> &CalculationResult {
        match contract_type {
            ContractType::SubsidyDiscount => &self.subsidy_discount,
            ContractType::SelectiveContract => &self.selective_contract,
        }
    }

    pub fn recommended_result(&self) -> &CalculationResult {
        self.result_for(self.recommended)
    }
}
