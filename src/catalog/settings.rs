//! Global pricing settings shared by every calculation
//!
//! A single immutable [`GlobalSettings`] value travels with each catalog snapshot and is
//! passed explicitly into the amortization and plan fee calculators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tolerance for float noise when snapping a computed amount to a rounding boundary
const ROUNDING_EPSILON: f64 = 1e-9;

fn default_comparison_horizon() -> u32 {
    24
}

/// How a monthly amount is snapped to the rounding unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundingPolicy {
    /// Nearest multiple, halves away from zero
    #[default]
    HalfUp,
    /// Truncate down to the unit
    Floor,
    /// Raise to the next unit
    Ceil,
}

/// Rounding unit plus policy, applied to monthly installments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rounding {
    pub unit: u64,
    pub policy: RoundingPolicy,
}

impl Rounding {
    pub fn new(unit: u64, policy: RoundingPolicy) -> Self {
        Self { unit, policy }
    }

    /// Round a non-negative amount to a multiple of the unit.
    /// Negative and non-finite inputs collapse to 0.
    pub fn apply(&self, value: f64) -> u64 {
        if !value.is_finite() || value <= 0.0 {
            return 0;
        }

        let unit = self.unit.max(1) as f64;
        let units = value / unit;
        let snapped = match self.policy {
            RoundingPolicy::HalfUp => (units + 0.5).floor(),
            RoundingPolicy::Floor => (units + ROUNDING_EPSILON).floor(),
            RoundingPolicy::Ceil => (units - ROUNDING_EPSILON).ceil(),
        };

        (snapped.max(0.0) * unit) as u64
    }
}

/// Which amount the bundle discount rate is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BundleDiscountBase {
    /// Undiscounted plan base price; independent of the selective discount
    #[default]
    BasePrice,
    /// Plan price after the selective-contract discount
    AfterSelectiveDiscount,
}

/// Home internet / TV bundling option chosen by the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BundleOption {
    #[default]
    None,
    Internet,
    InternetTv,
}

impl BundleOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleOption::None => "none",
            BundleOption::Internet => "internet",
            BundleOption::InternetTv => "internetTv",
        }
    }
}

impl fmt::Display for BundleOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BundleOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(BundleOption::None),
            "internet" => Ok(BundleOption::Internet),
            "internetTv" => Ok(BundleOption::InternetTv),
            other => Err(format!("Unknown bundle option: {}", other)),
        }
    }
}

/// Bundle discount rates by option (fractions of the plan fee)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDiscountRates {
    #[serde(default)]
    pub none: f64,
    pub internet: f64,
    pub internet_tv: f64,
}

impl BundleDiscountRates {
    pub fn rate(&self, option: BundleOption) -> f64 {
        match option {
            BundleOption::None => self.none,
            BundleOption::Internet => self.internet,
            BundleOption::InternetTv => self.internet_tv,
        }
    }
}

impl Default for BundleDiscountRates {
    fn default() -> Self {
        Self {
            none: 0.0,
            internet: 0.10,
            internet_tv: 0.15,
        }
    }
}

/// Global pricing settings for a catalog snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Annual interest rate charged on the installment principal
    pub annual_interest_rate: f64,

    /// Monthly installments are rounded to a multiple of this (e.g. 10 or 100)
    pub rounding_unit: u64,

    #[serde(default)]
    pub rounding_policy: RoundingPolicy,

    /// Plan fee discount rate under a selective contract
    pub selective_discount_rate: f64,

    pub bundle_discount_rates: BundleDiscountRates,

    #[serde(default)]
    pub bundle_discount_base: BundleDiscountBase,

    /// Installment terms offered on the storefront; 0 means cash purchase
    pub allowed_installment_months: Vec<i32>,

    /// Months used to total the cost of a cash purchase when comparing contracts
    #[serde(default = "default_comparison_horizon")]
    pub comparison_horizon_months: u32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            annual_interest_rate: 0.059,   // 5.9% installment interest
            rounding_unit: 10,
            rounding_policy: RoundingPolicy::HalfUp,
            selective_discount_rate: 0.25, // 25% selective contract discount
            bundle_discount_rates: BundleDiscountRates::default(),
            bundle_discount_base: BundleDiscountBase::BasePrice,
            allowed_installment_months: vec![0, 12, 24, 36],
            comparison_horizon_months: default_comparison_horizon(),
        }
    }
}

impl GlobalSettings {
    pub fn rounding(&self) -> Rounding {
        Rounding::new(self.rounding_unit, self.rounding_policy)
    }

    pub fn allows_installment_months(&self, months: i32) -> bool {
        self.allowed_installment_months.contains(&months)
    }

    /// Check the settings can drive a calculation.
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let rate = self.annual_interest_rate;
        if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
            return Err(format!("annualInterestRate must be in [0, 1), got {}", rate));
        }

        if self.rounding_unit == 0 {
            return Err("roundingUnit must be positive".to_string());
        }

        check_fraction("selectiveDiscountRate", self.selective_discount_rate)?;
        check_fraction("bundleDiscountRates.none", self.bundle_discount_rates.none)?;
        check_fraction("bundleDiscountRates.internet", self.bundle_discount_rates.internet)?;
        check_fraction("bundleDiscountRates.internetTv", self.bundle_discount_rates.internet_tv)?;

        if self.allowed_installment_months.is_empty() {
            return Err("allowedInstallmentMonths must not be empty".to_string());
        }
        if let Some(m) = self.allowed_installment_months.iter().find(|m| **m < 0) {
            return Err(format!("allowedInstallmentMonths contains negative term {}", m));
        }

        if self.comparison_horizon_months == 0 {
            return Err("comparisonHorizonMonths must be positive".to_string());
        }

        Ok(())
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be in [0, 1], got {}", name, value))
    }
}
