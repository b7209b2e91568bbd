//! Monthly plan fee after contract and bundle discounts

use super::types::ContractType;
use crate::catalog::{BundleDiscountBase, BundleOption, GlobalSettings};
use serde::Serialize;

/// Float noise allowance when flooring `amount * rate`
const FLOOR_EPSILON: f64 = 1e-9;

/// Plan fee components for one contract type and bundle option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeeBreakdown {
    pub base_fee: u64,
    pub plan_discount: u64,
    pub bundle_discount: u64,
    pub monthly_fee: u64,
}

/// floor(amount * rate), tolerant of products like 1_300 * 0.35 landing just under an integer
pub fn discount_amount(amount: u64, rate: f64) -> u64 {
    if rate <= 0.0 || !rate.is_finite() {
        return 0;
    }
    let raw = (amount as f64 * rate + FLOOR_EPSILON).floor();
    (raw as u64).min(amount)
}

/// Compute the monthly plan fee.
///
/// The selective-contract discount applies only under [`ContractType::SelectiveContract`].
/// The bundle discount base follows `settings.bundle_discount_base`; both discounts are
/// subtracted from the base fee and the result is floored at 0.
pub fn plan_fee(
    base_price: u64,
    contract_type: ContractType,
    bundle: BundleOption,
    settings: &GlobalSettings,
) -> PlanFeeBreakdown {
    let plan_discount = match contract_type {
        ContractType::SelectiveContract => discount_amount(base_price, settings.selective_discount_rate),
        ContractType::SubsidyDiscount => 0,
    };

    let bundle_base = match settings.bundle_discount_base {
        BundleDiscountBase::BasePrice => base_price,
        BundleDiscountBase::AfterSelectiveDiscount => base_price - plan_discount,
    };
    let bundle_discount = discount_amount(bundle_base, settings.bundle_discount_rates.rate(bundle));

    let monthly_fee = base_price
        .saturating_sub(plan_discount)
        .saturating_sub(bundle_discount);

    PlanFeeBreakdown {
        base_fee: base_price,
        plan_discount,
        bundle_discount,
        monthly_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsidy_discount_pays_full_fee() {
        let settings = GlobalSettings::default();
        let fee = plan_fee(109_000, ContractType::SubsidyDiscount, BundleOption::None, &settings);

        assert_eq!(fee.plan_discount, 0);
        assert_eq!(fee.bundle_discount, 0);
        assert_eq!(fee.monthly_fee, 109_000);
    }

    #[test]
    fn test_selective_discount_is_floored_quarter() {
        let settings = GlobalSettings::default();
        for base in [109_000, 69_000, 55_000, 33_333, 99_999, 1] {
            let fee = plan_fee(base, ContractType::SelectiveContract, BundleOption::None, &settings);
            assert_eq!(fee.plan_discount, base / 4, "base {}", base);
            assert_eq!(fee.monthly_fee, base - base / 4);
        }

        let fee = plan_fee(109_000, ContractType::SelectiveContract, BundleOption::None, &settings);
        assert_eq!(fee.plan_discount, 27_250);
        assert_eq!(fee.monthly_fee, 81_750);
    }

    #[test]
    fn test_bundle_discount_off_base_price() {
        let settings = GlobalSettings::default();
        let fee = plan_fee(109_000, ContractType::SelectiveContract, BundleOption::Internet, &settings);

        // 10% of the undiscounted 109,000, not of 81,750
        assert_eq!(fee.bundle_discount, 10_900);
        assert_eq!(fee.monthly_fee, 109_000 - 27_250 - 10_900);

        let fee = plan_fee(109_000, ContractType::SubsidyDiscount, BundleOption::InternetTv, &settings);
        assert_eq!(fee.bundle_discount, 16_350);
        assert_eq!(fee.monthly_fee, 92_650);
    }

    #[test]
    fn test_bundle_discount_after_selective_policy() {
        let settings = GlobalSettings {
            bundle_discount_base: BundleDiscountBase::AfterSelectiveDiscount,
            ..GlobalSettings::default()
        };
        let fee = plan_fee(109_000, ContractType::SelectiveContract, BundleOption::Internet, &settings);

        // 10% of 81,750 = 8,175
        assert_eq!(fee.bundle_discount, 8_175);
        assert_eq!(fee.monthly_fee, 73_575);
    }

    #[test]
    fn test_fee_floored_at_zero() {
        let settings = GlobalSettings {
            selective_discount_rate: 0.7,
            bundle_discount_rates: crate::catalog::BundleDiscountRates {
                none: 0.0,
                internet: 0.5,
                internet_tv: 0.6,
            },
            ..GlobalSettings::default()
        };
        let fee = plan_fee(50_000, ContractType::SelectiveContract, BundleOption::InternetTv, &settings);

        assert_eq!(fee.plan_discount, 35_000);
        assert_eq!(fee.bundle_discount, 30_000);
        assert_eq!(fee.monthly_fee, 0);
    }

    #[test]
    fn test_discount_amount_float_noise() {
        // 1_300 * 0.35 is 454.99999999999994 in binary floating point
        assert_eq!(discount_amount(1_300, 0.35), 455);
        assert_eq!(discount_amount(33_000, 0.1), 3_300);
        assert_eq!(discount_amount(33_009, 0.1), 3_300);
        assert_eq!(discount_amount(1_000, 0.0), 0);
        assert_eq!(discount_amount(1_000, f64::NAN), 0);
    }
}
