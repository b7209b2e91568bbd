//! Equal-installment amortization of the device principal
//!
//! Monthly payment for principal `P`, monthly rate `r` and `n` months:
//!
//! ```text
//! payment = P * r * (1 + r)^n / ((1 + r)^n - 1)
//! ```
//!
//! With a zero rate the principal is split evenly. Either way the payment is snapped
//! to the catalog's rounding unit.

use super::error::CalculationError;
use crate::catalog::Rounding;

/// Unrounded monthly payment.
///
/// `months` must be positive and `annual_rate` finite and non-negative; see [`amortize`]
/// for the checked entry point.
pub fn monthly_payment(principal: u64, months: u32, annual_rate: f64) -> f64 {
    if months == 0 {
        return 0.0;
    }

    let principal = principal as f64;
    let n = months as f64;

    if annual_rate.abs() < 1e-12 {
        return principal / n;
    }

    let r = annual_rate / 12.0;
    let growth = (1.0 + r).powi(months as i32);
    principal * r * growth / (growth - 1.0)
}

/// Monthly installment for `principal` over `months`, rounded.
///
/// `months == 0` is a cash purchase and always costs 0 per month.
pub fn amortize(
    principal: u64,
    months: i32,
    annual_rate: f64,
    rounding: Rounding,
) -> Result<u64, CalculationError> {
    if months < 0 {
        return Err(CalculationError::InvalidArgument(format!(
            "installment term must not be negative, got {} months",
            months
        )));
    }
    if !annual_rate.is_finite() || annual_rate < 0.0 {
        return Err(CalculationError::InvalidArgument(format!(
            "annual interest rate must be a non-negative number, got {}",
            annual_rate
        )));
    }

    if months == 0 {
        return Ok(0);
    }

    let payment = monthly_payment(principal, months as u32, annual_rate);
    Ok(rounding.apply(payment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RoundingPolicy;
    use approx::assert_relative_eq;

    const RATE: f64 = 0.059;

    fn half_up() -> Rounding {
        Rounding::new(10, RoundingPolicy::HalfUp)
    }

    #[test]
    fn test_reference_installment() {
        // 850,000 over 24 months at 5.9%
        assert_relative_eq!(monthly_payment(850_000, 24, RATE), 37_634.229_78, epsilon = 1e-3);
        assert_eq!(amortize(850_000, 24, RATE, half_up()).unwrap(), 37_630);

        assert_relative_eq!(monthly_payment(1_200_000, 24, RATE), 53_130.677_34, epsilon = 1e-3);
        assert_eq!(amortize(1_200_000, 24, RATE, half_up()).unwrap(), 53_130);
    }

    #[test]
    fn test_other_terms() {
        assert_eq!(amortize(850_000, 12, RATE, half_up()).unwrap(), 73_120);
        assert_eq!(amortize(850_000, 36, RATE, half_up()).unwrap(), 25_820);
    }

    #[test]
    fn test_cash_purchase_is_zero() {
        for principal in [0, 1, 850_000, u64::from(u32::MAX)] {
            for rate in [0.0, RATE, 0.2] {
                assert_eq!(amortize(principal, 0, rate, half_up()).unwrap(), 0);
            }
        }
    }

    #[test]
    fn test_zero_rate_splits_evenly() {
        assert_relative_eq!(monthly_payment(1_200_000, 24, 0.0), 50_000.0);
        assert_eq!(amortize(1_200_000, 24, 0.0, half_up()).unwrap(), 50_000);

        // 1,000,000 / 36 = 27,777.78 -> 27,780
        assert_eq!(amortize(1_000_000, 36, 0.0, half_up()).unwrap(), 27_780);
        let floor = Rounding::new(10, RoundingPolicy::Floor);
        assert_eq!(amortize(1_000_000, 36, 0.0, floor).unwrap(), 27_770);
    }

    #[test]
    fn test_rounding_unit_respected() {
        let hundred = Rounding::new(100, RoundingPolicy::HalfUp);
        assert_eq!(amortize(850_000, 24, RATE, hundred).unwrap(), 37_600);

        let ceil = Rounding::new(100, RoundingPolicy::Ceil);
        assert_eq!(amortize(850_000, 24, RATE, ceil).unwrap(), 37_700);
    }

    #[test]
    fn test_zero_principal() {
        assert_eq!(amortize(0, 24, RATE, half_up()).unwrap(), 0);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(
            amortize(850_000, -12, RATE, half_up()),
            Err(CalculationError::InvalidArgument(_))
        ));
        assert!(matches!(
            amortize(850_000, 24, -0.01, half_up()),
            Err(CalculationError::InvalidArgument(_))
        ));
        assert!(matches!(
            amortize(850_000, 24, f64::NAN, half_up()),
            Err(CalculationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_interest_never_negative_with_ceil() {
        let ceil = Rounding::new(10, RoundingPolicy::Ceil);
        for principal in [1, 9, 10, 1_005, 99_999, 850_000, 2_229_700] {
            for months in [12, 24, 36] {
                for rate in [0.0, 0.01, RATE, 0.15] {
                    let payment = amortize(principal, months, rate, ceil).unwrap();
                    assert!(
                        payment * months as u64 >= principal,
                        "P={} n={} r={} payment={}",
                        principal,
                        months,
                        rate,
                        payment
                    );
                }
            }
        }
    }

    #[test]
    fn test_interest_never_negative_at_catalog_scale() {
        // Half-up and floor can trim up to one unit per month; catalog principals
        // carry far more interest than that.
        for policy in [RoundingPolicy::HalfUp, RoundingPolicy::Floor] {
            let rounding = Rounding::new(10, policy);
            let mut principal = 10_000;
            while principal <= 3_000_000 {
                for months in [12, 24, 36] {
                    let payment = amortize(principal, months, RATE, rounding).unwrap();
                    assert!(payment * months as u64 >= principal, "{:?} P={} n={}", policy, principal, months);
                }
                principal += 7_919;
            }
        }
    }

    #[test]
    fn test_longer_term_costs_more_in_total() {
        let total_12 = amortize(850_000, 12, RATE, half_up()).unwrap() * 12;
        let total_24 = amortize(850_000, 24, RATE, half_up()).unwrap() * 24;
        let total_36 = amortize(850_000, 36, RATE, half_up()).unwrap() * 36;

        assert!(total_12 < total_24);
        assert!(total_24 < total_36);
    }
}
