// SPDX-License-Identifier: MIT

//! Payment-processing fee calculator.
//!
//! Pure arithmetic, no I/O. Rounding is half-up to 2 decimal places applied
//! after *each* step: the fee is rounded first, then the sum is rounded.
//! Rounding once at the end gives different totals at the cent level for some
//! amounts, so the order here is part of the contract.

use crate::config::FeeConfig;

/// Round half-up (away from zero) to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Processing fee for a gross donation amount.
pub fn processing_fee(amount: f64, fees: &FeeConfig) -> f64 {
    round2(amount * fees.percentage_fee + fees.fixed_fee)
}

/// Total charged to the donor: amount plus processing fee.
pub fn total_with_fee(amount: f64, fees: &FeeConfig) -> f64 {
    round2(amount + processing_fee(amount, fees))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_fees() -> FeeConfig {
        FeeConfig::default()
    }

    #[test]
    fn test_reference_amounts() {
        let fees = default_fees();
        // 100 * 0.029 = 2.90, + 0.30 = 3.20
        assert_eq!(processing_fee(100.0, &fees), 3.20);
        assert_eq!(total_with_fee(100.0, &fees), 103.20);
    }

    #[test]
    fn test_zero_amount_pays_fixed_fee() {
        let fees = default_fees();
        assert_eq!(processing_fee(0.0, &fees), 0.30);
        assert_eq!(total_with_fee(0.0, &fees), 0.30);
    }

    #[test]
    fn test_sub_cent_rounding() {
        let fees = default_fees();
        // 10.01 * 0.029 = 0.29029, + 0.30 = 0.59029 -> 0.59
        assert_eq!(processing_fee(10.01, &fees), 0.59);
        assert_eq!(total_with_fee(10.01, &fees), 10.60);
    }

    #[test]
    fn test_fee_is_monotone_non_decreasing() {
        let fees = default_fees();
        let mut prev = processing_fee(0.0, &fees);
        for cents in 1..=10_000u32 {
            let amount = cents as f64 / 100.0;
            let fee = processing_fee(amount, &fees);
            assert!(
                fee >= prev,
                "fee decreased at amount {amount}: {fee} < {prev}"
            );
            prev = fee;
        }
    }

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(1.004), 1.0);
        assert_eq!(round2(1.995), 2.0);
    }
}
