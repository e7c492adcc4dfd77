// fraud-core/src/runtime/psi.rs
// ============================================================================
// Module: Population Stability Index
// Description: Bucketed-histogram drift metric.
// Purpose: Pure PSI computation consumed by the monitor.
// Dependencies: none (pure)
// ============================================================================

//! ## Overview
//! The monitor splits a rolling buffer of observations at the midpoint and
//! computes PSI between the two halves (§4.6). This module is the pure
//! bucketing and summation; the monitor owns the rolling buffer itself.

/// Number of equal-width bins PSI buckets each half into (§4.6).
pub const PSI_BIN_COUNT: usize = 10;

/// Floor applied to per-bin probabilities to avoid `ln(0)` (§4.6).
const PROBABILITY_FLOOR: f64 = 1e-6;

/// Minimum observation count PSI requires (§4.6: "last N (>= 200)").
pub const PSI_MIN_OBSERVATIONS: usize = 200;

/// Computes the Population Stability Index between a reference and current
/// sample, bucketing both into [`PSI_BIN_COUNT`] equal-width bins over their
/// joint min/max.
///
/// Returns `0.0` when either sample is empty or the joint range is
/// degenerate (all values identical), since there is nothing to bucket.
#[must_use]
pub fn population_stability_index(reference: &[f64], current: &[f64]) -> f64 {
    if reference.is_empty() || current.is_empty() {
        return 0.0;
    }

    let all_values = reference.iter().chain(current.iter());
    let (min, max) = all_values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });

    if (max - min).abs() < f64::EPSILON {
        return 0.0;
    }

    let ref_hist = bucket(reference, min, max);
    let cur_hist = bucket(current, min, max);

    ref_hist
        .iter()
        .zip(cur_hist.iter())
        .map(|(&p_ref, &p_cur)| {
            let p_ref = p_ref.max(PROBABILITY_FLOOR);
            let p_cur = p_cur.max(PROBABILITY_FLOOR);
            (p_cur - p_ref) * (p_cur / p_ref).ln()
        })
        .sum()
}

/// Buckets `values` into [`PSI_BIN_COUNT`] equal-width bins over `[min, max]`
/// and returns per-bin probabilities.
fn bucket(values: &[f64], min: f64, max: f64) -> [f64; PSI_BIN_COUNT] {
    let mut counts = [0u32; PSI_BIN_COUNT];
    let width = (max - min) / PSI_BIN_COUNT as f64;
    for &value in values {
        let raw_index = ((value - min) / width).floor();
        #[expect(clippy::cast_possible_truncation, reason = "clamped into PSI_BIN_COUNT range below")]
        #[expect(clippy::cast_sign_loss, reason = "raw_index is clamped non-negative via max(0.0)")]
        let index = (raw_index.max(0.0) as usize).min(PSI_BIN_COUNT - 1);
        counts[index] += 1;
    }
    let total = values.len() as f64;
    let mut probabilities = [0.0; PSI_BIN_COUNT];
    for (bucket_index, count) in counts.iter().enumerate() {
        probabilities[bucket_index] = f64::from(*count) / total;
    }
    probabilities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_samples_have_near_zero_psi() {
        let sample: Vec<f64> = (0..300).map(|i| f64::from(i % 50)).collect();
        let psi = population_stability_index(&sample, &sample);
        assert!(psi < 1e-9, "psi was {psi}");
    }

    #[test]
    fn psi_is_non_negative() {
        let reference: Vec<f64> = (0..250).map(|i| f64::from(i)).collect();
        let current: Vec<f64> = (0..250).map(|i| f64::from(i) * 1.3 + 5.0).collect();
        assert!(population_stability_index(&reference, &current) >= 0.0);
    }

    #[test]
    fn shifted_distribution_has_higher_psi_than_identical() {
        let reference: Vec<f64> = (0..250).map(|i| f64::from(i % 40)).collect();
        let shifted: Vec<f64> = (0..250).map(|i| f64::from(i % 40) + 30.0).collect();
        let same = population_stability_index(&reference, &reference);
        let drifted = population_stability_index(&reference, &shifted);
        assert!(drifted > same);
    }
}
