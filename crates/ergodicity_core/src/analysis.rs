//! Statistics and closed-form growth rates for the two-outcome bet.
//!
//! The ensemble grows at the arithmetic expectation of the per-step factor,
//! while a single trajectory grows at its geometric expectation. When the two
//! disagree the process is non-ergodic.

/// Arithmetic mean, computed relative to the first value.
///
/// Identical inputs therefore yield that exact value, independent of count.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    let first = *values.first()?;
    let shift: f64 = values.iter().map(|v| v - first).sum();
    Some(first + shift / values.len() as f64)
}

/// Median of unsorted values
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    percentile_sorted(&sorted, 0.5)
}

/// Percentile of ascending values using linear interpolation between ranks.
///
/// `p` is a fraction in [0, 1]; out-of-range values are clamped.
#[must_use]
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = p.clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let weight = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * weight)
}

/// Distinct values with their multiplicity, ascending by value
#[must_use]
pub fn value_counts(values: &[f64]) -> Vec<(f64, usize)> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let mut counts: Vec<(f64, usize)> = Vec::new();
    for v in sorted {
        if let Some((last, n)) = counts.last_mut()
            && last.total_cmp(&v).is_eq()
        {
            *n += 1;
            continue;
        }
        counts.push((v, 1));
    }
    counts
}

/// Expected per-step wealth factor across the ensemble
#[must_use]
pub fn ensemble_growth_factor(leverage: f64, gain_pct: f64, loss_pct: f64, gain_probability: f64) -> f64 {
    1.0 + leverage * (gain_probability * gain_pct - (1.0 - gain_probability) * loss_pct)
}

/// Per-step wealth factor experienced along a typical single trajectory.
///
/// `None` when an outcome wipes out (or inverts) the exposed wealth.
#[must_use]
pub fn time_average_growth_factor(
    leverage: f64,
    gain_pct: f64,
    loss_pct: f64,
    gain_probability: f64,
) -> Option<f64> {
    let up = 1.0 + leverage * gain_pct;
    let down = 1.0 - leverage * loss_pct;
    if up <= 0.0 || down <= 0.0 {
        return None;
    }
    Some(up.powf(gain_probability) * down.powf(1.0 - gain_probability))
}

/// Leverage maximizing the time-average growth rate (Kelly fraction)
#[must_use]
pub fn optimal_leverage(gain_pct: f64, loss_pct: f64, gain_probability: f64) -> Option<f64> {
    if gain_pct <= 0.0 || loss_pct <= 0.0 {
        return None;
    }
    Some(gain_probability / loss_pct - (1.0 - gain_probability) / gain_pct)
}
