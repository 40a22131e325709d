//! Descriptive kernels over plain value slices.
//!
//! All functions expect a non-empty slice; callers check for empty
//! selections first.

/// Arithmetic mean
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bias-corrected (n - 1) sample standard deviation; 0 for a single value
pub fn stdev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

/// Coefficient of variation, `stdev / mean`
pub fn cv(values: &[f64]) -> f64 {
    stdev(values) / mean(values)
}

/// Percentile `p` in `[0, 100]` of unsorted values
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Median, the 50th percentile
pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

/// Percentile of ascending values.
///
/// Estimator: position `p (n + 1) / 100`; positions below 1 give the minimum,
/// positions at or past `n` give the maximum, anything between interpolates
/// linearly between the neighbouring order statistics.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = p * (n as f64 + 1.0) / 100.0;
    if pos < 1.0 {
        return sorted[0];
    }
    if pos >= n as f64 {
        return sorted[n - 1];
    }
    let lower_index = pos.floor() as usize;
    let fraction = pos - pos.floor();
    let lower = sorted[lower_index - 1];
    let upper = sorted[lower_index];
    lower + fraction * (upper - lower)
}
