//! Order statistics and moments over sample slices.

use std::cmp::Ordering;

fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Median of a slice of samples.
///
/// Even-length inputs average the two middle values.
///
/// # Returns
///
/// * `Some(value)` - The median
/// * `None` - If samples is empty
///
/// # Examples
///
/// ```
/// use bruit_harness::stats::percentiles::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// assert_eq!(median(&[]), None);
/// ```
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let sorted = sorted(samples);
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Calculate percentile value from a slice of f64 samples.
///
/// Uses linear interpolation between nearest ranks.
///
/// # Arguments
///
/// * `samples` - Slice of samples (will be sorted internally)
/// * `p` - Percentile to calculate (0.0 to 100.0)
///
/// # Returns
///
/// * `Some(value)` - The percentile value
/// * `None` - If samples is empty or p is invalid
///
/// # Examples
///
/// ```
/// use bruit_harness::stats::percentiles::percentile;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(percentile(&data, 50.0), Some(3.0));
/// ```
pub fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    if samples.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }

    let sorted = sorted(samples);

    if sorted.len() == 1 {
        return Some(sorted[0]);
    }

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower_index = rank.floor() as usize;
    let upper_index = rank.ceil() as usize;

    if lower_index == upper_index {
        Some(sorted[lower_index])
    } else {
        let lower_value = sorted[lower_index];
        let upper_value = sorted[upper_index];
        let fraction = rank - lower_index as f64;
        Some(lower_value + fraction * (upper_value - lower_value))
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation (divides by `n`, not `n - 1`).
///
/// The outlier test scores every window element against the window itself,
/// so the population form is the one that matches the z-score definition.
///
/// # Examples
///
/// ```
/// use bruit_harness::stats::percentiles::population_std_dev;
///
/// let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert_eq!(population_std_dev(&data), Some(2.0));
/// ```
pub fn population_std_dev(samples: &[f64]) -> Option<f64> {
    let mean = mean(samples)?;
    let variance =
        samples.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_median_single_sample() {
        assert_eq!(median(&[42.0]), Some(42.0));
    }

    #[test]
    fn test_median_odd_length() {
        assert_eq!(median(&[5.0, 1.0, 3.0, 2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn test_median_even_length() {
        assert_eq!(median(&[1.0, 4.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_median_ignores_extreme_tail() {
        let samples = vec![100.0, 101.0, 99.0, 100.0, 10_000.0];
        assert_eq!(median(&samples), Some(100.0));
    }

    #[test]
    fn test_median_does_not_reorder_input() {
        let samples = vec![3.0, 1.0, 2.0];
        let _ = median(&samples);
        assert_eq!(samples, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_percentile_empty_samples() {
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_percentile_invalid_p() {
        let samples = vec![1.0, 2.0, 3.0];
        assert_eq!(percentile(&samples, -1.0), None);
        assert_eq!(percentile(&samples, 101.0), None);
    }

    #[test]
    fn test_percentile_with_interpolation() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

        let p25 = percentile(&samples, 25.0).unwrap();
        assert!((p25 - 3.25).abs() < 1e-10);

        let p95 = percentile(&samples, 95.0).unwrap();
        assert!((p95 - 9.55).abs() < 1e-10);
    }

    #[test]
    fn test_percentile_matches_median_on_odd_length() {
        let samples = vec![7.0, 1.0, 5.0, 3.0, 9.0];
        assert_eq!(percentile(&samples, 50.0), median(&samples));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }

    #[test]
    fn test_population_std_dev_known_values() {
        let samples = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(population_std_dev(&samples), Some(2.0));
    }

    #[test]
    fn test_population_std_dev_constant() {
        assert_eq!(population_std_dev(&[5.0; 9]), Some(0.0));
    }

    #[test]
    fn test_population_std_dev_empty() {
        assert_eq!(population_std_dev(&[]), None);
    }
}
