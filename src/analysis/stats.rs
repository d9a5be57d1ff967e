//! Numeric helpers shared by the analyzers
//!
//! All inputs are already free of gaps and NaN (see [`crate::TelemetryTable::numeric_column`]).

/// Consecutive differences `values[i] - values[i - 1]`; one shorter than the input
pub fn diffs(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Absolute consecutive differences
pub fn abs_diffs(values: &[f64]) -> Vec<f64> {
    diffs(values).into_iter().map(f64::abs).collect()
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Number of values satisfying `predicate`
pub fn count_where(values: &[f64], predicate: impl Fn(f64) -> bool) -> usize {
    values.iter().filter(|v| predicate(**v)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diffs() {
        assert_eq!(diffs(&[50.0, 75.0, 60.0, 85.0, 55.0]), vec![25.0, -15.0, 25.0, -30.0]);
        assert_eq!(abs_diffs(&[1.0, -2.0]), vec![3.0]);
        assert!(diffs(&[1.0]).is_empty());
    }

    #[test]
    fn test_extremes_and_mean() {
        let values = [3.0, -1.0, 4.0];
        assert_eq!(max(&values), Some(4.0));
        assert_eq!(min(&values), Some(-1.0));
        assert_eq!(mean(&values), Some(2.0));
        assert_eq!(max(&[]), None);
        assert_eq!(mean(&[]), None);
        assert_eq!(count_where(&values, |v| v > 0.0), 2);
    }
}
