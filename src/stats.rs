//! Pooled residual statistics.
//!
//! Residuals from every contributing dataset are concatenated before the
//! summary is taken, so larger datasets weigh proportionally more.

use serde::Serialize;

use crate::error::{CalibrationError, Result};

/// Summary of a pooled residual sequence (predicted − observed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonStatistics {
    pub median: f64,
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub stddev: f64,
    pub count: usize,
}

/// Element-wise `predicted - observed`.
pub fn residuals(context: &str, predicted: &[f64], observed: &[f64]) -> Result<Vec<f64>> {
    if predicted.len() != observed.len() {
        return Err(CalibrationError::shape(
            format!("{context}: predicted vs observed"),
            predicted.len(),
            observed.len(),
        ));
    }
    Ok(predicted.iter().zip(observed).map(|(p, o)| p - o).collect())
}

/// A (predicted, observed) pair from one dataset.
#[derive(Debug, Clone, Copy)]
pub struct ResidualPair<'a> {
    pub label: &'a str,
    pub predicted: &'a [f64],
    pub observed: &'a [f64],
}

/// Concatenate residuals of every pair, in the order given.
///
/// Pairs may differ in length from each other; each pair must match
/// internally.
pub fn pool_residuals(pairs: &[ResidualPair<'_>]) -> Result<Vec<f64>> {
    let mut pooled = Vec::with_capacity(pairs.iter().map(|p| p.predicted.len()).sum());
    for pair in pairs {
        pooled.extend(residuals(pair.label, pair.predicted, pair.observed)?);
    }
    Ok(pooled)
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

impl ComparisonStatistics {
    /// Summarise an already pooled residual sequence.
    pub fn from_residuals(context: &str, values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(CalibrationError::EmptySample {
                context: context.to_string(),
            });
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Ok(ComparisonStatistics {
            median: median(values),
            mean,
            stddev: variance.sqrt(),
            count: values.len(),
        })
    }

    /// Pool the pairs and summarise them.
    pub fn from_pairs(context: &str, pairs: &[ResidualPair<'_>]) -> Result<Self> {
        let pooled = pool_residuals(pairs)?;
        Self::from_residuals(context, &pooled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pooled_statistics_over_two_datasets() {
        let pairs = [
            ResidualPair {
                label: "A",
                predicted: &[1.0, 2.0, 3.0],
                observed: &[1.0, 1.0, 1.0],
            },
            ResidualPair {
                label: "B",
                predicted: &[5.0],
                observed: &[4.0],
            },
        ];
        assert_eq!(pool_residuals(&pairs).unwrap(), vec![0.0, 1.0, 2.0, 1.0]);

        let stats = ComparisonStatistics::from_pairs("test", &pairs).unwrap();
        assert_relative_eq!(stats.median, 1.0);
        assert_relative_eq!(stats.mean, 1.0);
        assert_relative_eq!(stats.stddev, 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn mismatched_pair_is_a_shape_error() {
        let pairs = [ResidualPair {
            label: "A",
            predicted: &[1.0, 2.0],
            observed: &[1.0],
        }];
        assert!(matches!(
            ComparisonStatistics::from_pairs("test", &pairs),
            Err(CalibrationError::InputShape { left: 2, right: 1, .. })
        ));
    }

    #[test]
    fn odd_length_median_takes_middle() {
        let stats = ComparisonStatistics::from_residuals("odd", &[3.0, -1.0, 10.0]).unwrap();
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let stats = ComparisonStatistics::from_residuals("one", &[0.25]).unwrap();
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.median, 0.25);
    }

    #[test]
    fn empty_pool_is_an_error() {
        assert_eq!(
            ComparisonStatistics::from_residuals("none", &[]),
            Err(CalibrationError::EmptySample {
                context: "none".into()
            })
        );
    }
}
