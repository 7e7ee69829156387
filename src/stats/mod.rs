//! Statistical analysis library
//!
//! Pure, reentrant functions over raw slices or a [`MonthlyTable`]:
//! - [`correlation`] - Pearson screening with significance tests
//! - [`trend`] - OLS trend against the month index
//! - [`distribution`] - descriptive summary, Tukey outliers, normality
//! - [`comparison`] - earlier vs recent two-sample t-test
//! - [`capability`] - Cp / Cpk process-capability indices
//! - [`interval`] - residual prediction intervals and t-intervals of the mean
//!
//! [`MonthlyTable`]: crate::data::MonthlyTable

pub mod capability;
pub mod comparison;
pub mod correlation;
pub mod distribution;
pub mod interval;
pub mod normality;
pub mod trend;

pub use capability::{process_capability, CapabilityIndices, CapabilityStatus, SpecLimits};
pub use comparison::{compare_periods, ComparisonStatus, PeriodComparison};
pub use correlation::{
    correlation_matrix, pearson, pearson_test, screen_columns, screen_correlations,
    CorrelationDirection, CorrelationFinding, CorrelationStrength, Significance,
};
pub use distribution::{describe, DistributionSummary};
pub use interval::{
    mean_confidence_interval, prediction_interval, MeanConfidenceInterval, PredictionInterval,
    ValueDomain,
};
pub use normality::{kolmogorov_smirnov, normality_test, shapiro_wilk, NormalityMethod, NormalityTest};
pub use trend::{temporal_trend, TrendDirection, TrendResult};

use crate::error::{Result, RevenueError};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::cmp::Ordering;

/// Conventional significance level
pub const ALPHA: f64 = 0.05;

pub(crate) fn ensure_len(values: &[f64], required: usize) -> Result<()> {
    if values.len() < required {
        return Err(RevenueError::InsufficientData {
            required,
            got: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(RevenueError::ValidationError(
            "values must be finite".to_string(),
        ));
    }
    Ok(())
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Variance with `ddof` delta degrees of freedom (0 = population, 1 = sample)
pub fn variance(values: &[f64], ddof: usize) -> f64 {
    if values.len() <= ddof {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - ddof) as f64
}

pub fn std_dev(values: &[f64], ddof: usize) -> f64 {
    variance(values, ddof).sqrt()
}

pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Percentile with linear interpolation between closest ranks; `sorted` must be ascending
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (q.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
        }
    }
}

pub fn percentile(values: &[f64], q: f64) -> f64 {
    percentile_sorted(&sorted(values), q)
}

/// Two-sided p-value of a t statistic
pub(crate) fn two_sided_t_p_value(t: f64, df: f64) -> Result<f64> {
    if t.is_nan() {
        return Ok(1.0);
    }
    if t.is_infinite() {
        return Ok(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, df)?;
    Ok((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_matches_linear_interpolation() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&v, 25.0) - 1.75).abs() < 1e-12);
        assert!((percentile(&v, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&v, 75.0) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_variance_ddof() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&v, 0) - 2.0).abs() < 1e-12);
        assert!((variance(&v, 1) - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_t_p_value_symmetry() {
        let p1 = two_sided_t_p_value(2.0, 10.0).unwrap();
        let p2 = two_sided_t_p_value(-2.0, 10.0).unwrap();
        assert!((p1 - p2).abs() < 1e-12);
        assert!(p1 > 0.05 && p1 < 0.1);
        assert_eq!(two_sided_t_p_value(0.0, 10.0).unwrap(), 1.0);
    }
}
