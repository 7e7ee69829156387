//! Descriptive distribution summary

use super::normality::{normality_test, NormalityTest};
use super::{ensure_len, mean, percentile_sorted, sorted, std_dev};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Location, spread, Tukey outliers and normality of a sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Coefficient of variation in percent (0 when the mean is 0)
    pub cv: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub min: f64,
    pub max: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub outlier_count: usize,
    pub outlier_pct: f64,
    /// `None` when the sample is too small to test
    pub normality: Option<NormalityTest>,
}

impl DistributionSummary {
    pub fn is_normal(&self) -> bool {
        self.normality.as_ref().map(|t| t.is_normal).unwrap_or(false)
    }
}

pub fn describe(values: &[f64]) -> Result<DistributionSummary> {
    ensure_len(values, 1)?;
    let s = sorted(values);
    let n = s.len();

    let mean = mean(&s);
    let std_dev = std_dev(&s, 0);
    let cv = if mean != 0.0 { std_dev / mean * 100.0 } else { 0.0 };

    let q1 = percentile_sorted(&s, 25.0);
    let q3 = percentile_sorted(&s, 75.0);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;
    let outlier_count = s.iter().filter(|&&v| v < lower_fence || v > upper_fence).count();

    Ok(DistributionSummary {
        count: n,
        mean,
        median: percentile_sorted(&s, 50.0),
        std_dev,
        cv,
        q1,
        q3,
        iqr,
        min: s[0],
        max: s[n - 1],
        lower_fence,
        upper_fence,
        outlier_count,
        outlier_pct: outlier_count as f64 / n as f64 * 100.0,
        normality: normality_test(values)?,
    })
}
