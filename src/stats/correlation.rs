//! Pearson correlation screening

use super::{ensure_len, mean, two_sided_t_p_value};
use crate::data::{MonthlyTable, Variable};
use crate::error::{Result, RevenueError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Significance bucket of a correlation p-value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    /// p < 0.01
    High,
    /// p < 0.05
    Medium,
    Low,
}

impl Significance {
    pub fn from_p_value(p: f64) -> Self {
        if p < 0.01 {
            Significance::High
        } else if p < 0.05 {
            Significance::Medium
        } else {
            Significance::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationStrength {
    /// |r| >= 0.7
    Strong,
    Moderate,
}

/// A variable pair whose |r| reached the screening threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationFinding {
    pub first: String,
    pub second: String,
    pub r: f64,
    pub p_value: f64,
    pub significance: Significance,
    pub direction: CorrelationDirection,
    pub strength: CorrelationStrength,
}

/// Pearson correlation coefficient; 0 when either side has no variance
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(RevenueError::ShapeError {
            expected: format!("len = {}", x.len()),
            actual: format!("len = {}", y.len()),
        });
    }
    ensure_len(x, 2)?;
    ensure_len(y, 2)?;

    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return Ok(0.0);
    }
    Ok((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Pearson r with its two-sided p-value (t-test with n - 2 degrees of freedom)
pub fn pearson_test(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    let r = pearson(x, y)?;
    let n = x.len();
    if n < 3 {
        return Ok((r, 1.0));
    }
    if r.abs() >= 1.0 {
        return Ok((r, 0.0));
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    Ok((r, two_sided_t_p_value(t, df)?))
}

/// Square correlation matrix in the order of `columns`
pub fn correlation_matrix(columns: &[(&str, &[f64])]) -> Result<Vec<Vec<f64>>> {
    let k = columns.len();
    let mut matrix = vec![vec![0.0; k]; k];
    for i in 0..k {
        matrix[i][i] = 1.0;
        for j in (i + 1)..k {
            let r = pearson(columns[i].1, columns[j].1)?;
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    Ok(matrix)
}

/// Screen every pair of named columns, keeping |r| >= threshold, strongest first
pub fn screen_columns(columns: &[(&str, &[f64])], threshold: f64) -> Result<Vec<CorrelationFinding>> {
    let mut findings = Vec::new();
    for i in 0..columns.len() {
        for j in (i + 1)..columns.len() {
            let (first, x) = columns[i];
            let (second, y) = columns[j];
            let (r, p_value) = pearson_test(x, y)?;
            if r.abs() < threshold {
                continue;
            }
            findings.push(CorrelationFinding {
                first: first.to_string(),
                second: second.to_string(),
                r,
                p_value,
                significance: Significance::from_p_value(p_value),
                direction: if r > 0.0 {
                    CorrelationDirection::Positive
                } else {
                    CorrelationDirection::Negative
                },
                strength: if r.abs() >= 0.7 {
                    CorrelationStrength::Strong
                } else {
                    CorrelationStrength::Moderate
                },
            });
        }
    }
    findings.sort_by(|a, b| b.r.abs().partial_cmp(&a.r.abs()).unwrap_or(Ordering::Equal));
    Ok(findings)
}

/// Screen table variables (see [`Variable::CORRELATION_SET`] for the usual set)
pub fn screen_correlations(
    table: &MonthlyTable,
    variables: &[Variable],
    threshold: f64,
) -> Result<Vec<CorrelationFinding>> {
    let data: Vec<(Variable, Vec<f64>)> = variables.iter().map(|v| (*v, table.column(*v))).collect();
    let columns: Vec<(&str, &[f64])> = data.iter().map(|(v, c)| (v.name(), c.as_slice())).collect();
    screen_columns(&columns, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        let (r, p) = pearson_test(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!(p < 1e-10);
    }

    #[test]
    fn test_no_variance_is_zero() {
        let x = [1.0, 1.0, 1.0];
        let y = [1.0, 2.0, 3.0];
        assert_eq!(pearson(&x, &y).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_significance_buckets() {
        assert_eq!(Significance::from_p_value(0.001), Significance::High);
        assert_eq!(Significance::from_p_value(0.03), Significance::Medium);
        assert_eq!(Significance::from_p_value(0.2), Significance::Low);
    }

    #[test]
    fn test_screen_sorted_descending() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [1.1, 2.3, 2.8, 4.2, 4.9, 6.1];
        let c = [6.0, 4.0, 5.0, 2.0, 3.0, 1.0];
        let cols: Vec<(&str, &[f64])> = vec![("a", &a[..]), ("b", &b[..]), ("c", &c[..])];
        let findings = screen_columns(&cols, 0.5).unwrap();
        assert!(!findings.is_empty());
        for pair in findings.windows(2) {
            assert!(pair[0].r.abs() >= pair[1].r.abs());
        }
        assert_eq!(findings[0].first, "a");
        assert_eq!(findings[0].second, "b");
        assert_eq!(findings[0].strength, CorrelationStrength::Strong);
        assert!(findings.iter().any(|f| f.direction == CorrelationDirection::Negative));
    }
}
