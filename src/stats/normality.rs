//! Normality tests
//!
//! Shapiro-Wilk follows Royston's (1992/1995) approximation for the weights
//! and the p-value; the Kolmogorov-Smirnov variant compares the standardised
//! sample against N(0, 1) and uses the asymptotic Kolmogorov distribution.

use super::{mean, sorted, std_dev, ALPHA};
use crate::error::{Result, RevenueError};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

/// Samples at or above this size use Kolmogorov-Smirnov instead of Shapiro-Wilk
pub const SHAPIRO_MAX_N: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalityMethod {
    ShapiroWilk,
    KolmogorovSmirnov,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityTest {
    pub method: NormalityMethod,
    pub statistic: f64,
    pub p_value: f64,
    /// p > 0.05
    pub is_normal: bool,
}

impl NormalityTest {
    fn new(method: NormalityMethod, statistic: f64, p_value: f64) -> Self {
        Self {
            method,
            statistic,
            p_value,
            is_normal: p_value > ALPHA,
        }
    }
}

/// Pick the test by sample size; `None` below three observations
pub fn normality_test(values: &[f64]) -> Result<Option<NormalityTest>> {
    if values.len() < 3 {
        return Ok(None);
    }
    if values.len() < SHAPIRO_MAX_N {
        shapiro_wilk(values).map(Some)
    } else {
        kolmogorov_smirnov(values).map(Some)
    }
}

fn standard_normal() -> Result<Normal> {
    Ok(Normal::new(0.0, 1.0)?)
}

fn poly(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Shapiro-Wilk W test (3 <= n < 5000)
pub fn shapiro_wilk(values: &[f64]) -> Result<NormalityTest> {
    let n = values.len();
    if n < 3 {
        return Err(RevenueError::InsufficientData { required: 3, got: n });
    }
    let x = sorted(values);
    let range = x[n - 1] - x[0];
    if range == 0.0 {
        return Ok(NormalityTest::new(NormalityMethod::ShapiroWilk, 1.0, 1.0));
    }

    let normal = standard_normal()?;
    let weights = shapiro_weights(n, &normal);

    let m = mean(&x);
    let ss: f64 = x.iter().map(|v| (v - m).powi(2)).sum();
    let numerator: f64 = weights.iter().zip(&x).map(|(a, v)| a * v).sum();
    let w = (numerator * numerator / ss).min(1.0);

    let p_value = shapiro_p_value(w, n, &normal);
    Ok(NormalityTest::new(NormalityMethod::ShapiroWilk, w, p_value))
}

fn shapiro_weights(n: usize, normal: &Normal) -> Vec<f64> {
    if n == 3 {
        let a = std::f64::consts::FRAC_1_SQRT_2;
        return vec![-a, 0.0, a];
    }

    let nf = n as f64;
    let m: Vec<f64> = (1..=n)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let mm: f64 = m.iter().map(|v| v * v).sum();
    let u = 1.0 / nf.sqrt();

    let c_n = m[n - 1] / mm.sqrt();
    let c_n1 = m[n - 2] / mm.sqrt();
    let a_n = c_n + poly(&[0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056], u);

    let mut a = vec![0.0; n];
    if n > 5 {
        let a_n1 = c_n1 + poly(&[0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633], u);
        let phi = (mm - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
            / (1.0 - 2.0 * a_n.powi(2) - 2.0 * a_n1.powi(2));
        for i in 2..(n - 2) {
            a[i] = m[i] / phi.sqrt();
        }
        a[0] = -a_n;
        a[1] = -a_n1;
        a[n - 2] = a_n1;
        a[n - 1] = a_n;
    } else {
        let phi = (mm - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * a_n.powi(2));
        for i in 1..(n - 1) {
            a[i] = m[i] / phi.sqrt();
        }
        a[0] = -a_n;
        a[n - 1] = a_n;
    }
    a
}

fn shapiro_p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    if w >= 1.0 {
        return 1.0;
    }
    let nf = n as f64;
    if n == 3 {
        let p = 6.0 / PI * (w.sqrt().asin() - 0.75f64.sqrt().asin());
        return p.clamp(0.0, 1.0);
    }

    let z = if n <= 11 {
        let gamma = poly(&[-2.273, 0.459], nf);
        let inner = gamma - (1.0 - w).ln();
        if inner <= 0.0 {
            return 0.0;
        }
        let mu = poly(&[0.5440, -0.39978, 0.025054, -0.0006714], nf);
        let sigma = poly(&[1.3822, -0.77857, 0.062767, -0.0020322], nf).exp();
        (-inner.ln() - mu) / sigma
    } else {
        let ln_n = nf.ln();
        let mu = poly(&[-1.5861, -0.31082, -0.083751, 0.0038915], ln_n);
        let sigma = poly(&[-0.4803, -0.082676, 0.0030302], ln_n).exp();
        ((1.0 - w).ln() - mu) / sigma
    };

    (1.0 - normal.cdf(z)).clamp(0.0, 1.0)
}

/// One-sample Kolmogorov-Smirnov test of the standardised sample against N(0, 1)
pub fn kolmogorov_smirnov(values: &[f64]) -> Result<NormalityTest> {
    let n = values.len();
    if n < 3 {
        return Err(RevenueError::InsufficientData { required: 3, got: n });
    }
    let sd = std_dev(values, 1);
    if sd == 0.0 {
        return Ok(NormalityTest::new(NormalityMethod::KolmogorovSmirnov, 0.0, 1.0));
    }
    let normal = standard_normal()?;
    let m = mean(values);
    let z = sorted(values);
    let nf = n as f64;

    let d = z
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let cdf = normal.cdf((v - m) / sd);
            let upper = (i + 1) as f64 / nf - cdf;
            let lower = cdf - i as f64 / nf;
            upper.max(lower)
        })
        .fold(0.0, f64::max);

    let sqrt_n = nf.sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;
    Ok(NormalityTest::new(
        NormalityMethod::KolmogorovSmirnov,
        d,
        kolmogorov_q(lambda),
    ))
}

/// Complementary Kolmogorov distribution Q(lambda)
fn kolmogorov_q(lambda: f64) -> f64 {
    if lambda < 1e-3 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let kf = k as f64;
        let term = sign * (-2.0 * kf * kf * lambda * lambda).exp();
        sum += term;
        if term.abs() < 1e-12 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_quantiles(n: usize) -> Vec<f64> {
        let normal = Normal::new(50.0, 5.0).unwrap();
        (1..=n)
            .map(|i| normal.inverse_cdf((i as f64 - 0.5) / n as f64))
            .collect()
    }

    #[test]
    fn test_shapiro_accepts_normal_quantiles() {
        let result = shapiro_wilk(&normal_quantiles(40)).unwrap();
        assert!(result.statistic > 0.97, "W = {}", result.statistic);
        assert!(result.is_normal, "p = {}", result.p_value);
    }

    #[test]
    fn test_shapiro_rejects_skewed_sample() {
        let values: Vec<f64> = (0..40).map(|i| (i as f64 / 4.0).exp()).collect();
        let result = shapiro_wilk(&values).unwrap();
        assert!(!result.is_normal, "p = {}", result.p_value);
        assert!(result.statistic < 0.9);
    }

    #[test]
    fn test_shapiro_small_samples() {
        let three = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((three.statistic - 1.0).abs() < 1e-9);
        let five = shapiro_wilk(&[2.1, 3.4, 1.9, 5.6, 4.0]).unwrap();
        assert!(five.statistic > 0.0 && five.statistic <= 1.0);
        assert!(five.p_value >= 0.0 && five.p_value <= 1.0);
    }

    #[test]
    fn test_shapiro_constant() {
        let result = shapiro_wilk(&[3.0; 10]).unwrap();
        assert!(result.is_normal);
    }

    #[test]
    fn test_ks_on_normal_quantiles() {
        let result = kolmogorov_smirnov(&normal_quantiles(6000)).unwrap();
        assert!(result.statistic < 0.02);
        assert!(result.is_normal);
    }

    #[test]
    fn test_selector_uses_ks_for_large_samples() {
        let test = normality_test(&normal_quantiles(5000)).unwrap().unwrap();
        assert_eq!(test.method, NormalityMethod::KolmogorovSmirnov);
        let test = normality_test(&normal_quantiles(100)).unwrap().unwrap();
        assert_eq!(test.method, NormalityMethod::ShapiroWilk);
        assert!(normality_test(&[1.0, 2.0]).unwrap().is_none());
    }

    #[test]
    fn test_kolmogorov_q_bounds() {
        assert_eq!(kolmogorov_q(0.0), 1.0);
        assert!(kolmogorov_q(3.0) < 1e-6);
        assert!((kolmogorov_q(1.36) - 0.05).abs() < 0.01);
    }
}
