//! Temporal trend detection

use super::{ensure_len, mean, two_sided_t_p_value, ALPHA};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn describe(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "holding steady",
        }
    }
}

/// OLS fit of a series against its position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub p_value: f64,
    pub std_error: f64,
    /// Change from first to last observation, in percent (0 when the first is 0)
    pub pct_change: f64,
    pub significant: bool,
}

/// Regress `values` on 0..n and classify the slope at the 5% level
pub fn temporal_trend(values: &[f64]) -> Result<TrendResult> {
    ensure_len(values, 2)?;
    let n = values.len();
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let mx = mean(&x);
    let my = mean(values);

    let sxx: f64 = x.iter().map(|v| (v - mx).powi(2)).sum();
    let syy: f64 = values.iter().map(|v| (v - my).powi(2)).sum();
    let sxy: f64 = x.iter().zip(values).map(|(a, b)| (a - mx) * (b - my)).sum();

    let slope = sxy / sxx;
    let intercept = my - slope * mx;

    let (r, p_value, std_error) = if syy == 0.0 {
        (0.0, 1.0, 0.0)
    } else {
        let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
        if n < 3 {
            (r, 1.0, 0.0)
        } else {
            let df = (n - 2) as f64;
            let residual_ss = (syy - slope * sxy).max(0.0);
            let std_error = (residual_ss / df / sxx).sqrt();
            let p = if r.abs() >= 1.0 {
                0.0
            } else {
                two_sided_t_p_value(r * (df / (1.0 - r * r)).sqrt(), df)?
            };
            (r, p, std_error)
        }
    };

    let significant = p_value < ALPHA;
    let direction = if !significant {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    let first = values[0];
    let last = values[n - 1];
    let pct_change = if first != 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };

    Ok(TrendResult {
        direction,
        slope,
        intercept,
        r_squared: r * r,
        p_value,
        std_error,
        pct_change,
        significant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_series_is_stable() {
        let result = temporal_trend(&[5.0; 12]).unwrap();
        assert_eq!(result.direction, TrendDirection::Stable);
        assert!((result.p_value - 1.0).abs() < 1e-12);
        assert_eq!(result.slope, 0.0);
        assert_eq!(result.pct_change, 0.0);
    }

    #[test]
    fn test_increasing_series() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + 3.0 * i as f64 + if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let result = temporal_trend(&values).unwrap();
        assert_eq!(result.direction, TrendDirection::Increasing);
        assert!((result.slope - 3.0).abs() < 0.1);
        assert!(result.r_squared > 0.95);
        assert!(result.pct_change > 0.0);
    }

    #[test]
    fn test_decreasing_series() {
        let values: Vec<f64> = (0..15).map(|i| 50.0 - 2.0 * i as f64).collect();
        let result = temporal_trend(&values).unwrap();
        assert_eq!(result.direction, TrendDirection::Decreasing);
        assert!(result.p_value < 1e-6);
    }

    #[test]
    fn test_zero_first_value_guard() {
        let result = temporal_trend(&[0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(result.pct_change, 0.0);
    }

    #[test]
    fn test_too_short() {
        assert!(temporal_trend(&[1.0]).is_err());
    }
}
