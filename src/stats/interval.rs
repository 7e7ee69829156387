//! Confidence and prediction intervals

use super::{ensure_len, mean, std_dev};
use crate::error::{Result, RevenueError};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// z quantile of a symmetric 95% normal interval
pub const Z_95: f64 = 1.96;

/// Valid range of a metric; intervals are clamped into it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueDomain {
    pub lower: f64,
    pub upper: f64,
}

impl ValueDomain {
    pub const PERCENTAGE: ValueDomain = ValueDomain {
        lower: 0.0,
        upper: 100.0,
    };
    pub const NON_NEGATIVE: ValueDomain = ValueDomain {
        lower: 0.0,
        upper: f64::INFINITY,
    };
    pub const UNBOUNDED: ValueDomain = ValueDomain {
        lower: f64::NEG_INFINITY,
        upper: f64::INFINITY,
    };

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}

/// Point estimate with a residual-based 95% band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInterval {
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
    /// Population standard deviation of the residuals
    pub std_error: f64,
    pub confidence_pct: f64,
}

/// Build `point +/- 1.96 * std(residuals)` clamped to `domain`
pub fn prediction_interval(point: f64, residuals: &[f64], domain: ValueDomain) -> Result<PredictionInterval> {
    ensure_len(residuals, 1)?;
    let std_error = std_dev(residuals, 0);
    let margin = Z_95 * std_error;
    Ok(PredictionInterval {
        point,
        lower: domain.clamp(point - margin),
        upper: domain.clamp(point + margin),
        std_error,
        confidence_pct: 95.0,
    })
}

/// Student-t confidence interval of a sample mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanConfidenceInterval {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    /// Standard error of the mean
    pub sem: f64,
    pub confidence: f64,
}

pub fn mean_confidence_interval(values: &[f64], confidence: f64) -> Result<MeanConfidenceInterval> {
    ensure_len(values, 2)?;
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(RevenueError::invalid_parameter(
            "confidence",
            confidence,
            "must lie strictly between 0 and 1",
        ));
    }
    let n = values.len() as f64;
    let m = mean(values);
    let sem = std_dev(values, 1) / n.sqrt();
    let dist = StudentsT::new(0.0, 1.0, n - 1.0)?;
    let margin = dist.inverse_cdf(0.5 + confidence / 2.0) * sem;
    Ok(MeanConfidenceInterval {
        mean: m,
        lower: m - margin,
        upper: m + margin,
        sem,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_interval_is_clamped() {
        let residuals = [-30.0, 25.0, -20.0, 35.0, -10.0];
        let interval = prediction_interval(95.0, &residuals, ValueDomain::PERCENTAGE).unwrap();
        assert!(interval.lower >= 0.0);
        assert_eq!(interval.upper, 100.0);
        assert!(interval.std_error > 0.0);

        let interval = prediction_interval(3.0, &residuals, ValueDomain::PERCENTAGE).unwrap();
        assert_eq!(interval.lower, 0.0);
        assert!(interval.upper <= 100.0);
    }

    #[test]
    fn test_symmetric_when_unclamped() {
        let residuals = [-1.0, 1.0, -1.0, 1.0];
        let interval = prediction_interval(50.0, &residuals, ValueDomain::UNBOUNDED).unwrap();
        assert!((interval.std_error - 1.0).abs() < 1e-12);
        assert!((interval.upper - 51.96).abs() < 1e-9);
        assert!((interval.lower - 48.04).abs() < 1e-9);
        assert_eq!(interval.confidence_pct, 95.0);
    }

    #[test]
    fn test_mean_confidence_interval() {
        let values = [9.0, 10.0, 11.0, 10.0, 9.5, 10.5];
        let ci = mean_confidence_interval(&values, 0.95).unwrap();
        assert!((ci.mean - 10.0).abs() < 1e-12);
        assert!(ci.lower < 10.0 && ci.upper > 10.0);
        assert!(((ci.upper - ci.mean) - (ci.mean - ci.lower)).abs() < 1e-9);
        assert!(mean_confidence_interval(&values, 1.5).is_err());
    }
}
