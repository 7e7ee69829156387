//! Process capability indices (Cp, Cpk)

use super::{ensure_len, mean, std_dev};
use crate::error::{Result, RevenueError};
use serde::{Deserialize, Serialize};

/// Specification limits; at least one side must be set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecLimits {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl SpecLimits {
    pub fn two_sided(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn upper_only(upper: f64) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
        }
    }

    pub fn lower_only(lower: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower.map_or(true, |l| value >= l) && self.upper.map_or(true, |u| value <= u)
    }

    fn validate(&self) -> Result<()> {
        match (self.lower, self.upper) {
            (None, None) => Err(RevenueError::ValidationError(
                "at least one specification limit is required".to_string(),
            )),
            (Some(l), Some(u)) if l >= u => Err(RevenueError::invalid_parameter(
                "lower",
                l,
                "must be below the upper limit",
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityStatus {
    /// Cpk >= 1.33
    Excellent,
    /// Cpk >= 1.00
    Good,
    /// Cpk >= 0.67
    Marginal,
    Critical,
    /// Zero standard deviation
    NoVariation,
}

impl CapabilityStatus {
    pub fn from_cpk(cpk: f64) -> Self {
        if cpk >= 1.33 {
            CapabilityStatus::Excellent
        } else if cpk >= 1.0 {
            CapabilityStatus::Good
        } else if cpk >= 0.67 {
            CapabilityStatus::Marginal
        } else {
            CapabilityStatus::Critical
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            CapabilityStatus::Excellent => "capable process (excellent)",
            CapabilityStatus::Good => "adequate process (good)",
            CapabilityStatus::Marginal => "marginally capable process (attention)",
            CapabilityStatus::Critical => "incapable process (critical)",
            CapabilityStatus::NoVariation => "process without variation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityIndices {
    /// Potential capability; only defined for two-sided limits
    pub cp: Option<f64>,
    pub cpk: f64,
    pub cpu: Option<f64>,
    pub cpl: Option<f64>,
    pub mean: f64,
    /// Sample standard deviation (N - 1)
    pub std_dev: f64,
    pub status: CapabilityStatus,
    /// Observations inside the limits, in percent
    pub pct_within: f64,
}

pub fn process_capability(values: &[f64], limits: SpecLimits) -> Result<CapabilityIndices> {
    ensure_len(values, 2)?;
    limits.validate()?;

    let mean = mean(values);
    let sigma = std_dev(values, 1);
    let within = values.iter().filter(|&&v| limits.contains(v)).count();
    let pct_within = within as f64 / values.len() as f64 * 100.0;

    if sigma == 0.0 {
        return Ok(CapabilityIndices {
            cp: limits.lower.and(limits.upper).map(|_| f64::INFINITY),
            cpk: f64::INFINITY,
            cpu: limits.upper.map(|_| f64::INFINITY),
            cpl: limits.lower.map(|_| f64::INFINITY),
            mean,
            std_dev: 0.0,
            status: CapabilityStatus::NoVariation,
            pct_within,
        });
    }

    let cp = match (limits.lower, limits.upper) {
        (Some(l), Some(u)) => Some((u - l) / (6.0 * sigma)),
        _ => None,
    };
    let cpu = limits.upper.map(|u| (u - mean) / (3.0 * sigma));
    let cpl = limits.lower.map(|l| (mean - l) / (3.0 * sigma));
    let cpk = cpu.into_iter().chain(cpl).fold(f64::INFINITY, f64::min);

    Ok(CapabilityIndices {
        cp,
        cpk,
        cpu,
        cpl,
        mean,
        std_dev: sigma,
        status: CapabilityStatus::from_cpk(cpk),
        pct_within,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_process_cp_equals_cpk() {
        let values = [20.0, 30.0, 22.0, 28.0, 25.0, 24.0, 26.0];
        let result = process_capability(&values, SpecLimits::two_sided(0.0, 50.0)).unwrap();
        assert!((result.mean - 25.0).abs() < 1e-12);
        let cp = result.cp.unwrap();
        assert!((cp - result.cpk).abs() < 1e-9);
        assert_eq!(result.pct_within, 100.0);
    }

    #[test]
    fn test_off_center_penalised() {
        let values = [40.0, 42.0, 44.0, 46.0, 48.0];
        let result = process_capability(&values, SpecLimits::two_sided(0.0, 50.0)).unwrap();
        assert!(result.cpk < result.cp.unwrap());
        assert_eq!(result.status, CapabilityStatus::Critical);
    }

    #[test]
    fn test_zero_variation() {
        let result = process_capability(&[5.0; 6], SpecLimits::two_sided(0.0, 10.0)).unwrap();
        assert!(result.cpk.is_infinite());
        assert_eq!(result.cp, Some(f64::INFINITY));
        assert_eq!(result.status, CapabilityStatus::NoVariation);
    }

    #[test]
    fn test_upper_only() {
        let values = [45.0, 47.0, 49.0, 51.0, 48.0];
        let result = process_capability(&values, SpecLimits::upper_only(60.0)).unwrap();
        assert!(result.cp.is_none());
        assert!(result.cpl.is_none());
        assert_eq!(Some(result.cpk), result.cpu);
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(CapabilityStatus::from_cpk(1.33), CapabilityStatus::Excellent);
        assert_eq!(CapabilityStatus::from_cpk(1.0), CapabilityStatus::Good);
        assert_eq!(CapabilityStatus::from_cpk(0.67), CapabilityStatus::Marginal);
        assert_eq!(CapabilityStatus::from_cpk(0.5), CapabilityStatus::Critical);
    }

    #[test]
    fn test_limits_required() {
        let none = SpecLimits { lower: None, upper: None };
        assert!(process_capability(&[1.0, 2.0], none).is_err());
        assert!(process_capability(&[1.0, 2.0], SpecLimits::two_sided(5.0, 1.0)).is_err());
    }
}
