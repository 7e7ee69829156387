//! Earlier-vs-recent period comparison

use super::{ensure_len, mean, two_sided_t_p_value, variance, ALPHA};
use crate::data::Polarity;
use crate::error::{Result, RevenueError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonStatus {
    Improvement,
    Decline,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub earlier_mean: f64,
    pub recent_mean: f64,
    pub earlier_len: usize,
    pub recent_len: usize,
    /// Change of the recent mean over the earlier mean, in percent
    pub pct_change: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub status: ComparisonStatus,
    pub interpretation: String,
}

/// Split off the last `recent` observations and run a pooled-variance t-test
pub fn compare_periods(values: &[f64], recent: usize, polarity: Polarity) -> Result<PeriodComparison> {
    ensure_len(values, 4)?;
    if recent < 2 || recent > values.len() - 2 {
        return Err(RevenueError::invalid_parameter(
            "recent",
            recent,
            &format!("needs at least 2 observations on each side of {}", values.len()),
        ));
    }

    let (earlier, latest) = values.split_at(values.len() - recent);
    let n1 = earlier.len() as f64;
    let n2 = latest.len() as f64;
    let m1 = mean(earlier);
    let m2 = mean(latest);

    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * variance(earlier, 1) + (n2 - 1.0) * variance(latest, 1)) / df;
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    let diff = m1 - m2;
    let t_statistic = if se > 0.0 {
        diff / se
    } else if diff == 0.0 {
        0.0
    } else {
        diff.signum() * f64::INFINITY
    };
    let p_value = two_sided_t_p_value(t_statistic, df)?;

    let pct_change = if m1 != 0.0 { (m2 - m1) / m1 * 100.0 } else { 0.0 };
    let significant = p_value < ALPHA;

    let (status, interpretation) = if significant {
        let rose = m2 > m1;
        let status = match (rose, polarity) {
            (true, Polarity::HigherIsBetter) | (false, Polarity::LowerIsBetter) => {
                ComparisonStatus::Improvement
            }
            _ => ComparisonStatus::Decline,
        };
        let verb = if rose { "increase" } else { "decrease" };
        (status, format!("significant {} of {:.1}%", verb, pct_change.abs()))
    } else {
        (ComparisonStatus::Stable, "no significant change".to_string())
    };

    Ok(PeriodComparison {
        earlier_mean: m1,
        recent_mean: m2,
        earlier_len: earlier.len(),
        recent_len: latest.len(),
        pct_change,
        t_statistic,
        p_value,
        significant,
        status,
        interpretation,
    })
}
