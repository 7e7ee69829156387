//! Table-level summaries: seasonality and loss-ratio discipline

use crate::data::{MonthlyRecord, MonthlyTable};
use crate::error::{Result, RevenueError};
use crate::stats::mean;
use serde::{Deserialize, Serialize};

/// Averages for one calendar month across all years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthProfile {
    pub month: u32,
    pub observations: usize,
    pub revenue: f64,
    pub attendance: f64,
    pub realized_loss_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProfile {
    /// Calendar months present in the table, January first
    pub months: Vec<MonthProfile>,
}

impl SeasonalProfile {
    pub fn strongest_month(&self) -> Option<&MonthProfile> {
        self.months.iter().max_by(|a, b| a.revenue.total_cmp(&b.revenue))
    }

    pub fn weakest_month(&self) -> Option<&MonthProfile> {
        self.months.iter().min_by(|a, b| a.revenue.total_cmp(&b.revenue))
    }
}

pub fn seasonal_profile(table: &MonthlyTable) -> Result<SeasonalProfile> {
    if table.is_empty() {
        return Err(RevenueError::InsufficientData { required: 1, got: 0 });
    }
    let months = (1..=12u32)
        .filter_map(|month| {
            let rows: Vec<&MonthlyRecord> = table.iter().filter(|r| r.month == month).collect();
            if rows.is_empty() {
                return None;
            }
            Some(MonthProfile {
                month,
                observations: rows.len(),
                revenue: month_mean(&rows, |r| r.revenue),
                attendance: month_mean(&rows, |r| r.attendance as f64),
                realized_loss_ratio: month_mean(&rows, |r| r.realized_loss_ratio),
            })
        })
        .collect();
    Ok(SeasonalProfile { months })
}

fn month_mean(rows: &[&MonthlyRecord], field: impl Fn(&MonthlyRecord) -> f64) -> f64 {
    mean(&rows.iter().map(|r| field(r)).collect::<Vec<_>>())
}

/// How often the realized loss ratio met its target and how far it ran from budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossRatioSummary {
    pub months: usize,
    pub within_target: usize,
    pub pct_within_target: f64,
    pub mean_realized: f64,
    pub mean_budgeted: f64,
    /// Mean of realized minus budgeted, in percentage points
    pub mean_deviation: f64,
    pub min: f64,
    pub max: f64,
}

pub fn loss_ratio_summary(table: &MonthlyTable, target: f64) -> Result<LossRatioSummary> {
    if table.is_empty() {
        return Err(RevenueError::InsufficientData { required: 1, got: 0 });
    }
    let realized: Vec<f64> = table.iter().map(|r| r.realized_loss_ratio).collect();
    let budgeted: Vec<f64> = table.iter().map(|r| r.budgeted_loss_ratio).collect();
    let deviation: Vec<f64> = realized.iter().zip(&budgeted).map(|(r, b)| r - b).collect();
    let within_target = realized.iter().filter(|&&v| v <= target).count();

    Ok(LossRatioSummary {
        months: realized.len(),
        within_target,
        pct_within_target: within_target as f64 / realized.len() as f64 * 100.0,
        mean_realized: mean(&realized),
        mean_budgeted: mean(&budgeted),
        mean_deviation: mean(&deviation),
        min: realized.iter().copied().fold(f64::INFINITY, f64::min),
        max: realized.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}
