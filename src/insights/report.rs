//! One-shot statistical report over a table

use super::summary::{loss_ratio_summary, seasonal_profile, LossRatioSummary, SeasonalProfile};
use crate::config::BusinessTargets;
use crate::data::{MonthlyTable, Variable};
use crate::error::Result;
use crate::stats::{
    compare_periods, describe, mean_confidence_interval, process_capability, screen_correlations,
    temporal_trend, CapabilityIndices, CorrelationFinding, DistributionSummary, MeanConfidenceInterval,
    PeriodComparison, SpecLimits, TrendResult,
};
use serde::{Deserialize, Serialize};

/// Correlation screening threshold used by the dashboard
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.4;
/// Months compared against the rest of the series
pub const DEFAULT_RECENT_MONTHS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableTrend {
    pub variable: Variable,
    pub trend: TrendResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableComparison {
    pub variable: Variable,
    pub comparison: PeriodComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub correlations: Vec<CorrelationFinding>,
    pub trends: Vec<VariableTrend>,
    pub loss_ratio_distribution: DistributionSummary,
    pub revenue_distribution: DistributionSummary,
    /// Skipped when the table is too short to split
    pub comparisons: Vec<VariableComparison>,
    /// Loss ratio against [0, target]
    pub loss_ratio_capability: CapabilityIndices,
    pub loss_ratio_mean: MeanConfidenceInterval,
    pub loss_ratio_summary: LossRatioSummary,
    pub seasonality: SeasonalProfile,
}

const TREND_VARIABLES: [Variable; 5] = [
    Variable::Revenue,
    Variable::RealizedLossRatio,
    Variable::Nps,
    Variable::Attendance,
    Variable::AverageTicket,
];

const COMPARED_VARIABLES: [Variable; 2] = [Variable::RealizedLossRatio, Variable::Revenue];

pub fn analysis_report(
    table: &MonthlyTable,
    targets: &BusinessTargets,
    threshold: f64,
    recent: usize,
) -> Result<AnalysisReport> {
    let loss_ratio = table.column(Variable::RealizedLossRatio);

    let trends = TREND_VARIABLES
        .iter()
        .map(|&variable| {
            temporal_trend(&table.column(variable)).map(|trend| VariableTrend { variable, trend })
        })
        .collect::<Result<Vec<_>>>()?;

    let comparisons = if table.len() >= recent + 2 {
        COMPARED_VARIABLES
            .iter()
            .map(|&variable| {
                compare_periods(&table.column(variable), recent, variable.polarity())
                    .map(|comparison| VariableComparison { variable, comparison })
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        Vec::new()
    };

    Ok(AnalysisReport {
        correlations: screen_correlations(table, &Variable::CORRELATION_SET, threshold)?,
        trends,
        loss_ratio_distribution: describe(&loss_ratio)?,
        revenue_distribution: describe(&table.column(Variable::Revenue))?,
        comparisons,
        loss_ratio_capability: process_capability(&loss_ratio, SpecLimits::two_sided(0.0, targets.loss_ratio))?,
        loss_ratio_mean: mean_confidence_interval(&loss_ratio, 0.95)?,
        loss_ratio_summary: loss_ratio_summary(table, targets.loss_ratio)?,
        seasonality: seasonal_profile(table)?,
    })
}
