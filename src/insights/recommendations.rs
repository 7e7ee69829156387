//! Scenario-level recommendations and derived figures

use crate::config::BusinessTargets;
use serde::{Deserialize, Serialize};

/// Operating indicators of a simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioIndicators {
    pub handling_hours: f64,
    pub recurrence_rate: f64,
    pub nps: f64,
    /// Previous month realized loss ratio
    pub prev_loss_ratio: f64,
    pub budgeted_loss_ratio: f64,
    pub pct_with_parts: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationArea {
    HandlingTime,
    Recurrence,
    Satisfaction,
    LossRatio,
    BudgetOverrun,
    Parts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub area: RecommendationArea,
    pub message: String,
}

impl Recommendation {
    fn new(area: RecommendationArea, message: impl Into<String>) -> Self {
        Self {
            area,
            message: message.into(),
        }
    }
}

/// Checks run in a fixed order; an empty list means every indicator is on target
pub fn scenario_recommendations(
    indicators: &ScenarioIndicators,
    targets: &BusinessTargets,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if indicators.handling_hours > targets.handling_hours {
        out.push(Recommendation::new(
            RecommendationArea::HandlingTime,
            format!(
                "Reduce handling time (target: < {:.0}h) to lift satisfaction and cut operating cost",
                targets.handling_hours
            ),
        ));
    }
    if indicators.recurrence_rate > targets.recurrence_rate {
        out.push(Recommendation::new(
            RecommendationArea::Recurrence,
            "Investigate the high recurrence rate; it may point to service quality problems",
        ));
    }
    if indicators.nps < targets.nps {
        out.push(Recommendation::new(
            RecommendationArea::Satisfaction,
            "Improve NPS through team training and faster response times",
        ));
    }
    if indicators.prev_loss_ratio > targets.loss_ratio {
        out.push(Recommendation::new(
            RecommendationArea::LossRatio,
            format!(
                "Loss ratio of {:.1}% is above the {:.0}% target; review pricing or renegotiate contracts",
                indicators.prev_loss_ratio, targets.loss_ratio
            ),
        ));
    }
    if indicators.prev_loss_ratio > indicators.budgeted_loss_ratio + targets.budget_overrun {
        out.push(Recommendation::new(
            RecommendationArea::BudgetOverrun,
            format!(
                "Realized loss ratio ({:.1}%) is {:.1} points above budget ({:.1}%); investigate the causes",
                indicators.prev_loss_ratio,
                indicators.prev_loss_ratio - indicators.budgeted_loss_ratio,
                indicators.budgeted_loss_ratio
            ),
        ));
    }
    if indicators.pct_with_parts < targets.pct_with_parts {
        out.push(Recommendation::new(
            RecommendationArea::Parts,
            "Look for parts sales opportunities; the share of attendances with parts is below potential",
        ));
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossRatioStatus {
    /// At or below target
    Excellent,
    /// Above target, within the attention band
    Attention,
    Critical,
}

impl LossRatioStatus {
    pub fn describe(&self) -> &'static str {
        match self {
            LossRatioStatus::Excellent => "within target",
            LossRatioStatus::Attention => "slightly above target",
            LossRatioStatus::Critical => "well above target, immediate action required",
        }
    }
}

pub fn loss_ratio_status(value: f64, targets: &BusinessTargets) -> LossRatioStatus {
    if value <= targets.loss_ratio {
        LossRatioStatus::Excellent
    } else if value <= targets.loss_ratio_attention {
        LossRatioStatus::Attention
    } else {
        LossRatioStatus::Critical
    }
}

/// Figures derived from a revenue prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Revenue left after the loss ratio
    pub gross_margin: f64,
    /// Gross margin over revenue, in percent (0 when revenue is 0)
    pub gross_margin_pct: f64,
    /// Revenue per attendance (0 with no attendances)
    pub realized_ticket: f64,
}

pub fn derived_metrics(prediction: f64, prev_loss_ratio: f64, attendance: f64) -> DerivedMetrics {
    let gross_margin = prediction - prediction * prev_loss_ratio / 100.0;
    DerivedMetrics {
        gross_margin,
        gross_margin_pct: if prediction > 0.0 {
            gross_margin / prediction * 100.0
        } else {
            0.0
        },
        realized_ticket: if attendance > 0.0 {
            prediction / attendance
        } else {
            0.0
        },
    }
}
