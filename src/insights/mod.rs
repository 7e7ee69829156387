//! Narrative business insights
//!
//! The [`InsightEngine`] evaluates an ordered list of [`InsightRule`]s against
//! an [`InsightContext`] holding the statistics every rule may need. Each rule
//! either yields one [`Insight`] or stays silent. Rule order is output order.

pub mod recommendations;
pub mod report;
pub mod rules;
pub mod summary;

pub use recommendations::{
    derived_metrics, loss_ratio_status, scenario_recommendations, DerivedMetrics, LossRatioStatus,
    Recommendation, RecommendationArea, ScenarioIndicators,
};
pub use report::{
    analysis_report, AnalysisReport, VariableComparison, VariableTrend, DEFAULT_CORRELATION_THRESHOLD,
    DEFAULT_RECENT_MONTHS,
};
pub use rules::default_rules;
pub use summary::{loss_ratio_summary, seasonal_profile, LossRatioSummary, MonthProfile, SeasonalProfile};

use crate::config::BusinessTargets;
use crate::data::{MonthlyTable, Variable};
use crate::error::Result;
use crate::stats::{describe, temporal_trend, DistributionSummary, TrendResult};
use crate::training::TrainedModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsightKind {
    Alert,
    Success,
    Opportunity,
    Attention,
    Improvement,
    Efficiency,
    Revenue,
    Driver,
}

impl InsightKind {
    pub fn label(&self) -> &'static str {
        match self {
            InsightKind::Alert => "Alert",
            InsightKind::Success => "Success",
            InsightKind::Opportunity => "Opportunity",
            InsightKind::Attention => "Attention",
            InsightKind::Improvement => "Improvement",
            InsightKind::Efficiency => "Efficiency",
            InsightKind::Revenue => "Revenue",
            InsightKind::Driver => "Driver",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    High,
    Medium,
    Positive,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Impact::High => "High",
            Impact::Medium => "Medium",
            Impact::Positive => "Positive",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    pub action: String,
}

impl Insight {
    pub fn new(
        kind: InsightKind,
        title: impl Into<String>,
        description: impl Into<String>,
        impact: Impact,
        action: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            impact,
            action: action.into(),
        }
    }
}

/// Statistics shared by all rules, computed once per run
#[derive(Debug, Clone)]
pub struct InsightContext<'a> {
    pub table: &'a MonthlyTable,
    pub model: Option<&'a TrainedModel>,
    pub targets: &'a BusinessTargets,
    pub loss_ratio: DistributionSummary,
    pub nps: DistributionSummary,
    pub handling_hours: DistributionSummary,
    pub revenue_trend: TrendResult,
    pub ticket_trend: TrendResult,
}

impl<'a> InsightContext<'a> {
    pub fn new(
        table: &'a MonthlyTable,
        model: Option<&'a TrainedModel>,
        targets: &'a BusinessTargets,
    ) -> Result<Self> {
        Ok(Self {
            table,
            model,
            targets,
            loss_ratio: describe(&table.column(Variable::RealizedLossRatio))?,
            nps: describe(&table.column(Variable::Nps))?,
            handling_hours: describe(&table.column(Variable::HandlingHours))?,
            revenue_trend: temporal_trend(&table.column(Variable::Revenue))?,
            ticket_trend: temporal_trend(&table.column(Variable::AverageTicket))?,
        })
    }
}

/// One named predicate/template pair
#[derive(Clone)]
pub struct InsightRule {
    pub name: &'static str,
    pub evaluate: fn(&InsightContext<'_>) -> Option<Insight>,
}

impl InsightRule {
    pub fn new(name: &'static str, evaluate: fn(&InsightContext<'_>) -> Option<Insight>) -> Self {
        Self { name, evaluate }
    }
}

impl fmt::Debug for InsightRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightRule").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone)]
pub struct InsightEngine {
    rules: Vec<InsightRule>,
    targets: BusinessTargets,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new(BusinessTargets::default())
    }
}

impl InsightEngine {
    pub fn new(targets: BusinessTargets) -> Self {
        Self {
            rules: default_rules(),
            targets,
        }
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: InsightRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn without_rules(mut self) -> Self {
        self.rules.clear();
        self
    }

    pub fn rules(&self) -> &[InsightRule] {
        &self.rules
    }

    pub fn targets(&self) -> &BusinessTargets {
        &self.targets
    }

    pub fn generate(&self, table: &MonthlyTable, model: Option<&TrainedModel>) -> Result<Vec<Insight>> {
        let context = InsightContext::new(table, model, &self.targets)?;
        let insights: Vec<Insight> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let insight = (rule.evaluate)(&context);
                debug!(rule = rule.name, fired = insight.is_some(), "insight rule evaluated");
                insight
            })
            .collect();
        Ok(insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate;

    #[test]
    fn test_custom_rule_appended() {
        fn always(_: &InsightContext<'_>) -> Option<Insight> {
            Some(Insight::new(InsightKind::Attention, "custom", "", Impact::Medium, ""))
        }
        let table = generate(24).unwrap();
        let engine = InsightEngine::default().without_rules().with_rule(InsightRule::new("always", always));
        let insights = engine.generate(&table, None).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "custom");
    }

    #[test]
    fn test_first_insight_is_loss_ratio() {
        let table = generate(48).unwrap();
        let insights = InsightEngine::default().generate(&table, None).unwrap();
        assert!(!insights.is_empty());
        assert!(matches!(insights[0].kind, InsightKind::Alert | InsightKind::Success));
    }
}
