//! Default insight rules

use super::{Impact, Insight, InsightContext, InsightKind, InsightRule};
use crate::features::FeatureKind;
use crate::stats::TrendDirection;

/// Loss ratio, revenue trend, NPS, handling time, ticket growth, key driver
pub fn default_rules() -> Vec<InsightRule> {
    vec![
        InsightRule::new("loss_ratio", loss_ratio),
        InsightRule::new("revenue_trend", revenue_trend),
        InsightRule::new("nps", nps),
        InsightRule::new("handling_time", handling_time),
        InsightRule::new("ticket_growth", ticket_growth),
        InsightRule::new("key_driver", key_driver),
    ]
}

fn loss_ratio(ctx: &InsightContext<'_>) -> Option<Insight> {
    let mean = ctx.loss_ratio.mean;
    let target = ctx.targets.loss_ratio;
    let insight = if mean > target {
        Insight::new(
            InsightKind::Alert,
            "Loss ratio above target",
            format!(
                "Average of {:.1}% is {:.1} points above the {:.0}% target",
                mean,
                mean - target,
                target
            ),
            Impact::High,
            "Review operating processes and renegotiate with suppliers",
        )
    } else {
        Insight::new(
            InsightKind::Success,
            "Loss ratio under control",
            format!("Average of {:.1}% is within the {:.0}% target", mean, target),
            Impact::Positive,
            "Keep the current strategy",
        )
    };
    Some(insight)
}

fn revenue_trend(ctx: &InsightContext<'_>) -> Option<Insight> {
    let trend = &ctx.revenue_trend;
    match trend.direction {
        TrendDirection::Increasing => Some(Insight::new(
            InsightKind::Opportunity,
            "Revenue growth",
            format!("Revenue grew {:.1}% over the period", trend.pct_change),
            Impact::High,
            "Invest in expansion and new customer acquisition",
        )),
        TrendDirection::Decreasing => Some(Insight::new(
            InsightKind::Attention,
            "Revenue decline",
            format!("Revenue fell {:.1}% over the period", trend.pct_change.abs()),
            Impact::High,
            "Launch recovery and retention initiatives",
        )),
        TrendDirection::Stable => None,
    }
}

fn nps(ctx: &InsightContext<'_>) -> Option<Insight> {
    let mean = ctx.nps.mean;
    let target = ctx.targets.nps;
    (mean < target).then(|| {
        Insight::new(
            InsightKind::Improvement,
            "Customer satisfaction",
            format!("Average NPS of {:.1} is below the target of {:.0}", mean, target),
            Impact::Medium,
            "Run a customer-experience improvement programme",
        )
    })
}

fn handling_time(ctx: &InsightContext<'_>) -> Option<Insight> {
    let mean = ctx.handling_hours.mean;
    let target = ctx.targets.handling_hours;
    (mean > target).then(|| {
        Insight::new(
            InsightKind::Efficiency,
            "Handling time",
            format!("Average handling time of {:.1}h exceeds the {:.0}h target", mean, target),
            Impact::Medium,
            "Streamline processes and add operating capacity",
        )
    })
}

fn ticket_growth(ctx: &InsightContext<'_>) -> Option<Insight> {
    let trend = &ctx.ticket_trend;
    let growing = trend.direction == TrendDirection::Increasing
        && trend.pct_change > ctx.targets.ticket_growth_pct;
    growing.then(|| {
        Insight::new(
            InsightKind::Revenue,
            "Average ticket increase",
            format!("Average ticket grew {:.1}%", trend.pct_change),
            Impact::Positive,
            "Look for upselling and cross-selling opportunities",
        )
    })
}

/// Strongest controllable feature by standardised coefficient
fn key_driver(ctx: &InsightContext<'_>) -> Option<Insight> {
    let model = ctx.model?;
    let schema = model.schema();
    let top = model.importances().into_iter().find(|imp| {
        schema
            .get(&imp.name)
            .map(|spec| matches!(spec.kind, FeatureKind::Observed(_) | FeatureKind::Lag(_)))
            .unwrap_or(false)
            && imp.importance > 0.0
    })?;
    let direction = if top.coefficient >= 0.0 { "raises" } else { "lowers" };
    Some(Insight::new(
        InsightKind::Driver,
        "Key revenue driver",
        format!(
            "{} has the largest standardised effect: one unit {} monthly revenue by {:.0}",
            top.name,
            direction,
            top.coefficient.abs()
        ),
        Impact::High,
        format!("Prioritise initiatives that move {}", top.name),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusinessTargets;
    use crate::data::generate;
    use crate::training::train;

    #[test]
    fn test_rule_order() {
        let names: Vec<&str> = default_rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            ["loss_ratio", "revenue_trend", "nps", "handling_time", "ticket_growth", "key_driver"]
        );
    }

    #[test]
    fn test_loss_ratio_threshold_follows_targets() {
        let table = generate(36).unwrap();
        let strict = BusinessTargets {
            loss_ratio: 0.0,
            ..BusinessTargets::default()
        };
        let ctx = InsightContext::new(&table, None, &strict).unwrap();
        assert_eq!(loss_ratio(&ctx).unwrap().kind, InsightKind::Alert);

        let lenient = BusinessTargets {
            loss_ratio: 100.0,
            ..BusinessTargets::default()
        };
        let ctx = InsightContext::new(&table, None, &lenient).unwrap();
        assert_eq!(loss_ratio(&ctx).unwrap().kind, InsightKind::Success);
    }

    #[test]
    fn test_nps_and_handling_thresholds() {
        let table = generate(36).unwrap();
        let targets = BusinessTargets {
            nps: 100.0,
            handling_hours: 0.5,
            ..BusinessTargets::default()
        };
        let ctx = InsightContext::new(&table, None, &targets).unwrap();
        assert!(nps(&ctx).is_some());
        assert!(handling_time(&ctx).is_some());

        let targets = BusinessTargets {
            nps: 0.0,
            handling_hours: 10.0,
            ..BusinessTargets::default()
        };
        let ctx = InsightContext::new(&table, None, &targets).unwrap();
        assert!(nps(&ctx).is_none());
        assert!(handling_time(&ctx).is_none());
    }

    #[test]
    fn test_key_driver_needs_model() {
        let table = generate(48).unwrap();
        let targets = BusinessTargets::default();
        let ctx = InsightContext::new(&table, None, &targets).unwrap();
        assert!(key_driver(&ctx).is_none());

        let model = train(&table).unwrap();
        let ctx = InsightContext::new(&table, Some(&model), &targets).unwrap();
        let insight = key_driver(&ctx).unwrap();
        assert_eq!(insight.kind, InsightKind::Driver);
        assert!(model.schema().names().iter().any(|n| insight.description.starts_with(n)));
    }
}
