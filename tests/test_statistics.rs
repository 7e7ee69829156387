//! Integration tests for the statistical analysis functions

use revenue_insights::data::{generate, Polarity, Variable};
use revenue_insights::stats::{
    compare_periods, describe, mean_confidence_interval, normality_test, prediction_interval,
    process_capability, screen_columns, screen_correlations, temporal_trend, CapabilityStatus,
    ComparisonStatus, CorrelationDirection, SpecLimits, TrendDirection, ValueDomain,
};

fn mixed(a: f64) -> Vec<f64> {
    // x and z are orthogonal with equal norms, so corr(x, y) == a
    let x = [1.0, -1.0, 1.0, -1.0];
    let z = [1.0, 1.0, -1.0, -1.0];
    let b = (1.0 - a * a).sqrt();
    x.iter().zip(&z).map(|(x, z)| a * x + b * z).collect()
}

// ============================================================================
// Correlation screening
// ============================================================================

#[test]
fn test_threshold_boundary() {
    let x = vec![1.0, -1.0, 1.0, -1.0];

    let below = mixed(0.49999);
    let findings = screen_columns(&[("x", x.as_slice()), ("y", below.as_slice())], 0.5).unwrap();
    assert!(findings.is_empty());

    let above = mixed(0.50001);
    let findings = screen_columns(&[("x", x.as_slice()), ("y", above.as_slice())], 0.5).unwrap();
    assert_eq!(findings.len(), 1);
    assert!((findings[0].r - 0.50001).abs() < 1e-9);
    assert_eq!(findings[0].direction, CorrelationDirection::Positive);
}

#[test]
fn test_negative_correlation_kept_by_magnitude() {
    let x = vec![1.0, -1.0, 1.0, -1.0];
    let y = mixed(-0.8);
    let findings = screen_columns(&[("x", x.as_slice()), ("y", y.as_slice())], 0.5).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].direction, CorrelationDirection::Negative);
}

#[test]
fn test_table_screening_sorted() {
    let table = generate(48).unwrap();
    let findings = screen_correlations(&table, &Variable::CORRELATION_SET, 0.3).unwrap();
    for pair in findings.windows(2) {
        assert!(pair[0].r.abs() >= pair[1].r.abs());
    }
    for f in &findings {
        assert!(f.r.abs() >= 0.3);
        assert!((0.0..=1.0).contains(&f.p_value));
        assert_ne!(f.first, f.second);
    }
}

// ============================================================================
// Trends and period comparison
// ============================================================================

#[test]
fn test_constant_series_is_stable() {
    let trend = temporal_trend(&[5.0; 12]).unwrap();
    assert_eq!(trend.direction, TrendDirection::Stable);
    assert_eq!(trend.p_value, 1.0);
    assert_eq!(trend.slope, 0.0);
    assert_eq!(trend.pct_change, 0.0);
}

#[test]
fn test_rising_series() {
    let wobble = [0.2, -0.1, 0.3, -0.2];
    let values: Vec<f64> = (0..24).map(|i| 10.0 + 2.0 * i as f64 + wobble[i % 4]).collect();
    let trend = temporal_trend(&values).unwrap();
    assert_eq!(trend.direction, TrendDirection::Increasing);
    assert!((trend.slope - 2.0).abs() < 0.05);
    assert!(trend.r_squared > 0.99);
    assert!(trend.significant);
}

#[test]
fn test_loss_ratio_drop_is_improvement() {
    let wobble = [0.4, -0.4, 0.2, -0.2];
    let values: Vec<f64> = (0..24)
        .map(|i| (if i < 18 { 58.0 } else { 48.0 }) + wobble[i % 4])
        .collect();
    let comparison = compare_periods(&values, 6, Polarity::LowerIsBetter).unwrap();
    assert_eq!(comparison.earlier_len, 18);
    assert_eq!(comparison.recent_len, 6);
    assert!(comparison.significant);
    assert_eq!(comparison.status, ComparisonStatus::Improvement);
    assert!(comparison.pct_change < 0.0);
}

#[test]
fn test_recent_window_validated() {
    let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    assert!(compare_periods(&values, 1, Polarity::HigherIsBetter).is_err());
    assert!(compare_periods(&values, 5, Polarity::HigherIsBetter).is_err());
    assert!(compare_periods(&values, 3, Polarity::HigherIsBetter).is_ok());
}

// ============================================================================
// Distribution
// ============================================================================

#[test]
fn test_describe_flags_outlier() {
    let mut values: Vec<f64> = (0..20).map(|i| 50.0 + (i % 5) as f64).collect();
    values.push(200.0);
    let summary = describe(&values).unwrap();
    assert_eq!(summary.count, 21);
    assert_eq!(summary.outlier_count, 1);
    assert_eq!(summary.max, 200.0);
    assert!(summary.upper_fence < 200.0);
}

#[test]
fn test_skewed_sample_not_normal() {
    let mut values = vec![1.0; 18];
    values.extend([50.0, 100.0]);
    values[0] = 1.5;
    let test = normality_test(&values).unwrap().unwrap();
    assert!(!test.is_normal);
    assert!(test.statistic > 0.0 && test.statistic <= 1.0);
}

#[test]
fn test_tiny_sample_skips_normality() {
    assert!(normality_test(&[1.0, 2.0]).unwrap().is_none());
}

// ============================================================================
// Capability and intervals
// ============================================================================

#[test]
fn test_centred_process_cp_equals_cpk() {
    let values = [48.0, 49.0, 50.0, 51.0, 52.0];
    let indices = process_capability(&values, SpecLimits::two_sided(40.0, 60.0)).unwrap();
    let cp = indices.cp.unwrap();
    assert!((cp - indices.cpk).abs() < 1e-12);
    assert_eq!(indices.status, CapabilityStatus::from_cpk(indices.cpk));
    assert_eq!(indices.pct_within, 100.0);
}

#[test]
fn test_one_sided_limit_has_no_cp() {
    let values = [44.0, 46.0, 48.0, 50.0, 52.0];
    let indices = process_capability(&values, SpecLimits::upper_only(50.0)).unwrap();
    assert!(indices.cp.is_none());
    assert!(indices.cpl.is_none());
    assert_eq!(indices.cpu, Some(indices.cpk));
    assert!((indices.pct_within - 80.0).abs() < 1e-9);
}

#[test]
fn test_percentage_interval_clamped() {
    let interval = prediction_interval(98.0, &[-3.0, 3.0], ValueDomain::PERCENTAGE).unwrap();
    assert_eq!(interval.upper, 100.0);
    assert!((interval.lower - (98.0 - 1.96 * 3.0)).abs() < 1e-9);
    assert!((interval.std_error - 3.0).abs() < 1e-12);
    assert_eq!(interval.confidence_pct, 95.0);
}

#[test]
fn test_mean_interval_brackets_mean() {
    let table = generate(48).unwrap();
    let values = table.column(Variable::RealizedLossRatio);
    let ci = mean_confidence_interval(&values, 0.95).unwrap();
    assert!(ci.lower < ci.mean && ci.mean < ci.upper);

    let wider = mean_confidence_interval(&values, 0.99).unwrap();
    assert!(wider.upper - wider.lower > ci.upper - ci.lower);
}
