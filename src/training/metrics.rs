//! Regression metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Held-out evaluation of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// R² on the test split
    pub r2: f64,
    /// R² on the training split
    pub r2_train: f64,
    pub mae: f64,
    pub rmse: f64,
    pub mse: f64,
    /// Mean absolute percentage error, zero actuals skipped
    pub mape: f64,
    pub n_train: usize,
    pub n_test: usize,
}

impl RegressionMetrics {
    pub fn compute(
        y_test: &Array1<f64>,
        pred_test: &Array1<f64>,
        y_train: &Array1<f64>,
        pred_train: &Array1<f64>,
    ) -> Self {
        let n = y_test.len().max(1) as f64;
        let residuals = y_test - pred_test;
        let mse = residuals.mapv(|r| r * r).sum() / n;

        Self {
            r2: r2_score(y_test, pred_test),
            r2_train: r2_score(y_train, pred_train),
            mae: residuals.mapv(f64::abs).sum() / n,
            rmse: mse.sqrt(),
            mse,
            mape: mape(y_test, pred_test),
            n_train: y_train.len(),
            n_test: y_test.len(),
        }
    }
}

/// Coefficient of determination; 0 for a constant target the model misses
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let y_mean = y_true.mean().unwrap_or(0.0);
    let ss_res = (y_pred - y_true).mapv(|v| v * v).sum();
    let ss_tot = y_true.mapv(|v| (v - y_mean) * (v - y_mean)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn mape(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let (sum, count) = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, _)| **t != 0.0)
        .fold((0.0, 0usize), |(sum, count), (t, p)| {
            (sum + ((t - p) / t).abs(), count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum / count as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_metrics() {
        let y = array![100.0, 200.0, 300.0, 400.0];
        let p = array![110.0, 190.0, 310.0, 390.0];
        let m = RegressionMetrics::compute(&y, &p, &y, &y);
        assert!((m.mae - 10.0).abs() < 1e-12);
        assert!((m.rmse - 10.0).abs() < 1e-12);
        assert!((m.mse - 100.0).abs() < 1e-12);
        assert!((m.r2 - (1.0 - 400.0 / 50_000.0)).abs() < 1e-12);
        assert_eq!(m.r2_train, 1.0);
        assert_eq!(m.n_test, 4);
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        let y = array![0.0, 100.0];
        let p = array![5.0, 90.0];
        assert!((mape(&y, &p) - 10.0).abs() < 1e-12);
        assert_eq!(mape(&array![0.0], &array![1.0]), 0.0);
    }

    #[test]
    fn test_r2_constant_target() {
        let y = array![5.0, 5.0];
        assert_eq!(r2_score(&y, &y), 1.0);
        assert_eq!(r2_score(&y, &array![4.0, 6.0]), 0.0);
    }
}
