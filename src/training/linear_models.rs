//! Ordinary least squares regression

use crate::error::{Result, RevenueError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Relative ridge strengths tried when X^T X is not positive definite
const RIDGE_STEPS: [f64; 3] = [1e-10, 1e-8, 1e-6];

/// Cholesky factor L of a symmetric positive-definite matrix (A = L L^T)
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }
    Some(l)
}

fn cholesky_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }
    x
}

/// Solve Ax = b for symmetric A, adding a tiny ridge only when A is singular
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }
    if let Some(l) = cholesky_factor(a) {
        return Some(cholesky_substitute(&l, b));
    }

    let scale = (a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64).max(1.0);
    for step in RIDGE_STEPS {
        let mut a_reg = a.clone();
        for k in 0..n {
            a_reg[[k, k]] += step * scale;
        }
        if let Some(l) = cholesky_factor(&a_reg) {
            tracing::debug!(ridge = step * scale, "normal equations regularised");
            return Some(cholesky_substitute(&l, b));
        }
    }
    None
}

/// Matrix inversion using Gauss-Jordan elimination (fallback)
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    // Augmented matrix [M | I]
    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Some(inv)
}

/// Solve least squares via normal equations: (X^T X) w = X^T y
fn solve_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    if let Some(result) = cholesky_solve(&xtx, &xty) {
        return Some(result);
    }
    matrix_inverse(&xtx).map(|inv| inv.dot(&xty))
}

/// Linear regression fitted on standardised columns
///
/// Columns are centred (when fitting an intercept) and divided by their
/// standard deviation before solving, then the coefficients are mapped back
/// to the original units. Constant columns keep a scale of 1 and end up with
/// a zero coefficient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients in original units
    pub coefficients: Option<Array1<f64>>,
    pub intercept: Option<f64>,
    pub fit_intercept: bool,
    pub is_fitted: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            is_fitted: false,
        }
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(RevenueError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(RevenueError::InsufficientData {
                required: 1,
                got: 0,
            });
        }

        let (x_mean, y_mean) = if self.fit_intercept {
            let x_mean = x
                .mean_axis(Axis(0))
                .ok_or_else(|| RevenueError::ComputationError("empty design matrix".to_string()))?;
            (x_mean, y.mean().unwrap_or(0.0))
        } else {
            (Array1::zeros(n_features), 0.0)
        };

        let x_centered = x - &x_mean.view().insert_axis(Axis(0));
        let scale = x_centered.map_axis(Axis(0), |col| {
            let sd = (col.mapv(|v| v * v).sum() / n_samples as f64).sqrt();
            if sd > 0.0 {
                sd
            } else {
                1.0
            }
        });
        let x_scaled = &x_centered / &scale.view().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        let scaled_coefficients = solve_least_squares(&x_scaled, &y_centered).ok_or_else(|| {
            RevenueError::ComputationError("Matrix is singular, cannot solve least squares".to_string())
        })?;
        let coefficients = &scaled_coefficients / &scale;

        let intercept = if self.fit_intercept {
            y_mean - coefficients.dot(&x_mean)
        } else {
            0.0
        };

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        self.is_fitted = true;

        Ok(self)
    }

    fn coefficients(&self) -> Result<&Array1<f64>> {
        self.coefficients
            .as_ref()
            .ok_or_else(|| RevenueError::TrainingError("model is not fitted".to_string()))
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients()?;
        if x.ncols() != coefficients.len() {
            return Err(RevenueError::ShapeError {
                expected: format!("{} columns", coefficients.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }

    /// R² on the given data
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        Ok(super::metrics::r2_score(y, &y_pred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_regression_simple() {
        let x = array![[1.0, 1.0], [2.0, 1.0], [1.0, 2.0], [2.0, 2.0], [3.0, 1.0],];
        // y = 2*x1 + 3*x2 + 1
        let y = array![6.0, 8.0, 9.0, 11.0, 10.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        assert!(model.is_fitted);
        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-8);
        assert!((coef[1] - 3.0).abs() < 1e-8);
        assert!((model.intercept.unwrap() - 1.0).abs() < 1e-8);

        let r2 = model.score(&x, &y).unwrap();
        assert!(r2 > 0.9999, "R² should be close to 1, got {}", r2);
    }

    #[test]
    fn test_large_scale_columns() {
        // Revenue-sized targets with columns spanning six orders of magnitude
        let x = array![
            [900.0, 450.0, 405_000.0],
            [950.0, 470.0, 446_500.0],
            [1010.0, 440.0, 444_400.0],
            [980.0, 500.0, 490_000.0],
            [1100.0, 480.0, 528_000.0],
            [1050.0, 520.0, 546_000.0],
            [870.0, 430.0, 374_100.0],
        ];
        let y = x.column(2).mapv(|v| 1.1 * v + 50_000.0);

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let predictions = model.predict(&x).unwrap();
        for (p, t) in predictions.iter().zip(y.iter()) {
            assert!((p - t).abs() / t < 1e-6);
        }
    }

    #[test]
    fn test_constant_column_gets_zero_weight() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [4.0, 5.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-6);
        assert!(coef[1].abs() < 1e-6);
    }

    #[test]
    fn test_more_features_than_rows() {
        let x = array![[1.0, 2.0, 3.0], [2.0, 1.0, 0.0]];
        let y = array![1.0, 2.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let predictions = model.predict(&x).unwrap();
        assert!(predictions.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_shape_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0];
        assert!(LinearRegression::new().fit(&x, &y).is_err());
        assert!(LinearRegression::new().predict(&x).is_err());
    }

    #[test]
    fn test_gauss_jordan_inverse() {
        let m = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = matrix_inverse(&m).unwrap();
        let identity = m.dot(&inv);
        assert!((identity[[0, 0]] - 1.0).abs() < 1e-10);
        assert!(identity[[0, 1]].abs() < 1e-10);
        assert!(matrix_inverse(&array![[1.0, 2.0], [2.0, 4.0]]).is_none());
    }
}
