//! Chronological train/test split and model fitting

use super::linear_models::LinearRegression;
use super::metrics::RegressionMetrics;
use crate::config::TrainingConfig;
use crate::data::MonthlyTable;
use crate::error::{Result, RevenueError};
use crate::features::{FeatureEngineer, FeatureSchema};
use chrono::NaiveDate;
use ndarray::{s, Array1, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Minimum number of lag-filtered rows needed to fit and evaluate
pub const MIN_TRAINING_ROWS: usize = 3;

/// Where the chronological split fell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub last_train_date: NaiveDate,
    pub first_test_date: NaiveDate,
}

/// Standardised weight of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub coefficient: f64,
    /// |coefficient| x training standard deviation
    pub importance: f64,
}

/// Fitted revenue model; immutable once built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    coefficients: Array1<f64>,
    intercept: f64,
    schema: FeatureSchema,
    metrics: RegressionMetrics,
    feature_std: Vec<f64>,
    training_residuals: Vec<f64>,
    rows: usize,
    split: SplitSummary,
    config: TrainingConfig,
}

impl TrainedModel {
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.schema.index_of(name).map(|i| self.coefficients[i])
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn metrics(&self) -> &RegressionMetrics {
        &self.metrics
    }

    /// Population standard deviation of each feature over the training split
    pub fn feature_std(&self) -> &[f64] {
        &self.feature_std
    }

    /// Actual minus fitted revenue on the training split
    pub fn training_residuals(&self) -> &[f64] {
        &self.training_residuals
    }

    /// Number of lag-filtered rows (train + test)
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn split(&self) -> &SplitSummary {
        &self.split
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Features ranked by standardised coefficient magnitude
    pub fn importances(&self) -> Vec<FeatureImportance> {
        let mut ranked: Vec<FeatureImportance> = self
            .schema
            .specs()
            .iter()
            .zip(self.coefficients.iter())
            .zip(&self.feature_std)
            .map(|((spec, &coefficient), &sd)| FeatureImportance {
                name: spec.name.clone(),
                coefficient,
                importance: coefficient.abs() * sd,
            })
            .collect();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked
    }

    /// Unclipped linear prediction for a full feature vector
    pub fn predict_row(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(RevenueError::ShapeError {
                expected: format!("{} features", self.coefficients.len()),
                actual: format!("{} features", features.len()),
            });
        }
        let dot: f64 = features
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, w)| x * w)
            .sum();
        Ok(self.intercept + dot)
    }
}

/// Fits the revenue model on the oldest part of the series
#[derive(Debug, Clone, Default)]
pub struct RevenueTrainer {
    config: TrainingConfig,
    engineer: FeatureEngineer,
}

impl RevenueTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            engineer: FeatureEngineer::default(),
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Number of test rows for `rows` filtered rows
    pub fn test_size(&self, rows: usize) -> usize {
        let n_test = (rows as f64 * self.config.test_fraction).round() as usize;
        n_test.clamp(1, rows.saturating_sub(2).max(1))
    }

    pub fn fit(&self, table: &MonthlyTable) -> Result<TrainedModel> {
        self.config.validate()?;
        let design = self.engineer.build(table)?;
        let rows = design.rows();
        if rows < MIN_TRAINING_ROWS {
            return Err(RevenueError::InsufficientData {
                required: MIN_TRAINING_ROWS,
                got: rows,
            });
        }

        let n_test = self.test_size(rows);
        let n_train = rows - n_test;
        let x_train = design.x.slice(s![..n_train, ..]).to_owned();
        let y_train = design.y.slice(s![..n_train]).to_owned();
        let x_test = design.x.slice(s![n_train.., ..]).to_owned();
        let y_test = design.y.slice(s![n_train..]).to_owned();
        debug!(rows, n_train, n_test, "chronological split");

        let mut model = LinearRegression::new();
        model.fit(&x_train, &y_train)?;
        let pred_train = model.predict(&x_train)?;
        let pred_test = model.predict(&x_test)?;
        let metrics = RegressionMetrics::compute(&y_test, &pred_test, &y_train, &pred_train);

        let coefficients = model
            .coefficients
            .take()
            .ok_or_else(|| RevenueError::TrainingError("solver returned no coefficients".to_string()))?;
        let intercept = model.intercept.unwrap_or(0.0);
        let feature_std = x_train.std_axis(Axis(0), 0.0).to_vec();
        let training_residuals = (&y_train - &pred_train).to_vec();

        let split = SplitSummary {
            last_train_date: design.dates[n_train - 1],
            first_test_date: design.dates[n_train],
        };

        info!(
            n_train,
            n_test,
            r2 = metrics.r2,
            r2_train = metrics.r2_train,
            mape = metrics.mape,
            "Revenue model trained"
        );

        Ok(TrainedModel {
            coefficients,
            intercept,
            schema: self.engineer.schema().clone(),
            metrics,
            feature_std,
            training_residuals,
            rows,
            split,
            config: self.config.clone(),
        })
    }
}

/// Train with the default configuration
pub fn train(table: &MonthlyTable) -> Result<TrainedModel> {
    RevenueTrainer::default().fit(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate;
    use crate::features::TIME_INDEX;

    #[test]
    fn test_split_sizes() {
        let trainer = RevenueTrainer::default();
        assert_eq!(trainer.test_size(47), 9);
        assert_eq!(trainer.test_size(3), 1);
        assert_eq!(trainer.test_size(10), 2);
    }

    #[test]
    fn test_train_default_table() {
        let table = generate(48).unwrap();
        let model = train(&table).unwrap();
        assert_eq!(model.rows(), 47);
        assert_eq!(model.metrics().n_train, 38);
        assert_eq!(model.metrics().n_test, 9);
        assert_eq!(model.coefficients().len(), model.schema().len());
        assert!(model.split().last_train_date < model.split().first_test_date);
        assert!(model.coefficient(TIME_INDEX).is_some());
        assert!(model.coefficient("weather").is_none());
    }

    #[test]
    fn test_importances_sorted() {
        let model = train(&generate(36).unwrap()).unwrap();
        let importances = model.importances();
        assert_eq!(importances.len(), model.schema().len());
        assert!(importances.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn test_predict_row_shape() {
        let model = train(&generate(24).unwrap()).unwrap();
        assert!(model.predict_row(&[0.0; 3]).is_err());
        let value = model.predict_row(&vec![0.0; model.schema().len()]).unwrap();
        assert_eq!(value, model.intercept());
    }

    #[test]
    fn test_too_few_rows() {
        let err = train(&generate(3).unwrap()).unwrap_err();
        assert!(matches!(err, RevenueError::InsufficientData { required: 3, got: 2 }));
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let trainer = RevenueTrainer::new(TrainingConfig::default().with_test_fraction(1.5));
        assert!(trainer.fit(&generate(24).unwrap()).is_err());
    }
}
