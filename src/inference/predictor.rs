//! Scenario prediction

use super::scenario::Scenario;
use crate::config::TimeIndexPolicy;
use crate::data::MonthlyTable;
use crate::error::{Result, RevenueError};
use crate::features::{FeatureEngineer, FeatureKind, ATTENDANCE, AVERAGE_TICKET, TARGET_MONTH};
use crate::stats::{prediction_interval, PredictionInterval, ValueDomain};
use crate::training::TrainedModel;
use tracing::{debug, warn};

/// Evaluates scenarios against a trained model
#[derive(Debug, Clone)]
pub struct Predictor<'a> {
    model: &'a TrainedModel,
    time_index: TimeIndexPolicy,
}

impl<'a> Predictor<'a> {
    /// Uses the time-index policy the model was trained with
    pub fn new(model: &'a TrainedModel) -> Self {
        Self {
            model,
            time_index: model.config().time_index,
        }
    }

    pub fn with_time_index(mut self, policy: TimeIndexPolicy) -> Self {
        self.time_index = policy;
        self
    }

    pub fn model(&self) -> &TrainedModel {
        self.model
    }

    /// Reconstruct the full feature vector for a scenario
    pub fn build_vector(&self, scenario: &Scenario) -> Result<Vec<f64>> {
        let schema = self.model.schema();
        schema.validate_keys(scenario.keys())?;
        if let Some((key, value)) = scenario.values().iter().find(|(_, v)| !v.is_finite()) {
            return Err(RevenueError::invalid_parameter(key, value, "must be finite"));
        }
        let month = scenario.target_month();
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(RevenueError::invalid_parameter(TARGET_MONTH, m, "must be between 1 and 12"));
            }
        }

        let supplied = |name: &str, default: f64| scenario.get(name).unwrap_or(default);
        let vector = schema
            .specs()
            .iter()
            .map(|spec| match spec.kind {
                FeatureKind::Observed(_) | FeatureKind::Lag(_) => supplied(&spec.name, spec.default),
                FeatureKind::Interaction => supplied(ATTENDANCE, 0.0) * supplied(AVERAGE_TICKET, 0.0),
                FeatureKind::TimeIndex => self.time_index.resolve(self.model.rows()),
                FeatureKind::MonthDummy(m) => {
                    if month == Some(m) {
                        1.0
                    } else {
                        0.0
                    }
                }
            })
            .collect();

        let derived = schema
            .specs()
            .iter()
            .filter(|s| !s.is_user_supplied() && scenario.get(&s.name).is_some())
            .count();
        if derived > 0 {
            debug!(derived, "ignoring scenario values for derived features");
        }
        Ok(vector)
    }

    /// Point prediction clipped to the configured revenue bounds
    pub fn predict(&self, scenario: &Scenario) -> Result<f64> {
        let vector = self.build_vector(scenario)?;
        let raw = self.model.predict_row(&vector)?;
        let config = self.model.config();
        // Bounds may come from a deserialized model
        config.validate()?;
        let clipped = raw.max(config.prediction_floor).min(config.prediction_ceiling);
        if clipped != raw {
            warn!(raw, clipped, "prediction outside plausible revenue range, clipped");
        }
        Ok(clipped)
    }

    /// Point prediction with a 95% band from the in-sample residuals on `table`
    pub fn predict_with_interval(&self, scenario: &Scenario, table: &MonthlyTable) -> Result<PredictionInterval> {
        let point = self.predict(scenario)?;
        let residuals = training_residuals(self.model, table)?;
        prediction_interval(point, &residuals, ValueDomain::NON_NEGATIVE)
    }
}

/// Residuals of the model on the rows of `table` up to the split boundary
fn training_residuals(model: &TrainedModel, table: &MonthlyTable) -> Result<Vec<f64>> {
    let design = FeatureEngineer::new(model.schema().clone()).build(table)?;
    let boundary = model.split().last_train_date;
    let residuals: Vec<f64> = design
        .dates
        .iter()
        .enumerate()
        .take_while(|(_, date)| **date <= boundary)
        .map(|(row, _)| {
            let features = design.x.row(row).to_vec();
            model.predict_row(&features).map(|fitted| design.y[row] - fitted)
        })
        .collect::<Result<_>>()?;

    if residuals.is_empty() {
        return Err(RevenueError::DataError(format!(
            "table has no months on or before the training boundary {}",
            boundary
        )));
    }
    Ok(residuals)
}

/// Predict with the model's own time-index policy
pub fn predict(model: &TrainedModel, scenario: &Scenario) -> Result<f64> {
    Predictor::new(model).predict(scenario)
}

pub fn predict_with_interval(
    model: &TrainedModel,
    scenario: &Scenario,
    table: &MonthlyTable,
) -> Result<PredictionInterval> {
    Predictor::new(model).predict_with_interval(scenario, table)
}
