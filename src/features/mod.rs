//! Feature engineering for the revenue regression
//!
//! The [`FeatureSchema`] is the single description of the design matrix
//! column order. The trainer builds its matrix from it and the predictor
//! validates scenarios against it, so the two can never drift apart.

use crate::data::{MonthlyRecord, MonthlyTable, Variable};
use crate::error::{Result, RevenueError};
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

pub const PREV_REVENUE: &str = "prev_revenue";
pub const ATTENDANCE: &str = "attendance_count";
pub const AVERAGE_TICKET: &str = "average_ticket";
pub const PCT_WITH_PARTS: &str = "pct_with_parts";
pub const HANDLING_HOURS: &str = "handling_hours";
pub const RECURRENCE_RATE: &str = "recurrence_rate";
pub const NPS: &str = "nps";
pub const PREV_LOSS_RATIO: &str = "prev_loss_ratio";
pub const INTEREST_RATE: &str = "interest_rate";
pub const ACCIDENT_INDEX: &str = "accident_index";
pub const TIME_INDEX: &str = "time_index";
pub const ATTENDANCE_X_TICKET: &str = "attendance_x_ticket";

/// Scenario key selecting the month dummies; not a model column
pub const TARGET_MONTH: &str = "target_month";

/// How a column is derived from the monthly table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Same-month value of a variable
    Observed(Variable),
    /// Previous-month value of a variable
    Lag(Variable),
    /// attendance x average ticket
    Interaction,
    /// 0-based position in the lag-filtered series
    TimeIndex,
    /// 1 when the calendar month matches
    MonthDummy(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
    /// Value used when a scenario leaves the feature out
    pub default: f64,
}

impl FeatureSpec {
    fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: 0.0,
        }
    }

    /// Whether a scenario may set this feature directly
    pub fn is_user_supplied(&self) -> bool {
        matches!(self.kind, FeatureKind::Observed(_) | FeatureKind::Lag(_))
    }
}

/// Ordered list of model columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    specs: Vec<FeatureSpec>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::revenue()
    }
}

impl FeatureSchema {
    /// The twelve base features followed by `month_2` .. `month_12`
    pub fn revenue() -> Self {
        let mut specs = vec![
            FeatureSpec::new(PREV_REVENUE, FeatureKind::Lag(Variable::Revenue)),
            FeatureSpec::new(ATTENDANCE, FeatureKind::Observed(Variable::Attendance)),
            FeatureSpec::new(AVERAGE_TICKET, FeatureKind::Observed(Variable::AverageTicket)),
            FeatureSpec::new(PCT_WITH_PARTS, FeatureKind::Observed(Variable::PctWithParts)),
            FeatureSpec::new(HANDLING_HOURS, FeatureKind::Observed(Variable::HandlingHours)),
            FeatureSpec::new(RECURRENCE_RATE, FeatureKind::Observed(Variable::RecurrenceRate)),
            FeatureSpec::new(NPS, FeatureKind::Observed(Variable::Nps)),
            FeatureSpec::new(PREV_LOSS_RATIO, FeatureKind::Lag(Variable::RealizedLossRatio)),
            FeatureSpec::new(INTEREST_RATE, FeatureKind::Observed(Variable::InterestRate)),
            FeatureSpec::new(ACCIDENT_INDEX, FeatureKind::Observed(Variable::AccidentIndex)),
            FeatureSpec::new(TIME_INDEX, FeatureKind::TimeIndex),
            FeatureSpec::new(ATTENDANCE_X_TICKET, FeatureKind::Interaction),
        ];
        specs.extend((2..=12).map(|m| FeatureSpec::new(month_dummy_name(m), FeatureKind::MonthDummy(m))));
        Self { specs }
    }

    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&FeatureSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Reject keys that are neither a feature nor `target_month`
    pub fn validate_keys<'a, I>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for key in keys {
            if key != TARGET_MONTH && self.index_of(key).is_none() {
                return Err(RevenueError::UnknownFeature(key.to_string()));
            }
        }
        Ok(())
    }
}

pub fn month_dummy_name(month: u32) -> String {
    format!("month_{}", month)
}

/// Design matrix of the lag-filtered series
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    /// Month of each row
    pub dates: Vec<NaiveDate>,
}

impl DesignMatrix {
    pub fn rows(&self) -> usize {
        self.x.nrows()
    }
}

/// Turns a [`MonthlyTable`] into model inputs
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    schema: FeatureSchema,
}

impl FeatureEngineer {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Recompute lags from the previous row and drop the first month,
    /// whose lag would only be a filled value.
    pub fn build(&self, table: &MonthlyTable) -> Result<DesignMatrix> {
        if table.len() < 2 {
            return Err(RevenueError::InsufficientData {
                required: 2,
                got: table.len(),
            });
        }

        let records = table.records();
        let rows = records.len() - 1;
        let mut x = Array2::zeros((rows, self.schema.len()));
        let mut y = Array1::zeros(rows);
        let mut dates = Vec::with_capacity(rows);

        for (row, pair) in records.windows(2).enumerate() {
            let (prev, current) = (&pair[0], &pair[1]);
            for (col, spec) in self.schema.specs().iter().enumerate() {
                x[[row, col]] = feature_value(spec.kind, prev, current, row);
            }
            y[row] = current.revenue;
            dates.push(current.date);
        }

        Ok(DesignMatrix { x, y, dates })
    }
}

fn feature_value(kind: FeatureKind, prev: &MonthlyRecord, current: &MonthlyRecord, row: usize) -> f64 {
    match kind {
        FeatureKind::Observed(variable) => variable.value(current),
        FeatureKind::Lag(variable) => variable.value(prev),
        FeatureKind::Interaction => current.attendance as f64 * current.average_ticket,
        FeatureKind::TimeIndex => row as f64,
        FeatureKind::MonthDummy(m) => {
            if current.month == m {
                1.0
            } else {
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate;

    #[test]
    fn test_schema_order() {
        let schema = FeatureSchema::revenue();
        assert_eq!(schema.len(), 23);
        assert_eq!(schema.index_of(PREV_REVENUE), Some(0));
        assert_eq!(schema.index_of(ATTENDANCE_X_TICKET), Some(11));
        assert_eq!(schema.index_of("month_2"), Some(12));
        assert_eq!(schema.index_of("month_12"), Some(22));
        assert!(schema.index_of("month_1").is_none());
    }

    #[test]
    fn test_validate_keys() {
        let schema = FeatureSchema::revenue();
        assert!(schema.validate_keys(["nps", TARGET_MONTH]).is_ok());
        let err = schema.validate_keys(["nps", "weather"]).unwrap_err();
        assert!(matches!(err, RevenueError::UnknownFeature(ref k) if k == "weather"));
    }

    #[test]
    fn test_build_drops_first_row_and_recomputes_lags() {
        let table = generate(12).unwrap();
        let design = FeatureEngineer::default().build(&table).unwrap();
        assert_eq!(design.rows(), 11);
        assert_eq!(design.y.len(), 11);

        let records = table.records();
        for row in 0..design.rows() {
            assert_eq!(design.x[[row, 0]], records[row].revenue);
            assert_eq!(design.x[[row, 7]], records[row].realized_loss_ratio);
            assert_eq!(design.x[[row, 10]], row as f64);
            let interaction = records[row + 1].attendance as f64 * records[row + 1].average_ticket;
            assert!((design.x[[row, 11]] - interaction).abs() < 1e-6);
            assert_eq!(design.dates[row], records[row + 1].date);
        }
    }

    #[test]
    fn test_month_dummies_one_hot() {
        let table = generate(13).unwrap();
        let design = FeatureEngineer::default().build(&table).unwrap();
        for (row, date) in design.dates.iter().enumerate() {
            let active: f64 = (12..23).map(|c| design.x[[row, c]]).sum();
            let is_january = table.records()[row + 1].month == 1;
            assert_eq!(active, if is_january { 0.0 } else { 1.0 }, "row for {}", date);
        }
    }

    #[test]
    fn test_build_needs_two_rows() {
        let table = generate(1).unwrap();
        assert!(FeatureEngineer::default().build(&table).is_err());
    }
}
