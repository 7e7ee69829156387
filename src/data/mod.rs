//! Monthly operating data
//!
//! A [`MonthlyTable`] is the single source every other module reads:
//! the trainer engineers features from it, the statistics functions pull
//! columns out of it through [`Variable`], and the cache fingerprints it.

mod generator;

pub use generator::{generate, SyntheticGenerator, SEASONAL_REVENUE_OFFSET};

use crate::error::{Result, RevenueError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One calendar month of operating, financial and satisfaction figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// First day of the month
    pub date: NaiveDate,
    /// Calendar month (1-12)
    pub month: u32,
    /// Calendar quarter (1-4)
    pub quarter: u32,
    /// Position in the series (1..N)
    pub month_index: u32,
    /// Number of attendances (service calls)
    pub attendance: u32,
    /// Average ticket per attendance
    pub average_ticket: f64,
    /// Share of attendances that required parts (0-100)
    pub pct_with_parts: f64,
    /// Average handling time in hours
    pub handling_hours: f64,
    /// Customers returning within 30 days (0-100)
    pub recurrence_rate: f64,
    pub revenue: f64,
    /// Always `revenue * realized_loss_ratio / 100`
    pub cost: f64,
    pub budgeted_loss_ratio: f64,
    pub realized_loss_ratio: f64,
    pub interest_rate: f64,
    pub accident_index: f64,
    pub nps: f64,
    /// Previous month revenue (row 0 holds the series mean)
    pub prev_revenue: f64,
    /// Previous month realized loss ratio (row 0 holds the series mean)
    pub prev_loss_ratio: f64,
    /// Previous month budgeted loss ratio (row 0 holds the series mean)
    pub prev_budgeted_loss_ratio: f64,
}

/// Whether a higher value of a metric is good news
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Numeric columns of [`MonthlyRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Revenue,
    Cost,
    RealizedLossRatio,
    BudgetedLossRatio,
    Attendance,
    AverageTicket,
    PctWithParts,
    HandlingHours,
    RecurrenceRate,
    Nps,
    InterestRate,
    AccidentIndex,
    PrevRevenue,
    PrevLossRatio,
    PrevBudgetedLossRatio,
    MonthIndex,
}

impl Variable {
    pub const ALL: [Variable; 16] = [
        Variable::Revenue,
        Variable::Cost,
        Variable::RealizedLossRatio,
        Variable::BudgetedLossRatio,
        Variable::Attendance,
        Variable::AverageTicket,
        Variable::PctWithParts,
        Variable::HandlingHours,
        Variable::RecurrenceRate,
        Variable::Nps,
        Variable::InterestRate,
        Variable::AccidentIndex,
        Variable::PrevRevenue,
        Variable::PrevLossRatio,
        Variable::PrevBudgetedLossRatio,
        Variable::MonthIndex,
    ];

    /// Variables screened for correlations by default
    pub const CORRELATION_SET: [Variable; 8] = [
        Variable::Revenue,
        Variable::RealizedLossRatio,
        Variable::BudgetedLossRatio,
        Variable::Attendance,
        Variable::AverageTicket,
        Variable::Nps,
        Variable::HandlingHours,
        Variable::RecurrenceRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variable::Revenue => "revenue",
            Variable::Cost => "cost",
            Variable::RealizedLossRatio => "realized_loss_ratio",
            Variable::BudgetedLossRatio => "budgeted_loss_ratio",
            Variable::Attendance => "attendance_count",
            Variable::AverageTicket => "average_ticket",
            Variable::PctWithParts => "pct_with_parts",
            Variable::HandlingHours => "handling_hours",
            Variable::RecurrenceRate => "recurrence_rate",
            Variable::Nps => "nps",
            Variable::InterestRate => "interest_rate",
            Variable::AccidentIndex => "accident_index",
            Variable::PrevRevenue => "prev_revenue",
            Variable::PrevLossRatio => "prev_loss_ratio",
            Variable::PrevBudgetedLossRatio => "prev_budgeted_loss_ratio",
            Variable::MonthIndex => "month_index",
        }
    }

    pub fn from_name(name: &str) -> Option<Variable> {
        Variable::ALL.iter().copied().find(|v| v.name() == name)
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            Variable::Revenue | Variable::Nps | Variable::Attendance => Polarity::HigherIsBetter,
            _ => Polarity::LowerIsBetter,
        }
    }

    /// Read this variable from a record
    pub fn value(&self, record: &MonthlyRecord) -> f64 {
        match self {
            Variable::Revenue => record.revenue,
            Variable::Cost => record.cost,
            Variable::RealizedLossRatio => record.realized_loss_ratio,
            Variable::BudgetedLossRatio => record.budgeted_loss_ratio,
            Variable::Attendance => record.attendance as f64,
            Variable::AverageTicket => record.average_ticket,
            Variable::PctWithParts => record.pct_with_parts,
            Variable::HandlingHours => record.handling_hours,
            Variable::RecurrenceRate => record.recurrence_rate,
            Variable::Nps => record.nps,
            Variable::InterestRate => record.interest_rate,
            Variable::AccidentIndex => record.accident_index,
            Variable::PrevRevenue => record.prev_revenue,
            Variable::PrevLossRatio => record.prev_loss_ratio,
            Variable::PrevBudgetedLossRatio => record.prev_budgeted_loss_ratio,
            Variable::MonthIndex => record.month_index as f64,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable, date-ordered table of monthly records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTable {
    records: Vec<MonthlyRecord>,
}

impl MonthlyTable {
    /// Wrap records, checking that dates strictly increase
    pub fn new(records: Vec<MonthlyRecord>) -> Result<Self> {
        if let Some(pair) = records.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(RevenueError::DataError(format!(
                "records out of order: {} is not after {}",
                pair[1].date, pair[0].date
            )));
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[MonthlyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&MonthlyRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&MonthlyRecord> {
        self.records.last()
    }

    /// Extract one column in date order
    pub fn column(&self, variable: Variable) -> Vec<f64> {
        self.records.iter().map(|r| variable.value(r)).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MonthlyRecord> {
        self.records.iter()
    }

    /// Write the table as CSV (header + one line per month)
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a MonthlyTable {
    type Item = &'a MonthlyRecord;
    type IntoIter = std::slice::Iter<'a, MonthlyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
