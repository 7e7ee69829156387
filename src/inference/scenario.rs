//! What-if scenarios

use crate::error::{Result, RevenueError};
use crate::features::TARGET_MONTH;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sparse set of feature values plus the month being simulated
///
/// Features left out predict as 0.0, so a realistic scenario sets every
/// observed driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    values: BTreeMap<String, f64>,
    target_month: Option<u32>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_target_month(mut self, month: u32) -> Self {
        self.target_month = Some(month);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Build from loose `name -> value` pairs; `target_month` is lifted out
    pub fn from_map<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut scenario = Scenario::new();
        for (key, value) in pairs {
            let key = key.into();
            if key == TARGET_MONTH {
                if value.fract() != 0.0 || !(1.0..=12.0).contains(&value) {
                    return Err(RevenueError::invalid_parameter(
                        TARGET_MONTH,
                        value,
                        "must be a whole month between 1 and 12",
                    ));
                }
                scenario.target_month = Some(value as u32);
            } else {
                scenario.values.insert(key, value);
            }
        }
        Ok(scenario)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn target_month(&self) -> Option<u32> {
        self.target_month
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.target_month.is_none()
    }
}
