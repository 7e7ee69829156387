//! Engine configuration
//!
//! Every knob has a default matching the historical dashboard setup, so
//! `AppConfig::default()` reproduces the reference run (48 months, seed 42,
//! 20% hold-out, 50% loss-ratio target).

use crate::error::{Result, RevenueError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default seed of the synthetic generator
pub const DEFAULT_SEED: u64 = 42;
/// Default number of generated months
pub const DEFAULT_MONTHS: usize = 48;
/// Default chronological hold-out fraction
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Synthetic data generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of monthly rows to generate
    pub months: usize,
    /// Random seed (same seed, same table)
    pub seed: u64,
    /// First month of the series
    pub start: NaiveDate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            months: DEFAULT_MONTHS,
            seed: DEFAULT_SEED,
            start: default_start(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(months: usize) -> Self {
        Self {
            months,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = start;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.months == 0 {
            return Err(RevenueError::ConfigError(
                "months must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// How the predictor fills the `time_index` feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "value", rename_all = "snake_case")]
pub enum TimeIndexPolicy {
    /// Midpoint of the training window (round(rows / 2))
    Midpoint,
    /// Newest index seen in training
    Latest,
    /// Caller-chosen value
    Fixed(f64),
}

impl Default for TimeIndexPolicy {
    fn default() -> Self {
        TimeIndexPolicy::Midpoint
    }
}

impl TimeIndexPolicy {
    /// Resolve the policy against a training window of `rows` filtered rows
    pub fn resolve(&self, rows: usize) -> f64 {
        match *self {
            TimeIndexPolicy::Midpoint => (rows as f64 / 2.0).round(),
            TimeIndexPolicy::Latest => rows.saturating_sub(1) as f64,
            TimeIndexPolicy::Fixed(v) => v,
        }
    }
}

/// Regression training and prediction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of the lag-filtered series held out (taken from the end)
    pub test_fraction: f64,
    /// Time-index policy used when predicting scenarios
    pub time_index: TimeIndexPolicy,
    /// Lower bound applied to point predictions
    pub prediction_floor: f64,
    /// Upper bound applied to point predictions
    pub prediction_ceiling: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            time_index: TimeIndexPolicy::default(),
            prediction_floor: 100_000.0,
            prediction_ceiling: 2_000_000.0,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_time_index(mut self, policy: TimeIndexPolicy) -> Self {
        self.time_index = policy;
        self
    }

    pub fn with_prediction_bounds(mut self, floor: f64, ceiling: f64) -> Self {
        self.prediction_floor = floor;
        self.prediction_ceiling = ceiling;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(RevenueError::invalid_parameter(
                "test_fraction",
                self.test_fraction,
                "must lie strictly between 0 and 1",
            ));
        }
        if self.prediction_floor.is_nan()
            || self.prediction_ceiling.is_nan()
            || self.prediction_floor > self.prediction_ceiling
        {
            return Err(RevenueError::invalid_parameter(
                "prediction_floor",
                self.prediction_floor,
                "must be a number no greater than prediction_ceiling",
            ));
        }
        Ok(())
    }
}

/// Business targets used by the insight and recommendation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessTargets {
    /// Loss-ratio target in percent
    pub loss_ratio: f64,
    /// Upper edge of the "attention" loss-ratio band
    pub loss_ratio_attention: f64,
    /// NPS target
    pub nps: f64,
    /// Maximum average handling time in hours
    pub handling_hours: f64,
    /// Maximum recurrence rate in percent
    pub recurrence_rate: f64,
    /// Ticket growth (percent over the window) worth reporting
    pub ticket_growth_pct: f64,
    /// Minimum share of attendances with parts
    pub pct_with_parts: f64,
    /// Realized-over-budget gap (percentage points) that triggers an investigation
    pub budget_overrun: f64,
}

impl Default for BusinessTargets {
    fn default() -> Self {
        Self {
            loss_ratio: 50.0,
            loss_ratio_attention: 60.0,
            nps: 70.0,
            handling_hours: 3.0,
            recurrence_rate: 10.0,
            ticket_growth_pct: 5.0,
            pct_with_parts: 40.0,
            budget_overrun: 5.0,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub targets: BusinessTargets,
}

impl AppConfig {
    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    pub fn with_targets(mut self, targets: BusinessTargets) -> Self {
        self.targets = targets;
        self
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;
        self.training.validate()
    }
}
