//! Revenue Insights - revenue model and statistical insight engine
//!
//! This crate models the monthly revenue of a roadside-assistance and
//! auto-parts operation:
//! - Deterministic synthetic history with seasonal, interdependent drivers
//! - Multivariate OLS with lag, interaction and month-dummy features
//! - What-if prediction with residual-based confidence bands
//! - Statistical analyses feeding narrative business insights
//!
//! # Modules
//!
//! ## Core
//! - [`data`] - Monthly records and the synthetic generator
//! - [`features`] - Feature schema and design-matrix construction
//! - [`training`] - OLS fit, chronological split and metrics
//! - [`inference`] - Scenario prediction
//!
//! ## Analysis
//! - [`stats`] - Correlation, trend, distribution, comparison, capability, intervals
//! - [`insights`] - Rule-based insights, recommendations and reports
//!
//! ## Infrastructure
//! - [`cache`] - Memoised tables and models
//! - [`config`] - Serde-backed configuration
//! - [`cli`] - Command-line interface
//!
//! ```no_run
//! use revenue_insights::prelude::*;
//!
//! let table = generate(48)?;
//! let model = train(&table)?;
//! let scenario = Scenario::new()
//!     .with("attendance_count", 1000.0)
//!     .with("average_ticket", 500.0)
//!     .with_target_month(7);
//! let revenue = predict(&model, &scenario)?;
//! # Ok::<(), revenue_insights::RevenueError>(())
//! ```

// Core error handling
pub mod error;
pub mod config;

// Core modules
pub mod data;
pub mod features;
pub mod training;
pub mod inference;

// Analysis
pub mod stats;
pub mod insights;

// Infrastructure
pub mod cache;
pub mod cli;

pub use error::{Result, RevenueError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, RevenueError};

    // Configuration
    pub use crate::config::{AppConfig, BusinessTargets, GeneratorConfig, TimeIndexPolicy, TrainingConfig};

    // Data
    pub use crate::data::{generate, MonthlyRecord, MonthlyTable, Polarity, SyntheticGenerator, Variable};

    // Features and training
    pub use crate::features::{FeatureEngineer, FeatureSchema};
    pub use crate::training::{train, RegressionMetrics, RevenueTrainer, TrainedModel};

    // Inference
    pub use crate::inference::{predict, predict_with_interval, Predictor, Scenario};

    // Statistics
    pub use crate::stats::{
        compare_periods, describe, mean_confidence_interval, prediction_interval, process_capability,
        screen_correlations, temporal_trend, SpecLimits, ValueDomain,
    };

    // Insights
    pub use crate::insights::{analysis_report, Insight, InsightEngine};

    // Caching
    pub use crate::cache::AnalyticsCache;
}
