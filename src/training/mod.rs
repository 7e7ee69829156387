//! Revenue model training
//!
//! - [`linear_models`] - OLS on standardised columns (Cholesky, Gauss-Jordan fallback)
//! - [`metrics`] - held-out regression metrics
//! - [`trainer`] - chronological split, fit and the immutable [`TrainedModel`]

pub mod linear_models;
pub mod metrics;
pub mod trainer;

pub use linear_models::LinearRegression;
pub use metrics::{mape, r2_score, RegressionMetrics};
pub use trainer::{train, FeatureImportance, RevenueTrainer, SplitSummary, TrainedModel, MIN_TRAINING_ROWS};
