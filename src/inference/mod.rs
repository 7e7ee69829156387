//! What-if simulation on a trained revenue model
//!
//! A [`Scenario`] names feature values; the [`Predictor`] rebuilds the full
//! feature vector from the model's schema (interaction, time index and month
//! dummies are always derived) and clips the result to plausible revenue.

mod predictor;
mod scenario;

pub use predictor::{predict, predict_with_interval, Predictor};
pub use scenario::Scenario;
