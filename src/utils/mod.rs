//! Shared numeric helpers for classification and forecasting.

pub mod metrics;
pub mod stats;

pub use metrics::{mae, smape};
pub use stats::{autocorrelation, linear_fit, mean, std_dev, variance};
