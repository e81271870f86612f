//! Baseline forecasting models.
//!
//! Moving average and linear trend cover the "no model" end of the suite:
//! cheap, interpretable, and the yardstick every other candidate has to beat
//! during model selection.

use crate::error::Result;
use crate::models::{finalize, validate_inputs, ForecastResult};
use crate::utils::linear_fit;

/// Forecast by repeating the mean of the last `window` observations.
///
/// The window is clamped to `[1, values.len()]`, so a window larger than the
/// series degrades to the overall mean and a zero window to the last value.
pub fn moving_average(values: &[f64], horizon: usize, window: usize) -> Result<ForecastResult> {
    validate_inputs(values, horizon)?;

    let w = window.clamp(1, values.len());
    let tail = &values[values.len() - w..];
    let level = tail.iter().sum::<f64>() / w as f64;

    finalize(ForecastResult {
        forecast: vec![level; horizon],
        model_label: "Moving average".to_string(),
        message: format!("Mean of the last {w} period(s), held flat."),
        params: None,
        metrics: None,
    })
}

/// Forecast by extrapolating an ordinary least-squares line fit against the
/// time index `1..=n`.
pub fn linear_trend(values: &[f64], horizon: usize) -> Result<ForecastResult> {
    validate_inputs(values, horizon)?;

    let (intercept, slope) = linear_fit(values);
    let n = values.len();
    let forecast = (1..=horizon)
        .map(|h| intercept + slope * (n + h) as f64)
        .collect();

    finalize(ForecastResult {
        forecast,
        model_label: "Linear trend".to_string(),
        message: "Least-squares trend line extrapolated forward.".to_string(),
        params: None,
        metrics: None,
    })
}
