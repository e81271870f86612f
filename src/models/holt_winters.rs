//! Holt-Winters triple exponential smoothing.
//!
//! Additive variant with fixed smoothing constants, sized for short monthly
//! demand series where optimizing the constants would overfit.
//!
//! The update equations:
//! - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
//! - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
//! - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
//! - Forecast: `ŷ_{t+h} = l_t + h·b_t + s_{t+h-m}`

use crate::error::Result;
use crate::models::{finalize, validate_inputs, ForecastResult};
use crate::utils::mean;

const ALPHA: f64 = 0.4;
const BETA: f64 = 0.2;
const GAMMA: f64 = 0.3;

/// Additive Holt-Winters forecast with a fixed `(α, β, γ) = (0.4, 0.2, 0.3)`.
///
/// The season length is clamped to `[2, values.len()]`. When the series is
/// shorter than two full seasons the model degrades to a flat mean forecast
/// instead of failing, so it stays usable as a selection candidate on short
/// histories.
pub fn holt_winters(values: &[f64], horizon: usize, season_length: usize) -> Result<ForecastResult> {
    validate_inputs(values, horizon)?;

    let n = values.len();
    let season = season_length.min(n).max(2);

    if n < 2 * season {
        let level = mean(values);
        return finalize(ForecastResult {
            forecast: vec![level; horizon],
            model_label: "Holt-Winters".to_string(),
            message: "Series shorter than two seasons; mean held flat.".to_string(),
            params: None,
            metrics: None,
        });
    }

    let (level, trend, seasonals) = smooth(values, season);

    let forecast = (1..=horizon)
        .map(|h| level + h as f64 * trend + seasonals[(n + h - 1) % season])
        .collect();

    finalize(ForecastResult {
        forecast,
        model_label: "Holt-Winters".to_string(),
        message: format!("Additive triple smoothing, season length {season}."),
        params: None,
        metrics: None,
    })
}

/// Run the smoothing recursion over the whole series and return the final
/// `(level, trend, seasonal indices)` state.
fn smooth(values: &[f64], season: usize) -> (f64, f64, Vec<f64>) {
    let grand_mean = mean(values);

    // Seasonal indices start from same-phase averages centered on the grand
    // mean; level from the first season; trend from season-over-season drift.
    let mut seasonals: Vec<f64> = (0..season)
        .map(|phase| {
            let phase_values: Vec<f64> = values.iter().skip(phase).step_by(season).copied().collect();
            mean(&phase_values) - grand_mean
        })
        .collect();

    let mut level = mean(&values[..season]);
    let mut trend = (0..season)
        .map(|i| (values[season + i] - values[i]) / season as f64)
        .sum::<f64>()
        / season as f64;

    for (t, &y) in values.iter().enumerate() {
        let idx = t % season;
        let s = seasonals[idx];
        let prev_level = level;

        level = ALPHA * (y - s) + (1.0 - ALPHA) * (prev_level + trend);
        trend = BETA * (level - prev_level) + (1.0 - BETA) * trend;
        seasonals[idx] = GAMMA * (y - level) + (1.0 - GAMMA) * s;
    }

    (level, trend, seasonals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stable_alternating_pattern_is_reproduced_exactly() {
        // Level 20, no trend, seasonal offsets -10/+10: every smoothing step
        // is a fixed point, so the forecast continues the pattern exactly.
        let series = [10.0, 30.0, 10.0, 30.0, 10.0, 30.0, 10.0, 30.0];
        let result = holt_winters(&series, 4, 2).unwrap();

        assert_relative_eq!(result.forecast[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(result.forecast[1], 30.0, epsilon = 1e-9);
        assert_relative_eq!(result.forecast[2], 10.0, epsilon = 1e-9);
        assert_relative_eq!(result.forecast[3], 30.0, epsilon = 1e-9);
    }

    #[test]
    fn trending_seasonal_series_keeps_both_components() {
        // Seasonal swing of +-2 on top of a steady upward drift.
        let series = [1.0, 5.0, 3.0, 7.0, 5.0, 9.0, 7.0, 11.0];
        let result = holt_winters(&series, 4, 2).unwrap();
        let f = &result.forecast;

        assert!(f[1] > f[0], "second step lands on the high phase");
        assert!(f[2] > f[0], "trend carries the low phase upward");
        assert!(f[3] > f[1], "trend carries the high phase upward");
    }

    #[test]
    fn short_series_falls_back_to_flat_mean() {
        let result = holt_winters(&[4.0, 8.0, 6.0], 2, 12).unwrap();

        assert_relative_eq!(result.forecast[0], 6.0, epsilon = 1e-10);
        assert_relative_eq!(result.forecast[1], 6.0, epsilon = 1e-10);
        assert!(result.message.contains("mean"));
    }

    #[test]
    fn season_length_is_clamped_to_at_least_two() {
        let series = [10.0, 30.0, 10.0, 30.0];
        let result = holt_winters(&series, 2, 0).unwrap();

        assert_relative_eq!(result.forecast[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(result.forecast[1], 30.0, epsilon = 1e-9);
    }

    #[test]
    fn forecast_length_matches_horizon() {
        let series: Vec<f64> = (0..24).map(|i| 50.0 + (i % 6) as f64).collect();
        let result = holt_winters(&series, 7, 6).unwrap();
        assert_eq!(result.forecast.len(), 7);
    }
}
