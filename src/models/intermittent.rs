//! Intermittent-demand models.
//!
//! Croston-style methods split a sparse series into non-zero demand sizes and
//! the gaps between them, smooth each part separately, and recombine them
//! into an expected demand per period. TSB smooths a demand probability
//! instead of the gap length, which lets it react to obsolescence.

use crate::error::Result;
use crate::models::{finalize, validate_inputs, ForecastResult};
use crate::utils::mean;

/// Fraction of zero-demand periods in the series; 0 for an empty series.
///
/// The model selector switches to the intermittent family when this share
/// gets high.
pub fn intermittent_share(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| v == 0.0).count() as f64 / values.len() as f64
}

/// Croston's method: smoothed demand size divided by smoothed inter-demand
/// interval, held flat across the horizon.
pub fn croston(values: &[f64], horizon: usize, alpha: f64) -> Result<ForecastResult> {
    validate_inputs(values, horizon)?;
    let alpha = alpha.clamp(0.01, 0.99);

    let rate = match croston_levels(values, alpha) {
        Some((size, interval)) => size / interval,
        None => 0.0,
    };

    finalize(ForecastResult {
        forecast: vec![rate; horizon],
        model_label: "Croston".to_string(),
        message: format!("Smoothed demand size over smoothed interval (alpha {alpha:.2})."),
        params: None,
        metrics: None,
    })
}

/// Syntetos-Boylan approximation: Croston's rate scaled by `1 - alpha/2` to
/// remove its positive bias.
pub fn sba(values: &[f64], horizon: usize, alpha: f64) -> Result<ForecastResult> {
    validate_inputs(values, horizon)?;
    let alpha = alpha.clamp(0.01, 0.99);

    let rate = match croston_levels(values, alpha) {
        Some((size, interval)) => size / interval * (1.0 - alpha / 2.0),
        None => 0.0,
    };

    finalize(ForecastResult {
        forecast: vec![rate; horizon],
        model_label: "Croston-SBA".to_string(),
        message: format!("Bias-corrected Croston rate (alpha {alpha:.2})."),
        params: None,
        metrics: None,
    })
}

/// Teunter-Syntetos-Babai: smooths a per-period demand probability together
/// with the demand size, forecasting their product.
pub fn tsb(values: &[f64], horizon: usize, alpha: f64, beta: f64) -> Result<ForecastResult> {
    validate_inputs(values, horizon)?;
    let alpha = alpha.clamp(0.01, 0.99);
    let beta = beta.clamp(0.01, 0.99);

    let nonzero: Vec<f64> = values.iter().copied().filter(|&v| v > 0.0).collect();
    let rate = if nonzero.is_empty() {
        0.0
    } else {
        let mut probability = nonzero.len() as f64 / values.len() as f64;
        let mut size = mean(&nonzero);
        for &y in values {
            if y > 0.0 {
                probability += beta * (1.0 - probability);
                size += alpha * (y - size);
            } else {
                probability *= 1.0 - beta;
            }
        }
        probability * size
    };

    finalize(ForecastResult {
        forecast: vec![rate; horizon],
        model_label: "TSB".to_string(),
        message: format!(
            "Demand probability times demand size (alpha {alpha:.2}, beta {beta:.2})."
        ),
        params: None,
        metrics: None,
    })
}

/// Final smoothed `(demand size, interval)` levels, or `None` when the series
/// holds no positive demand.
///
/// The first interval is measured from the start of the series, so a demand
/// at index `i` opens with interval `i + 1`. Intervals are always >= 1, which
/// keeps the Croston ratio well-defined.
fn croston_levels(values: &[f64], alpha: f64) -> Option<(f64, f64)> {
    let mut demands: Vec<f64> = Vec::new();
    let mut intervals: Vec<f64> = Vec::new();
    let mut last_idx: Option<usize> = None;

    for (i, &v) in values.iter().enumerate() {
        if v > 0.0 {
            demands.push(v);
            intervals.push(match last_idx {
                Some(prev) => (i - prev) as f64,
                None => (i + 1) as f64,
            });
            last_idx = Some(i);
        }
    }

    if demands.is_empty() {
        return None;
    }
    Some((ses_level(&demands, alpha), ses_level(&intervals, alpha)))
}

fn ses_level(values: &[f64], alpha: f64) -> f64 {
    let mut level = values[0];
    for &v in &values[1..] {
        level = alpha * v + (1.0 - alpha) * level;
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SPARSE: [f64; 8] = [0.0, 12.0, 0.0, 0.0, 9.0, 0.0, 0.0, 11.0];

    #[test]
    fn croston_smooths_sizes_and_intervals() {
        // Demands [12, 9, 11], intervals [2, 3, 3]; SES with alpha 0.2 leaves
        // levels 11.32 and 2.36.
        let result = croston(&SPARSE, 3, 0.2).unwrap();

        assert_eq!(result.forecast.len(), 3);
        for &v in &result.forecast {
            assert_relative_eq!(v, 11.32 / 2.36, epsilon = 1e-10);
        }
    }

    #[test]
    fn sba_corrects_croston_downward() {
        let plain = croston(&SPARSE, 3, 0.2).unwrap();
        let corrected = sba(&SPARSE, 3, 0.2).unwrap();

        assert_relative_eq!(
            corrected.forecast[0],
            plain.forecast[0] * 0.9,
            epsilon = 1e-10
        );
        let avg = |f: &[f64]| f.iter().sum::<f64>() / f.len() as f64;
        assert!(avg(&corrected.forecast) < avg(&plain.forecast));
    }

    #[test]
    fn tsb_forecast_is_flat_and_non_negative() {
        let result = tsb(&SPARSE, 3, 0.2, 0.3).unwrap();

        assert_eq!(result.forecast.len(), 3);
        for &v in &result.forecast {
            assert!(v >= 0.0);
            assert_relative_eq!(v, result.forecast[0], epsilon = 1e-12);
        }
        // Probability and size stay within the observed demand range.
        assert!(result.forecast[0] < 12.0);
    }

    #[test]
    fn all_zero_series_forecasts_zero() {
        let zeros = [0.0; 6];
        for result in [
            croston(&zeros, 2, 0.2).unwrap(),
            sba(&zeros, 2, 0.2).unwrap(),
            tsb(&zeros, 2, 0.2, 0.2).unwrap(),
        ] {
            assert_eq!(result.forecast, vec![0.0, 0.0]);
        }
    }

    #[test]
    fn single_demand_uses_lead_in_interval() {
        // One demand of 5 at index 2 opens with interval 3.
        let result = croston(&[0.0, 0.0, 5.0, 0.0], 1, 0.2).unwrap();
        assert_relative_eq!(result.forecast[0], 5.0 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn share_counts_zero_periods() {
        let share = intermittent_share(&[0.0, 0.0, 5.0, 0.0, 2.0, 0.0, 0.0, 1.0]);
        assert_relative_eq!(share, 0.625, epsilon = 1e-6);

        assert_eq!(intermittent_share(&[]), 0.0);
        assert_eq!(intermittent_share(&[3.0, 4.0]), 0.0);
    }
}
