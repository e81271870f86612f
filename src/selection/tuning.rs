//! Automatic horizon/window tuning and forecast-parameter resolution.

use crate::core::Granularity;
use crate::models::moving_average;

use super::backtest_score;

const HORIZON_MIN: usize = 1;
const WINDOW_MIN: usize = 2;
const MONTH_HORIZON_MAX: usize = 18;
const MONTH_WINDOW_MAX: usize = 24;
const DAY_HORIZON_MAX: usize = 120;
const DAY_WINDOW_MAX: usize = 90;

/// Horizon and window picked by [`auto_tune_window_and_horizon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunedParams {
    pub horizon: usize,
    pub window: usize,
}

/// Which of the two forecast parameters the user has explicitly set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserAdjustments {
    pub horizon: bool,
    pub window: bool,
}

/// Final forecast parameters after clamping and optional auto-tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedParams {
    pub horizon: usize,
    pub window: usize,
    /// True when the tuner supplied at least one of the two values.
    pub tuned_used: bool,
}

/// Grid-search the horizon and smoothing window that backtest best on
/// `values`, probing with a moving-average forecast.
///
/// Horizons run up to 18 periods (capped at half the series), windows up to
/// 24 (capped at the series length minus one); each combination is scored
/// with the same composite measure the model selector uses and the first
/// minimum wins. Series too short to backtest fall back to a horizon of 1
/// and a window of 2.
pub fn auto_tune_window_and_horizon(values: &[f64]) -> TunedParams {
    let n = values.len();
    let horizon_cap = MONTH_HORIZON_MAX.min((n / 2).max(1));
    let window_cap = MONTH_WINDOW_MAX.min(n.saturating_sub(1).max(WINDOW_MIN));

    let mut best: Option<(TunedParams, f64)> = None;
    for horizon in HORIZON_MIN..=horizon_cap {
        for window in WINDOW_MIN..=window_cap {
            let k = horizon.min(n.saturating_sub(1)).max(1);
            if n <= k {
                continue;
            }
            let train = &values[..n - k];
            let holdout = &values[n - k..];
            let Ok(result) = moving_average(train, k, window) else {
                continue;
            };
            let (_, _, score) = backtest_score(holdout, &result.forecast);
            if !score.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((TunedParams { horizon, window }, score));
            }
        }
    }

    best.map_or(
        TunedParams {
            horizon: 1,
            window: 2,
        },
        |(params, _)| params,
    )
}

/// Resolve the horizon and window to forecast with.
///
/// User-adjusted values are kept; anything left alone comes from `tuner`,
/// which runs only when at least one parameter is unadjusted. Both values
/// are clamped to the granularity's valid range afterwards.
pub fn resolve_forecast_parameters(
    values: &[f64],
    granularity: Granularity,
    raw_horizon: usize,
    raw_window: usize,
    adjustments: UserAdjustments,
    tuner: impl FnOnce(&[f64]) -> TunedParams,
) -> ResolvedParams {
    let (h_lo, h_hi) = horizon_bounds(granularity);
    let (w_lo, w_hi) = window_bounds(granularity);

    if adjustments.horizon && adjustments.window {
        return ResolvedParams {
            horizon: raw_horizon.clamp(h_lo, h_hi),
            window: raw_window.clamp(w_lo, w_hi),
            tuned_used: false,
        };
    }

    let tuned = tuner(values);
    let horizon = if adjustments.horizon {
        raw_horizon
    } else {
        tuned.horizon
    };
    let window = if adjustments.window {
        raw_window
    } else {
        tuned.window
    };

    ResolvedParams {
        horizon: horizon.clamp(h_lo, h_hi),
        window: window.clamp(w_lo, w_hi),
        tuned_used: true,
    }
}

fn horizon_bounds(granularity: Granularity) -> (usize, usize) {
    match granularity {
        Granularity::Month => (HORIZON_MIN, MONTH_HORIZON_MAX),
        Granularity::Day => (HORIZON_MIN, DAY_HORIZON_MAX),
    }
}

fn window_bounds(granularity: Granularity) -> (usize, usize) {
    match granularity {
        Granularity::Month => (WINDOW_MIN, MONTH_WINDOW_MAX),
        Granularity::Day => (WINDOW_MIN, DAY_WINDOW_MAX),
    }
}
