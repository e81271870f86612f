//! Automatic ETS configuration search.
//!
//! Fits every admissible {none, additive, multiplicative} trend x seasonal
//! combination with the same fixed smoothing constants, backtests each on a
//! held-out tail, and keeps the configuration with the lowest sMAPE.

use crate::error::Result;
use crate::models::{
    finalize, validate_inputs, Component, FittedParams, ForecastMetrics, ForecastResult,
};
use crate::utils::{mae, mean, smape};

const ALPHA: f64 = 0.4;
const BETA: f64 = 0.2;
const GAMMA: f64 = 0.3;

const COMPONENTS: [Component; 3] = [
    Component::None,
    Component::Additive,
    Component::Multiplicative,
];

/// One scored configuration from the backtest grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtsCandidate {
    pub trend: Component,
    pub seasonal: Component,
    /// Backtested sMAPE, in percent; `f64::INFINITY` when the fit degenerated.
    pub smape: f64,
}

/// Winning ETS forecast plus the full candidate ranking, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct EtsSelection {
    pub result: ForecastResult,
    pub ranking: Vec<EtsCandidate>,
}

/// Backtest every admissible ETS configuration and forecast with the winner
/// refitted on the complete series.
///
/// The holdout covers `max(horizon, 2·season)` periods, bounded to at most
/// half the series. Seasonal components require a season of at least 2 and
/// two full seasons of training data; multiplicative components additionally
/// require strictly positive training values.
pub fn ets_auto(values: &[f64], horizon: usize, season_length: usize) -> Result<EtsSelection> {
    validate_inputs(values, horizon)?;

    let n = values.len();
    if n < 2 {
        let result = finalize(ForecastResult {
            forecast: vec![values[0]; horizon],
            model_label: label(Component::None, Component::None),
            message: "History too short to backtest ETS configurations.".to_string(),
            params: Some(FittedParams::Ets {
                trend: Component::None,
                seasonal: Component::None,
            }),
            metrics: None,
        })?;
        return Ok(EtsSelection {
            result,
            ranking: Vec::new(),
        });
    }

    let season = season_length;
    let k = horizon.max(2 * season).min(n / 2).max(1);
    let train = &values[..n - k];
    let holdout = &values[n - k..];
    let all_positive = train.iter().all(|&v| v > 0.0);

    let mut ranking = Vec::new();
    for trend in COMPONENTS {
        for seasonal in COMPONENTS {
            if !admissible(trend, seasonal, train.len(), season, all_positive) {
                continue;
            }
            let backcast = fit_and_forecast(train, k, season, trend, seasonal);
            let score = smape(holdout, &backcast);
            ranking.push(EtsCandidate {
                trend,
                seasonal,
                smape: if score.is_finite() { score } else { f64::INFINITY },
            });
        }
    }
    ranking.sort_by(|a, b| {
        a.smape
            .partial_cmp(&b.smape)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // (none, none) is always admissible, so the ranking is never empty here.
    let best = ranking[0];
    let backcast = fit_and_forecast(train, k, season, best.trend, best.seasonal);
    let best_mae = mae(holdout, &backcast);

    let forecast = fit_and_forecast(values, horizon, season, best.trend, best.seasonal);
    let result = finalize(ForecastResult {
        forecast,
        model_label: label(best.trend, best.seasonal),
        message: format!(
            "Lowest sMAPE of {} configuration(s) backtested over {} period(s).",
            ranking.len(),
            k
        ),
        params: Some(FittedParams::Ets {
            trend: best.trend,
            seasonal: best.seasonal,
        }),
        metrics: Some(ForecastMetrics {
            mae: best_mae.is_finite().then_some(best_mae),
            smape: best.smape.is_finite().then_some(best.smape),
            aic: None,
        }),
    })?;

    Ok(EtsSelection { result, ranking })
}

fn label(trend: Component, seasonal: Component) -> String {
    format!("ETS({},{})", trend.letter(), seasonal.letter())
}

fn admissible(
    trend: Component,
    seasonal: Component,
    train_len: usize,
    season: usize,
    all_positive: bool,
) -> bool {
    if seasonal != Component::None && (season < 2 || train_len < 2 * season) {
        return false;
    }
    if (trend == Component::Multiplicative || seasonal == Component::Multiplicative)
        && !all_positive
    {
        return false;
    }
    if trend != Component::None && train_len < 2 {
        return false;
    }
    true
}

/// Run the smoothing recursion over `values` and forecast `horizon` steps.
///
/// Callers guarantee `values` is non-empty and, for seasonal components,
/// holds at least two full seasons.
fn fit_and_forecast(
    values: &[f64],
    horizon: usize,
    season: usize,
    trend_kind: Component,
    seasonal_kind: Component,
) -> Vec<f64> {
    let n = values.len();
    let seasonal_active = seasonal_kind != Component::None;

    let mut seasonals: Vec<f64> = if seasonal_active {
        let grand = mean(values);
        (0..season)
            .map(|phase| {
                let phase_values: Vec<f64> =
                    values.iter().skip(phase).step_by(season).copied().collect();
                let avg = mean(&phase_values);
                match seasonal_kind {
                    Component::Additive => avg - grand,
                    Component::Multiplicative => {
                        if grand.abs() > f64::EPSILON {
                            avg / grand
                        } else {
                            1.0
                        }
                    }
                    Component::None => 0.0,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut level = if seasonal_active {
        mean(&values[..season])
    } else {
        values[0]
    };

    let mut trend = match trend_kind {
        Component::None => 0.0,
        Component::Additive => {
            if seasonal_active {
                (0..season)
                    .map(|i| (values[season + i] - values[i]) / season as f64)
                    .sum::<f64>()
                    / season as f64
            } else if n >= 2 {
                values[1] - values[0]
            } else {
                0.0
            }
        }
        Component::Multiplicative => {
            if seasonal_active {
                let first = mean(&values[..season]);
                let second = mean(&values[season..2 * season]);
                if first.abs() > f64::EPSILON && second / first > 0.0 {
                    (second / first).powf(1.0 / season as f64)
                } else {
                    1.0
                }
            } else if n >= 2 && values[0].abs() > f64::EPSILON {
                values[1] / values[0]
            } else {
                1.0
            }
        }
    };

    for (t, &y) in values.iter().enumerate() {
        let idx = if seasonal_active { t % season } else { 0 };
        let s = if seasonal_active { seasonals[idx] } else { 0.0 };

        let deseasoned = match seasonal_kind {
            Component::None => y,
            Component::Additive => y - s,
            Component::Multiplicative => {
                if s.abs() > f64::EPSILON {
                    y / s
                } else {
                    y
                }
            }
        };

        let prev_level = level;
        let base = match trend_kind {
            Component::None => prev_level,
            Component::Additive => prev_level + trend,
            Component::Multiplicative => prev_level * trend,
        };
        level = ALPHA * deseasoned + (1.0 - ALPHA) * base;

        match trend_kind {
            Component::None => {}
            Component::Additive => {
                trend = BETA * (level - prev_level) + (1.0 - BETA) * trend;
            }
            Component::Multiplicative => {
                if prev_level.abs() > f64::EPSILON {
                    trend = BETA * (level / prev_level) + (1.0 - BETA) * trend;
                }
            }
        }

        if seasonal_active {
            seasonals[idx] = match seasonal_kind {
                Component::Additive => GAMMA * (y - level) + (1.0 - GAMMA) * s,
                Component::Multiplicative => {
                    if level.abs() > f64::EPSILON {
                        GAMMA * (y / level) + (1.0 - GAMMA) * s
                    } else {
                        s
                    }
                }
                Component::None => s,
            };
        }
    }

    (1..=horizon)
        .map(|h| {
            let base = match trend_kind {
                Component::None => level,
                Component::Additive => level + h as f64 * trend,
                Component::Multiplicative => level * trend.powi(h as i32),
            };
            match seasonal_kind {
                Component::None => base,
                Component::Additive => base + seasonals[(n + h - 1) % season],
                Component::Multiplicative => base * seasonals[(n + h - 1) % season],
            }
        })
        .collect()
}
