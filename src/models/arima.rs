//! ARIMA-family models.
//!
//! A deliberately lightweight take on Box-Jenkins: differencing handles
//! trend/seasonality, AR coefficients come from per-lag autocorrelations with
//! a joint damping cap, and MA orders contribute only to the AIC parameter
//! count. That keeps every fit closed-form and fast enough to grid-search.

use std::fmt;

use crate::error::{AnalysisError, Result};
use crate::models::{
    finalize, validate_inputs, FittedParams, ForecastMetrics, ForecastResult,
};
use crate::utils::{autocorrelation, mean};

/// Combined magnitude cap on the AR coefficients; keeps the recursive
/// forecast from diverging.
const AR_DAMPING_CAP: f64 = 0.95;

/// Candidate values for every order during the auto-ARIMA grid search.
const ORDER_GRID: [usize; 3] = [0, 1, 2];

/// Non-seasonal `(p, d, q)` and seasonal `(P, D, Q)[s]` orders of a SARIMA
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SarimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub season_length: usize,
}

impl SarimaOrder {
    /// Plain ARIMA order with no seasonal part.
    pub fn non_seasonal(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            ..Self::default()
        }
    }

    /// Whether any seasonal order is active at a usable season length.
    pub fn is_seasonal(&self) -> bool {
        self.season_length >= 2 && self.seasonal_p + self.seasonal_d + self.seasonal_q > 0
    }

    /// Parameter count used in the AIC penalty: AR and MA orders plus the
    /// mean term.
    fn param_count(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q + 1
    }
}

impl fmt::Display for SarimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_seasonal() {
            write!(
                f,
                "SARIMA({},{},{})({},{},{})[{}]",
                self.p,
                self.d,
                self.q,
                self.seasonal_p,
                self.seasonal_d,
                self.seasonal_q,
                self.season_length
            )
        } else {
            write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
        }
    }
}

/// Akaike information criterion from one-step residuals.
///
/// Approximates `2k - 2 ln L` as `2k + n·ln(RSS/n)`; an empty residual set
/// carries no information and scores `f64::INFINITY`.
pub fn compute_aic(residuals: &[f64], param_count: usize) -> f64 {
    if residuals.is_empty() {
        return f64::INFINITY;
    }
    let n = residuals.len() as f64;
    let rss: f64 = residuals.iter().map(|e| e * e).sum();
    2.0 * param_count as f64 + n * (rss.max(1e-12) / n).ln()
}

/// Simple ARIMA(1,1,0): first differences forecast through their lag-1
/// autocorrelation, then integrated back to levels.
///
/// A series shorter than two points cannot be differenced and falls back to
/// repeating the last value.
pub fn arima_110(values: &[f64], horizon: usize) -> Result<ForecastResult> {
    validate_inputs(values, horizon)?;

    let n = values.len();
    let order = SarimaOrder::non_seasonal(1, 1, 0);

    if n < 2 {
        return finalize(ForecastResult {
            forecast: vec![values[n - 1]; horizon],
            model_label: order.to_string(),
            message: "Series too short to difference; last value held flat.".to_string(),
            params: Some(FittedParams::Sarima(order)),
            metrics: None,
        });
    }

    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let mean_diff = mean(&diffs);
    let mut phi = autocorrelation(&diffs, 1);
    if !phi.is_finite() {
        phi = 0.0;
    }
    phi = phi.clamp(-AR_DAMPING_CAP, AR_DAMPING_CAP);

    let mut level = values[n - 1];
    let mut diff = diffs[diffs.len() - 1];
    let mut forecast = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        diff = mean_diff + phi * (diff - mean_diff);
        level += diff;
        forecast.push(level);
    }

    finalize(ForecastResult {
        forecast,
        model_label: order.to_string(),
        message: "First differences projected by their lag-1 autocorrelation.".to_string(),
        params: Some(FittedParams::Sarima(order)),
        metrics: None,
    })
}

/// Fit a specific SARIMA order and forecast `horizon` steps.
///
/// Errors with [`AnalysisError::InsufficientData`] when the requested
/// differencing exhausts the series.
pub fn run_arima(values: &[f64], horizon: usize, order: SarimaOrder) -> Result<ForecastResult> {
    validate_inputs(values, horizon)?;

    let fit = fit_sarima(values, order)?;
    let forecast = fit.forecast(horizon);

    finalize(ForecastResult {
        forecast,
        model_label: order.to_string(),
        message: "Differenced series with autocorrelation-fitted AR terms.".to_string(),
        params: Some(FittedParams::Sarima(order)),
        metrics: Some(ForecastMetrics {
            mae: fit.mae.is_finite().then_some(fit.mae),
            smape: None,
            aic: fit.aic.is_finite().then_some(fit.aic),
        }),
    })
}

/// Grid-search `(p,d,q)` and, when `season_length >= 2`, `(P,D,Q)` over
/// `{0,1,2}` and forecast with the minimum-AIC configuration.
pub fn auto_arima(values: &[f64], horizon: usize, season_length: usize) -> Result<ForecastResult> {
    validate_inputs(values, horizon)?;

    let mut best: Option<SarimaFit> = None;
    for order in order_grid(season_length) {
        let Ok(fit) = fit_sarima(values, order) else {
            continue;
        };
        if best.as_ref().map_or(true, |b| fit.aic < b.aic) {
            best = Some(fit);
        }
    }

    let fit = best.ok_or_else(|| {
        AnalysisError::ComputationError("no ARIMA configuration could be fitted".to_string())
    })?;
    let forecast = fit.forecast(horizon);

    finalize(ForecastResult {
        forecast,
        model_label: fit.order.to_string(),
        message: "Lowest AIC across the (p,d,q)(P,D,Q) grid.".to_string(),
        params: Some(FittedParams::Sarima(fit.order)),
        metrics: Some(ForecastMetrics {
            mae: fit.mae.is_finite().then_some(fit.mae),
            smape: None,
            aic: fit.aic.is_finite().then_some(fit.aic),
        }),
    })
}

/// Enumerate every candidate order for the grid search, non-seasonal orders
/// varying fastest.
fn order_grid(season_length: usize) -> Vec<SarimaOrder> {
    let seasonal: &[usize] = if season_length >= 2 { &ORDER_GRID } else { &[0] };
    let mut orders = Vec::new();
    for &seasonal_p in seasonal {
        for &seasonal_d in seasonal {
            for &seasonal_q in seasonal {
                for &p in &ORDER_GRID {
                    for &d in &ORDER_GRID {
                        for &q in &ORDER_GRID {
                            orders.push(SarimaOrder {
                                p,
                                d,
                                q,
                                seasonal_p,
                                seasonal_d,
                                seasonal_q,
                                season_length: if season_length >= 2 { season_length } else { 0 },
                            });
                        }
                    }
                }
            }
        }
    }
    orders
}

/// A fitted SARIMA configuration, ready to forecast.
struct SarimaFit {
    order: SarimaOrder,
    /// Series snapshots taken before each differencing pass, in application
    /// order; integration pops them in reverse.
    bases: Vec<(usize, Vec<f64>)>,
    /// Fully differenced series the AR terms operate on.
    diffed: Vec<f64>,
    /// `(lag, coefficient)` pairs, damped so their magnitudes sum below the
    /// stability cap.
    coeffs: Vec<(usize, f64)>,
    mu: f64,
    aic: f64,
    mae: f64,
}

fn fit_sarima(values: &[f64], order: SarimaOrder) -> Result<SarimaFit> {
    let mut current = values.to_vec();
    let mut bases = Vec::new();

    for _ in 0..order.d {
        if current.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                needed: 2,
                got: current.len(),
            });
        }
        let next = difference(&current, 1);
        bases.push((1, std::mem::replace(&mut current, next)));
    }

    let s = order.season_length;
    for _ in 0..order.seasonal_d {
        if s < 2 || current.len() <= s {
            return Err(AnalysisError::InsufficientData {
                needed: s + 1,
                got: current.len(),
            });
        }
        let next = difference(&current, s);
        bases.push((s, std::mem::replace(&mut current, next)));
    }

    let mu = mean(&current);

    let mut lags: Vec<usize> = (1..=order.p).collect();
    if s >= 2 {
        for j in 1..=order.seasonal_p {
            let lag = j * s;
            if !lags.contains(&lag) {
                lags.push(lag);
            }
        }
    }
    lags.retain(|&lag| lag < current.len());

    let mut coeffs: Vec<(usize, f64)> = lags
        .iter()
        .map(|&lag| {
            let phi = autocorrelation(&current, lag);
            (lag, if phi.is_finite() { phi } else { 0.0 })
        })
        .collect();
    let total: f64 = coeffs.iter().map(|(_, phi)| phi.abs()).sum();
    if total > AR_DAMPING_CAP {
        let scale = AR_DAMPING_CAP / total;
        for (_, phi) in &mut coeffs {
            *phi *= scale;
        }
    }

    // One-step in-sample predictions wherever every lag is available.
    let max_lag = coeffs.iter().map(|&(lag, _)| lag).max().unwrap_or(0);
    let residuals: Vec<f64> = (max_lag..current.len())
        .map(|t| {
            let pred = mu
                + coeffs
                    .iter()
                    .map(|&(lag, phi)| phi * (current[t - lag] - mu))
                    .sum::<f64>();
            current[t] - pred
        })
        .collect();

    let aic = compute_aic(&residuals, order.param_count());
    let mae = if residuals.is_empty() {
        f64::INFINITY
    } else {
        residuals.iter().map(|e| e.abs()).sum::<f64>() / residuals.len() as f64
    };

    Ok(SarimaFit {
        order,
        bases,
        diffed: current,
        coeffs,
        mu,
        aic,
        mae,
    })
}

fn difference(values: &[f64], lag: usize) -> Vec<f64> {
    (lag..values.len()).map(|t| values[t] - values[t - lag]).collect()
}

impl SarimaFit {
    /// Forecast on the differenced scale, then undo the differencing stack.
    fn forecast(&self, horizon: usize) -> Vec<f64> {
        let base_len = self.diffed.len();
        let mut extended = self.diffed.clone();
        for _ in 0..horizon {
            let t = extended.len();
            let pred = self.mu
                + self
                    .coeffs
                    .iter()
                    .map(|&(lag, phi)| phi * (extended[t - lag] - self.mu))
                    .sum::<f64>();
            extended.push(pred);
        }
        let mut forecast: Vec<f64> = extended[base_len..].to_vec();

        for &(lag, ref base) in self.bases.iter().rev() {
            let mut rebuilt: Vec<f64> = Vec::with_capacity(forecast.len());
            for (i, &df) in forecast.iter().enumerate() {
                // Differencing only succeeds when base.len() > lag, so
                // idx - lag never underflows.
                let idx = base.len() + i;
                let prev = if idx - lag < base.len() {
                    base[idx - lag]
                } else {
                    rebuilt[idx - lag - base.len()]
                };
                rebuilt.push(df + prev);
            }
            forecast = rebuilt;
        }
        forecast
    }
}
