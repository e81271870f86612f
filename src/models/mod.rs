//! Demand forecasting models.
//!
//! Every model maps `(series, horizon, parameters)` to a [`ForecastResult`]
//! and shares the same guarantees: the forecast vector has exactly `horizon`
//! finite entries, with negative demand clamped to zero.

use std::fmt;

use crate::error::{AnalysisError, Result};

mod arima;
mod baseline;
mod ets;
mod holt_winters;
mod intermittent;

pub use arima::{arima_110, auto_arima, compute_aic, run_arima, SarimaOrder};
pub use baseline::{linear_trend, moving_average};
pub use ets::{ets_auto, EtsCandidate, EtsSelection};
pub use holt_winters::holt_winters;
pub use intermittent::{croston, intermittent_share, sba, tsb};

/// Trend or seasonal component kind of an ETS configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Component {
    #[default]
    None,
    Additive,
    Multiplicative,
}

impl Component {
    pub fn as_str(self) -> &'static str {
        match self {
            Component::None => "none",
            Component::Additive => "additive",
            Component::Multiplicative => "multiplicative",
        }
    }

    /// Single-letter code used in ETS labels.
    fn letter(self) -> char {
        match self {
            Component::None => 'N',
            Component::Additive => 'A',
            Component::Multiplicative => 'M',
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fitted configuration the model settled on, for reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FittedParams {
    Sarima(SarimaOrder),
    Ets {
        trend: Component,
        seasonal: Component,
    },
}

/// Backtest and fit-quality metrics a model chooses to report.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForecastMetrics {
    pub mae: Option<f64>,
    pub smape: Option<f64>,
    pub aic: Option<f64>,
}

/// Output of a single model run.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Point forecast, one finite non-negative value per horizon step.
    pub forecast: Vec<f64>,
    /// Human-readable name of the fitted model, e.g. `ETS(N,M)`.
    pub model_label: String,
    /// One-sentence description of how the forecast was produced.
    pub message: String,
    pub params: Option<FittedParams>,
    pub metrics: Option<ForecastMetrics>,
}

/// The closed set of forecasting models, with their tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForecastModel {
    MovingAverage { window: usize },
    LinearTrend,
    HoltWinters { season_length: usize },
    Arima,
    AutoArima { season_length: usize },
    EtsAuto { season_length: usize },
    Croston { alpha: f64 },
    Sba { alpha: f64 },
    Tsb { alpha: f64, beta: f64 },
}

impl ForecastModel {
    /// Stable machine key, used in rankings and exports.
    pub fn key(&self) -> &'static str {
        match self {
            ForecastModel::MovingAverage { .. } => "ma",
            ForecastModel::LinearTrend => "trend",
            ForecastModel::HoltWinters { .. } => "holt",
            ForecastModel::Arima => "arima",
            ForecastModel::AutoArima { .. } => "auto_arima",
            ForecastModel::EtsAuto { .. } => "ets",
            ForecastModel::Croston { .. } => "croston",
            ForecastModel::Sba { .. } => "sba",
            ForecastModel::Tsb { .. } => "tsb",
        }
    }

    /// Display name for reports and ranking tables.
    pub fn label(&self) -> &'static str {
        match self {
            ForecastModel::MovingAverage { .. } => "Moving average",
            ForecastModel::LinearTrend => "Linear trend",
            ForecastModel::HoltWinters { .. } => "Holt-Winters",
            ForecastModel::Arima => "ARIMA(1,1,0)",
            ForecastModel::AutoArima { .. } => "Auto-ARIMA",
            ForecastModel::EtsAuto { .. } => "ETS (auto)",
            ForecastModel::Croston { .. } => "Croston",
            ForecastModel::Sba { .. } => "Croston-SBA",
            ForecastModel::Tsb { .. } => "TSB",
        }
    }
}

/// Run `model` against `values` and forecast `horizon` steps ahead.
pub fn forecast(values: &[f64], horizon: usize, model: &ForecastModel) -> Result<ForecastResult> {
    match *model {
        ForecastModel::MovingAverage { window } => moving_average(values, horizon, window),
        ForecastModel::LinearTrend => linear_trend(values, horizon),
        ForecastModel::HoltWinters { season_length } => {
            holt_winters(values, horizon, season_length)
        }
        ForecastModel::Arima => arima_110(values, horizon),
        ForecastModel::AutoArima { season_length } => auto_arima(values, horizon, season_length),
        ForecastModel::EtsAuto { season_length } => {
            ets_auto(values, horizon, season_length).map(|selection| selection.result)
        }
        ForecastModel::Croston { alpha } => croston(values, horizon, alpha),
        ForecastModel::Sba { alpha } => sba(values, horizon, alpha),
        ForecastModel::Tsb { alpha, beta } => tsb(values, horizon, alpha, beta),
    }
}

/// Shared input validation: a positive horizon and a non-empty series.
pub(crate) fn validate_inputs(values: &[f64], horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(AnalysisError::InvalidParameter(
            "forecast horizon must be at least 1".to_string(),
        ));
    }
    if values.is_empty() {
        return Err(AnalysisError::EmptyData);
    }
    Ok(())
}

/// Shared output contract: clamp negative demand to zero and reject any
/// non-finite forecast value.
pub(crate) fn finalize(mut result: ForecastResult) -> Result<ForecastResult> {
    for v in &mut result.forecast {
        if !v.is_finite() {
            return Err(AnalysisError::ComputationError(format!(
                "{} produced a non-finite forecast",
                result.model_label
            )));
        }
        if *v < 0.0 {
            *v = 0.0;
        }
    }
    Ok(result)
}
