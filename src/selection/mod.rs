//! Automatic model selection by holdout backtesting.
//!
//! Every candidate model is fitted on the head of the series and scored
//! against a held-out tail; the winner is then refitted on the complete
//! series to produce the forecast that is actually reported.

use std::fmt;

use crate::error::{AnalysisError, Result};
use crate::models::{forecast, validate_inputs, ForecastModel, ForecastResult};
use crate::utils::{mae, smape};

mod tuning;

pub use tuning::{
    auto_tune_window_and_horizon, resolve_forecast_parameters, ResolvedParams, TunedParams,
    UserAdjustments,
};

/// Backtest accuracy of one candidate on the held-out tail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionMetrics {
    pub mae: f64,
    /// In percent.
    pub smape: f64,
}

/// Whether a candidate produced a scoreable backtest forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateStatus {
    Evaluated,
    Failed(String),
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateStatus::Evaluated => Ok(()),
            CandidateStatus::Failed(msg) => write!(f, "Error: {msg}"),
        }
    }
}

/// One scored candidate in the selection ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub model: ForecastModel,
    /// Composite backtest score; `f64::INFINITY` for failed candidates.
    pub score: f64,
    /// Present exactly when the candidate was evaluated.
    pub metrics: Option<SelectionMetrics>,
    pub status: CandidateStatus,
}

impl RankedCandidate {
    pub fn key(&self) -> &'static str {
        self.model.key()
    }
}

/// Outcome of a model selection run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSelection {
    /// Winning forecast, refitted on the complete series.
    pub best: ForecastResult,
    /// The model that produced [`ModelSelection::best`].
    pub best_model: ForecastModel,
    /// Backtest accuracy of the winner.
    pub metrics: SelectionMetrics,
    /// Every candidate sorted by backtest score, best first.
    pub ranking: Vec<RankedCandidate>,
}

impl ModelSelection {
    /// Machine key of the winning model.
    pub fn best_key(&self) -> &'static str {
        self.best_model.key()
    }
}

/// The standard candidate set for regular demand series.
///
/// The ranking sort is stable, so on a tied score the earlier candidate
/// wins; simpler models therefore come first. `window` doubles as the
/// season length for the seasonal candidates.
pub fn default_candidates(window: usize) -> Vec<ForecastModel> {
    vec![
        ForecastModel::MovingAverage { window },
        ForecastModel::LinearTrend,
        ForecastModel::HoltWinters {
            season_length: window,
        },
        ForecastModel::Arima,
        ForecastModel::AutoArima {
            season_length: window,
        },
        ForecastModel::EtsAuto {
            season_length: window,
        },
    ]
}

/// Backtest the default candidate set (or an explicit one) and forecast with
/// the winner.
pub fn select_best_model(
    values: &[f64],
    horizon: usize,
    window: usize,
    candidates: Option<&[ForecastModel]>,
) -> Result<ModelSelection> {
    let default = default_candidates(window);
    let candidates = candidates.unwrap_or(&default);
    run_selection(values, horizon, candidates)
}

/// Backtest the intermittent-demand candidates (Croston, SBA, TSB) and
/// forecast with the winner.
pub fn select_best_intermittent_model(
    values: &[f64],
    horizon: usize,
    alpha: f64,
    beta: f64,
) -> Result<ModelSelection> {
    let candidates = [
        ForecastModel::Croston { alpha },
        ForecastModel::Sba { alpha },
        ForecastModel::Tsb { alpha, beta },
    ];
    run_selection(values, horizon, &candidates)
}

fn run_selection(
    values: &[f64],
    horizon: usize,
    candidates: &[ForecastModel],
) -> Result<ModelSelection> {
    validate_inputs(values, horizon)?;

    let n = values.len();
    let k = horizon.min(n - 1).max(1);
    let train = &values[..n - k];
    let holdout = &values[n - k..];

    let mut ranking: Vec<RankedCandidate> = candidates
        .iter()
        .map(|&model| match forecast(train, k, &model) {
            Ok(result) => {
                let (bt_mae, bt_smape, score) = backtest_score(holdout, &result.forecast);
                let score = if score.is_finite() {
                    score
                } else {
                    f64::INFINITY
                };
                RankedCandidate {
                    model,
                    score,
                    metrics: Some(SelectionMetrics {
                        mae: bt_mae,
                        smape: bt_smape,
                    }),
                    status: CandidateStatus::Evaluated,
                }
            }
            Err(err) => RankedCandidate {
                model,
                score: f64::INFINITY,
                metrics: None,
                status: CandidateStatus::Failed(err.to_string()),
            },
        })
        .collect();

    ranking.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));

    // Refit on the complete series, walking down the ranking if the winner
    // cannot be fitted on the full history.
    let mut chosen = None;
    for candidate in &ranking {
        let Some(metrics) = candidate.metrics else {
            continue;
        };
        if let Ok(result) = forecast(values, horizon, &candidate.model) {
            chosen = Some((candidate.model, metrics, result));
            break;
        }
    }

    let Some((best_model, metrics, mut best)) = chosen else {
        return Err(AnalysisError::ComputationError(
            "no forecasting model could be fitted".to_string(),
        ));
    };

    best.message = format!(
        "Best of {} candidates by backtesting over the final {} period(s).",
        ranking.len(),
        k
    );

    Ok(ModelSelection {
        best,
        best_model,
        metrics,
        ranking,
    })
}

/// Score a backtest forecast against the holdout: `(mae, smape, composite)`.
///
/// The composite adds scale-normalized MAE to sMAPE expressed as a fraction,
/// so the two terms are both unit-free. An all-zero holdout falls back to a
/// MAE divisor of 1.
pub(crate) fn backtest_score(holdout: &[f64], predicted: &[f64]) -> (f64, f64, f64) {
    let bt_mae = mae(holdout, predicted);
    let bt_smape = smape(holdout, predicted);
    let scale = holdout.iter().map(|v| v.abs()).sum::<f64>() / holdout.len() as f64;
    let scale = if scale > 0.0 { scale } else { 1.0 };
    (bt_mae, bt_smape, bt_mae / scale + bt_smape / 100.0)
}
