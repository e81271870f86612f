//! Spreadsheet-ready export tables.
//!
//! Builders here return rows of [`CellValue`]s laid out exactly as they
//! should land in a worksheet: a header row first, then data, then totals
//! or selection details where the table has them.

use crate::classification::{AbcClass, ClassIndex, ClassMatrix, SkuStat, XyzClass};
use crate::core::CellValue;
use crate::error::{AnalysisError, Result};
use crate::selection::{ModelSelection, RankedCandidate};

/// Placeholder for a metric that could not be computed.
const MISSING: &str = "—";

/// One row of the forecast export: a period key plus the observed and
/// forecast quantity, either of which may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub period: String,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
}

/// One formatted line of the model-selection report.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRow {
    pub key: &'static str,
    pub label: String,
    pub mae_text: String,
    pub smape_text: String,
    pub status: String,
    pub is_best: bool,
}

/// Class-matrix table: one row per ABC class with XYZ counts, row totals,
/// and the share of all classified SKUs, closed by a totals row.
pub fn matrix_table(counts: &ClassMatrix<usize>, total_sku: usize) -> Vec<Vec<CellValue>> {
    let mut rows = Vec::with_capacity(5);
    rows.push(vec![
        CellValue::from("ABC class"),
        CellValue::from("X"),
        CellValue::from("Y"),
        CellValue::from("Z"),
        CellValue::from("Total"),
        CellValue::from("Share of SKUs"),
    ]);

    for abc in AbcClass::ALL {
        let row_total = counts.row_total(abc);
        let mut row = vec![CellValue::from(abc.as_str())];
        for xyz in XyzClass::ALL {
            row.push(CellValue::from(counts.get(abc, xyz) as f64));
        }
        row.push(CellValue::from(row_total as f64));
        row.push(CellValue::from(share_percent(row_total, total_sku)));
        rows.push(row);
    }

    let grand = counts.grand_total();
    let mut totals = vec![CellValue::from("Total")];
    for xyz in XyzClass::ALL {
        totals.push(CellValue::from(counts.column_total(xyz) as f64));
    }
    totals.push(CellValue::from(grand as f64));
    totals.push(CellValue::from(share_percent(grand, total_sku)));
    rows.push(totals);

    rows
}

/// Per-SKU table with classes, safety stock, and percentage columns.
///
/// Fractions (`share`, `cum_share`, `service_level`) are scaled to percent;
/// an undefined CoV or absent group exports as an empty cell.
pub fn sku_table(stats: &[SkuStat]) -> Vec<Vec<CellValue>> {
    let mut rows = Vec::with_capacity(stats.len() + 1);
    rows.push(vec![
        CellValue::from("SKU"),
        CellValue::from("Group"),
        CellValue::from("Total"),
        CellValue::from("ABC"),
        CellValue::from("XYZ"),
        CellValue::from("CoV"),
        CellValue::from("Safety stock"),
        CellValue::from("Service level %"),
        CellValue::from("Share %"),
        CellValue::from("Cumulative share %"),
    ]);

    for stat in stats {
        rows.push(vec![
            CellValue::from(stat.sku.clone()),
            stat.group
                .as_ref()
                .map_or(CellValue::Empty, |g| CellValue::from(g.clone())),
            CellValue::from(stat.total),
            CellValue::from(stat.abc.as_str()),
            CellValue::from(stat.xyz.as_str()),
            stat.cov.map_or(CellValue::Empty, CellValue::from),
            CellValue::from(stat.safety_stock),
            CellValue::from(stat.service_level * 100.0),
            CellValue::from(stat.share * 100.0),
            CellValue::from(stat.cum_share * 100.0),
        ]);
    }

    rows
}

/// Actual-versus-forecast table, with the model-selection details appended
/// when a selection summary is given.
///
/// Quantities render as two-decimal text so the worksheet shows aligned
/// columns; missing or non-finite values become empty cells.
pub fn forecast_table(
    rows: &[ForecastRow],
    summary: Option<&ModelSelection>,
) -> Result<Vec<Vec<CellValue>>> {
    if rows.is_empty() {
        return Err(AnalysisError::EmptyData);
    }

    let mut table = Vec::with_capacity(rows.len() + 1);
    table.push(vec![
        CellValue::from("Period"),
        CellValue::from("Actual"),
        CellValue::from("Forecast"),
    ]);
    for row in rows {
        table.push(vec![
            CellValue::from(row.period.clone()),
            two_decimals(row.actual),
            two_decimals(row.forecast),
        ]);
    }

    if let Some(selection) = summary {
        table.push(Vec::new());
        table.push(vec![
            CellValue::from("Model"),
            CellValue::from(selection.best.model_label.clone()),
        ]);
        table.push(vec![
            CellValue::from("Message"),
            CellValue::from(selection.best.message.clone()),
        ]);
        table.push(vec![
            CellValue::from("MAE"),
            CellValue::from(format_mae(selection.metrics.mae)),
        ]);
        table.push(vec![
            CellValue::from("sMAPE"),
            CellValue::from(format_smape(selection.metrics.smape)),
        ]);
        for (rank, row) in selection_rows(&selection.ranking, selection.best_key())
            .into_iter()
            .enumerate()
        {
            table.push(vec![
                CellValue::from(format!("Rank {}", rank + 1)),
                CellValue::from(row.label),
                CellValue::from(row.mae_text),
                CellValue::from(row.smape_text),
                CellValue::from(row.status),
            ]);
        }
    }

    Ok(table)
}

/// Format the selection ranking for display: metrics as fixed-precision
/// text, the winner flagged by key.
pub fn selection_rows(ranking: &[RankedCandidate], best_key: &str) -> Vec<SelectionRow> {
    ranking
        .iter()
        .map(|candidate| {
            let (mae_text, smape_text) = match candidate.metrics {
                Some(m) => (format_mae(m.mae), format_smape(m.smape)),
                None => (MISSING.to_string(), MISSING.to_string()),
            };
            SelectionRow {
                key: candidate.key(),
                label: candidate.model.label().to_string(),
                mae_text,
                smape_text,
                status: candidate.status.to_string(),
                is_best: candidate.key() == best_key,
            }
        })
        .collect()
}

fn share_percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn two_decimals(value: Option<f64>) -> CellValue {
    match value {
        Some(v) if v.is_finite() => CellValue::from(format!("{v:.2}")),
        _ => CellValue::Empty,
    }
}

fn format_mae(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.3}")
    } else {
        MISSING.to_string()
    }
}

fn format_smape(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}%")
    } else {
        MISSING.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForecastModel, ForecastResult};
    use crate::selection::{CandidateStatus, SelectionMetrics};

    fn sample_matrix() -> ClassMatrix<usize> {
        let mut counts = ClassMatrix::new();
        *counts.get_mut(AbcClass::A, XyzClass::X) = 2;
        *counts.get_mut(AbcClass::A, XyzClass::Y) = 1;
        *counts.get_mut(AbcClass::B, XyzClass::Y) = 3;
        *counts.get_mut(AbcClass::B, XyzClass::Z) = 1;
        *counts.get_mut(AbcClass::C, XyzClass::X) = 1;
        *counts.get_mut(AbcClass::C, XyzClass::Z) = 4;
        counts
    }

    fn sample_selection() -> ModelSelection {
        ModelSelection {
            best: ForecastResult {
                forecast: vec![11.0, 12.0],
                model_label: "Linear trend".to_string(),
                message: "Best of 2 candidates by backtesting over the final 1 period(s)."
                    .to_string(),
                params: None,
                metrics: None,
            },
            best_model: ForecastModel::LinearTrend,
            metrics: SelectionMetrics {
                mae: 0.5,
                smape: 4.2,
            },
            ranking: vec![
                RankedCandidate {
                    model: ForecastModel::LinearTrend,
                    score: 0.1,
                    metrics: Some(SelectionMetrics {
                        mae: 0.5,
                        smape: 4.2,
                    }),
                    status: CandidateStatus::Evaluated,
                },
                RankedCandidate {
                    model: ForecastModel::MovingAverage { window: 3 },
                    score: 1.2,
                    metrics: Some(SelectionMetrics {
                        mae: 2.1,
                        smape: 15.0,
                    }),
                    status: CandidateStatus::Evaluated,
                },
            ],
        }
    }

    #[test]
    fn matrix_table_totals_and_shares() {
        let table = matrix_table(&sample_matrix(), 12);

        assert_eq!(table.len(), 5);
        assert_eq!(table[0][0], CellValue::from("ABC class"));
        assert_eq!(table[0][5], CellValue::from("Share of SKUs"));
        // A row: 2 + 1 + 0 = 3 SKUs, a quarter of the 12 classified.
        assert_eq!(table[1][4], CellValue::Number(3.0));
        assert_eq!(table[1][5], CellValue::Number(25.0));
        // Totals row: X column 2 + 0 + 1, grand total, full share.
        let totals = &table[4];
        assert_eq!(totals[0], CellValue::from("Total"));
        assert_eq!(totals[1], CellValue::Number(3.0));
        assert_eq!(totals[4], CellValue::Number(12.0));
        assert_eq!(totals[5], CellValue::Number(100.0));
    }

    #[test]
    fn matrix_table_survives_an_empty_classification() {
        let table = matrix_table(&ClassMatrix::new(), 0);
        assert_eq!(table.len(), 5);
        assert_eq!(table[4][5], CellValue::Number(0.0));
    }

    #[test]
    fn sku_table_scales_percentages() {
        let stats = vec![
            SkuStat {
                sku: "A-1".to_string(),
                group: None,
                total: 10.0,
                mean: 5.0,
                std: 0.6,
                cov: Some(0.12),
                share: 0.5,
                cum_share: 0.5,
                abc: AbcClass::A,
                xyz: XyzClass::X,
                service_level: 0.95,
                safety_stock: 2.3,
            },
            SkuStat {
                sku: "B-2".to_string(),
                group: Some("Audio".to_string()),
                total: 4.0,
                mean: 2.0,
                std: 0.0,
                cov: None,
                share: 0.2,
                cum_share: 0.7,
                abc: AbcClass::B,
                xyz: XyzClass::Y,
                service_level: 0.90,
                safety_stock: 0.0,
            },
        ];

        let table = sku_table(&stats);

        assert_eq!(table.len(), 3);
        assert_eq!(table[0].len(), 10);
        assert_eq!(table[0][0], CellValue::from("SKU"));
        assert_eq!(table[1][6], CellValue::Number(2.3));
        assert_eq!(table[1][7], CellValue::Number(95.0));
        assert_eq!(table[1][8], CellValue::Number(50.0));
        // No group and no CoV export as empty cells.
        assert_eq!(table[1][1], CellValue::Empty);
        assert_eq!(table[2][5], CellValue::Empty);
        assert_eq!(table[2][1], CellValue::from("Audio"));
        assert_eq!(table[2][9], CellValue::Number(70.0));
    }

    #[test]
    fn forecast_table_formats_two_decimals() {
        let rows = vec![
            ForecastRow {
                period: "2023-01".to_string(),
                actual: Some(10.0),
                forecast: None,
            },
            ForecastRow {
                period: "2023-02".to_string(),
                actual: None,
                forecast: Some(12.3456),
            },
            ForecastRow {
                period: "2023-03".to_string(),
                actual: Some(f64::INFINITY),
                forecast: Some(7.0),
            },
        ];

        let table = forecast_table(&rows, None).unwrap();

        assert_eq!(
            table[0],
            vec![
                CellValue::from("Period"),
                CellValue::from("Actual"),
                CellValue::from("Forecast"),
            ]
        );
        assert_eq!(table[1][1], CellValue::from("10.00"));
        assert_eq!(table[1][2], CellValue::Empty);
        assert_eq!(table[2][1], CellValue::Empty);
        assert_eq!(table[2][2], CellValue::from("12.35"));
        assert_eq!(table[3][1], CellValue::Empty);
        assert_eq!(table[3][2], CellValue::from("7.00"));
    }

    #[test]
    fn forecast_table_rejects_empty_input() {
        assert_eq!(
            forecast_table(&[], None).unwrap_err(),
            AnalysisError::EmptyData
        );
    }

    #[test]
    fn forecast_table_appends_selection_details() {
        let rows = vec![
            ForecastRow {
                period: "2023-01".to_string(),
                actual: Some(10.0),
                forecast: Some(11.0),
            },
            ForecastRow {
                period: "2023-02".to_string(),
                actual: Some(12.0),
                forecast: Some(12.0),
            },
        ];

        let table = forecast_table(&rows, Some(&sample_selection())).unwrap();

        let meta_start = table
            .iter()
            .position(|row| row.first() == Some(&CellValue::from("Model")))
            .unwrap();
        assert!(meta_start > 2);
        assert_eq!(table[meta_start][1], CellValue::from("Linear trend"));
        assert!(table
            .iter()
            .any(|row| row.first() == Some(&CellValue::from("Rank 1"))));
        assert!(table
            .iter()
            .any(|row| row.get(1) == Some(&CellValue::from("Moving average"))));
    }

    #[test]
    fn selection_rows_format_metrics_and_flag_the_best() {
        let ranking = vec![
            RankedCandidate {
                model: ForecastModel::LinearTrend,
                score: 0.2,
                metrics: Some(SelectionMetrics {
                    mae: 1.2345,
                    smape: 6.789,
                }),
                status: CandidateStatus::Evaluated,
            },
            RankedCandidate {
                model: ForecastModel::MovingAverage { window: 3 },
                score: 0.5,
                metrics: Some(SelectionMetrics {
                    mae: 2.5,
                    smape: f64::INFINITY,
                }),
                status: CandidateStatus::Evaluated,
            },
            RankedCandidate {
                model: ForecastModel::Arima,
                score: f64::INFINITY,
                metrics: None,
                status: CandidateStatus::Failed("series too short".to_string()),
            },
        ];

        let rows = selection_rows(&ranking, "trend");

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_best);
        assert_eq!(rows[0].mae_text, "1.235");
        assert_eq!(rows[0].smape_text, "6.79%");
        assert_eq!(rows[1].smape_text, "—");
        assert_eq!(rows[1].status, "");
        assert!(rows[2].status.contains("Error"));
        assert!(!rows[2].is_best);
        assert_eq!(rows[2].mae_text, "—");
    }
}
