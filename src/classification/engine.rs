//! ABC/XYZ classification over a period window.

use super::stats::{safety_stock, AbcClass, ClassMatrix, SkuStat, XyzClass};
use crate::core::Period;
use crate::error::{AnalysisError, Result};
use crate::utils::std_dev;
use std::collections::{BTreeMap, BTreeSet};

/// Complete classification snapshot for one period slice.
///
/// Immutable once built; changing parameters produces a fresh snapshot
/// instead of mutating an old one.
#[derive(Debug, Clone)]
pub struct Classification {
    /// The period slice this snapshot covers.
    pub periods: Vec<Period>,
    /// Per-SKU stats sorted by total descending; ties keep SKU order.
    pub sku_stats: Vec<SkuStat>,
    pub matrix_counts: ClassMatrix<usize>,
    pub safety_matrix: ClassMatrix<f64>,
    pub total_sku: usize,
    pub grand_total: f64,
    pub total_safety_stock: f64,
}

/// Window aggregates recomputed from an arbitrary, possibly filtered,
/// stat list.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    pub matrix_counts: ClassMatrix<usize>,
    pub safety_matrix: ClassMatrix<f64>,
    pub total_sku: usize,
    pub total_safety_stock: f64,
}

/// Per-SKU measurements taken before the cumulative-share pass.
struct Measured {
    sku: String,
    group: Option<String>,
    total: f64,
    mean: f64,
    std: f64,
    cov: Option<f64>,
}

/// Classify every SKU over the given period slice.
///
/// Quantity vectors are aligned to `periods` with zero-filled gaps.
/// ABC classes come from the running cumulative share after sorting by
/// total descending; XYZ classes from the coefficient of variation.
/// Returns [`AnalysisError::NoPositiveVolume`] when the slice has no
/// positive sales at all.
pub fn classify(
    periods: &[Period],
    series: &BTreeMap<String, BTreeMap<Period, f64>>,
    groups: Option<&BTreeMap<String, String>>,
) -> Result<Classification> {
    if periods.is_empty() || series.is_empty() {
        return Err(AnalysisError::EmptyData);
    }

    let n = periods.len();
    let mut measured: Vec<Measured> = Vec::with_capacity(series.len());
    let mut grand_total = 0.0;

    for (sku, totals) in series {
        let values: Vec<f64> = periods
            .iter()
            .map(|p| totals.get(p).copied().unwrap_or(0.0))
            .collect();
        let total: f64 = values.iter().sum();
        let mean = total / n as f64;
        let std = if n > 1 { std_dev(&values) } else { 0.0 };
        let cov = if mean > 0.0 { Some(std / mean) } else { None };
        grand_total += total;
        measured.push(Measured {
            sku: sku.clone(),
            group: groups.and_then(|g| g.get(sku)).cloned(),
            total,
            mean,
            std,
            cov,
        });
    }

    if grand_total <= 0.0 {
        return Err(AnalysisError::NoPositiveVolume);
    }

    measured.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut cum_share = 0.0;
    let mut sku_stats = Vec::with_capacity(measured.len());
    for m in measured {
        let share = m.total / grand_total;
        cum_share += share;
        let xyz = XyzClass::from_cov(m.cov);
        let service_level = xyz.service_level();
        sku_stats.push(SkuStat {
            sku: m.sku,
            group: m.group,
            total: m.total,
            mean: m.mean,
            std: m.std,
            cov: m.cov,
            share,
            cum_share,
            abc: AbcClass::from_cumulative_share(cum_share),
            xyz,
            service_level,
            safety_stock: safety_stock(m.std, m.mean, service_level),
        });
    }

    let aggregates = aggregates_from_stats(&sku_stats);
    Ok(Classification {
        periods: periods.to_vec(),
        sku_stats,
        matrix_counts: aggregates.matrix_counts,
        safety_matrix: aggregates.safety_matrix,
        total_sku: aggregates.total_sku,
        grand_total,
        total_safety_stock: aggregates.total_safety_stock,
    })
}

/// Recompute matrix counts and safety totals from a stat list, e.g.
/// after filtering.
pub fn aggregates_from_stats(stats: &[SkuStat]) -> Aggregates {
    let mut aggregates = Aggregates {
        total_sku: stats.len(),
        ..Aggregates::default()
    };
    for stat in stats {
        *aggregates.matrix_counts.get_mut(stat.abc, stat.xyz) += 1;
        *aggregates.safety_matrix.get_mut(stat.abc, stat.xyz) += stat.safety_stock;
        aggregates.total_safety_stock += stat.safety_stock;
    }
    aggregates
}

/// Display-layer filter over a stat list.
///
/// An empty class, group, or query field places no constraint on that
/// axis, so the default filter passes everything through.
#[derive(Debug, Clone, Default)]
pub struct StatFilter {
    pub abc: BTreeSet<AbcClass>,
    pub xyz: BTreeSet<XyzClass>,
    pub groups: BTreeSet<String>,
    /// Case-insensitive substring match on the SKU identifier.
    pub sku_query: String,
}

/// Apply class, group, and SKU-substring filters, preserving order.
pub fn filter_stats(stats: &[SkuStat], filter: &StatFilter) -> Vec<SkuStat> {
    let query = filter.sku_query.trim().to_lowercase();
    stats
        .iter()
        .filter(|s| filter.abc.is_empty() || filter.abc.contains(&s.abc))
        .filter(|s| filter.xyz.is_empty() || filter.xyz.contains(&s.xyz))
        .filter(|s| {
            filter.groups.is_empty()
                || s.group
                    .as_ref()
                    .map_or(false, |g| filter.groups.contains(g))
        })
        .filter(|s| query.is_empty() || s.sku.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Deduplicated SKU list sorted case-insensitively, for consumers
/// populating pickers. Falls back to a raw key list when no stats are
/// available yet.
pub fn collect_sku_options(stats: &[SkuStat], fallback: &[String]) -> Vec<String> {
    let mut options: Vec<String> = if stats.is_empty() {
        fallback.to_vec()
    } else {
        stats.iter().map(|s| s.sku.clone()).collect()
    };
    options.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
    options.dedup();
    options
}
