//! Aggregation of raw rows into a per-SKU period grid.

use super::cell::{parse_date_cell, parse_quantity, CellValue};
use super::period::{period_sequence, Granularity, Period};
use crate::error::{AnalysisError, Result};
use std::collections::BTreeMap;

/// Column roles inside a raw row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Index of the SKU identifier column.
    pub sku: usize,
    /// Index of the sale date column.
    pub date: usize,
    /// Index of the quantity column.
    pub qty: usize,
    /// Optional index of the product group column.
    pub group: Option<usize>,
}

impl ColumnMapping {
    pub fn new(sku: usize, date: usize, qty: usize) -> Self {
        Self {
            sku,
            date,
            qty,
            group: None,
        }
    }

    pub fn with_group(mut self, group: usize) -> Self {
        self.group = Some(group);
        self
    }
}

/// The aggregated session data every downstream call reads from.
///
/// Built once per ingestion and treated as read-only afterwards;
/// re-running analysis with new parameters recomputes from this
/// structure instead of the raw rows. `BTreeMap` keys keep SKU
/// iteration deterministic regardless of input row order.
#[derive(Debug, Clone)]
pub struct Dataset {
    granularity: Granularity,
    periods: Vec<Period>,
    series: BTreeMap<String, BTreeMap<Period, f64>>,
    groups: BTreeMap<String, String>,
}

impl Dataset {
    /// Aggregate raw rows into per-SKU period totals.
    ///
    /// Rows with an empty SKU, unparseable date, or non-numeric quantity
    /// are silently skipped; quantities for the same SKU and period are
    /// summed. Returns [`AnalysisError::NoUsableRows`] when no row
    /// survives the skip rules.
    pub fn aggregate(
        rows: &[Vec<CellValue>],
        mapping: &ColumnMapping,
        granularity: Granularity,
    ) -> Result<Self> {
        let mut series: BTreeMap<String, BTreeMap<Period, f64>> = BTreeMap::new();
        let mut groups = BTreeMap::new();
        let mut min_period: Option<Period> = None;
        let mut max_period: Option<Period> = None;

        for row in rows {
            let sku = match row.get(mapping.sku) {
                Some(cell) => cell.to_text().trim().to_string(),
                None => continue,
            };
            if sku.is_empty() {
                continue;
            }
            let Some(date) = row.get(mapping.date).and_then(parse_date_cell) else {
                continue;
            };
            let Some(qty) = row.get(mapping.qty).and_then(parse_quantity) else {
                continue;
            };

            let period = Period::from_date(date, granularity);
            *series
                .entry(sku.clone())
                .or_default()
                .entry(period.clone())
                .or_insert(0.0) += qty;

            if let Some(group_idx) = mapping.group {
                if let Some(cell) = row.get(group_idx) {
                    let group = cell.to_text().trim().to_string();
                    if !group.is_empty() {
                        groups.insert(sku, group);
                    }
                }
            }

            if min_period.as_ref().map_or(true, |min| period < *min) {
                min_period = Some(period.clone());
            }
            if max_period.as_ref().map_or(true, |max| period > *max) {
                max_period = Some(period);
            }
        }

        let (Some(min), Some(max)) = (min_period, max_period) else {
            return Err(AnalysisError::NoUsableRows);
        };

        Ok(Self {
            granularity,
            periods: period_sequence(&min, &max, granularity),
            series,
            groups,
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The gap-free period sequence spanning the observed data.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Per-SKU sparse period totals.
    pub fn series(&self) -> &BTreeMap<String, BTreeMap<Period, f64>> {
        &self.series
    }

    /// SKU to group mapping; the last non-empty group cell wins.
    pub fn groups(&self) -> &BTreeMap<String, String> {
        &self.groups
    }

    pub fn sku_count(&self) -> usize {
        self.series.len()
    }

    /// Quantity vector for one SKU aligned to the full period grid,
    /// zero-filled where the SKU had no sales.
    pub fn aligned_series(&self, sku: &str) -> Option<Vec<f64>> {
        let totals = self.series.get(sku)?;
        Some(
            self.periods
                .iter()
                .map(|p| totals.get(p).copied().unwrap_or(0.0))
                .collect(),
        )
    }
}
