//! Column-role guessing and pre-flight row validation.

use super::cell::{parse_date_cell, parse_quantity, CellValue};
use super::dataset::ColumnMapping;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};

/// Header keywords per role, English and Russian.
const SKU_HINTS: &[&str] = &["sku", "артикул", "товар", "наименование", "product", "item", "code"];
const GROUP_HINTS: &[&str] = &["group", "группа", "категор", "category", "cat", "сегмент"];
const DATE_HINTS: &[&str] = &["date", "дата", "период", "period", "sold", "день", "месяц"];
const QTY_HINTS: &[&str] = &[
    "qty",
    "quantity",
    "количество",
    "объем",
    "объём",
    "unit",
    "amount",
    "продаж",
];

/// How many rows the content heuristics sample.
const GUESS_SAMPLE_ROWS: usize = 50;

/// Proposed column roles, each resolved to a distinct index or `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnGuess {
    pub sku: Option<usize>,
    pub group: Option<usize>,
    pub date: Option<usize>,
    pub qty: Option<usize>,
}

impl ColumnGuess {
    /// Convert into a [`ColumnMapping`] when the required roles resolved.
    pub fn into_mapping(self) -> Option<ColumnMapping> {
        let mapping = ColumnMapping::new(self.sku?, self.date?, self.qty?);
        Some(match self.group {
            Some(group) => mapping.with_group(group),
            None => mapping,
        })
    }
}

/// Per-column evidence gathered from the header and sample cells.
struct ColumnProfile {
    header: String,
    date_ratio: f64,
    numeric_ratio: f64,
    text_ratio: f64,
    distinct_ratio: f64,
}

impl ColumnProfile {
    fn build(idx: usize, headers: &[String], rows: &[Vec<CellValue>]) -> Self {
        let header = headers
            .get(idx)
            .map(|h| h.trim().to_lowercase().replace('ё', "е"))
            .unwrap_or_default();

        let mut non_empty = 0usize;
        let mut dates = 0usize;
        let mut numbers = 0usize;
        let mut texts = 0usize;
        let mut distinct = BTreeSet::new();

        for row in rows.iter().take(GUESS_SAMPLE_ROWS) {
            let cell = row.get(idx).unwrap_or(&CellValue::Empty);
            let text = cell.to_text();
            if text.trim().is_empty() {
                continue;
            }
            non_empty += 1;
            distinct.insert(text);
            let is_date = parse_date_cell(cell).is_some();
            let is_number = parse_quantity(cell).is_some();
            if is_date {
                dates += 1;
            }
            if is_number {
                numbers += 1;
            }
            if !is_date && !is_number {
                texts += 1;
            }
        }

        let ratio = |count: usize| {
            if non_empty == 0 {
                0.0
            } else {
                count as f64 / non_empty as f64
            }
        };
        ColumnProfile {
            header,
            date_ratio: ratio(dates),
            numeric_ratio: ratio(numbers),
            text_ratio: ratio(texts),
            distinct_ratio: ratio(distinct.len()),
        }
    }

    fn hint(&self, keywords: &[&str]) -> f64 {
        if keywords.iter().any(|kw| self.header.contains(kw)) {
            2.0
        } else {
            0.0
        }
    }
}

/// Guess which column plays which role from headers and sample rows.
///
/// Header keywords and cell contents both contribute: cells that parse
/// as dates vote for the date role, numeric cells for quantity, distinct
/// text for SKU and repeating text for group. Roles are assigned
/// greedily (date, quantity, SKU, then group), each taking the
/// best-scoring column still free.
pub fn guess_columns(headers: &[String], rows: &[Vec<CellValue>]) -> ColumnGuess {
    let width = headers
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0));
    let profiles: Vec<ColumnProfile> = (0..width)
        .map(|idx| ColumnProfile::build(idx, headers, rows))
        .collect();

    let mut taken: HashSet<usize> = HashSet::new();
    let mut assign = |scores: Vec<f64>| -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, score) in scores.into_iter().enumerate() {
            if taken.contains(&idx) || score <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((idx, score));
            }
        }
        let idx = best.map(|(idx, _)| idx)?;
        taken.insert(idx);
        Some(idx)
    };

    let date = assign(
        profiles
            .iter()
            .map(|p| p.hint(DATE_HINTS) + p.date_ratio)
            .collect(),
    );
    let qty = assign(
        profiles
            .iter()
            .map(|p| p.hint(QTY_HINTS) + p.numeric_ratio)
            .collect(),
    );
    let sku = assign(
        profiles
            .iter()
            .map(|p| p.hint(SKU_HINTS) + p.text_ratio * p.distinct_ratio)
            .collect(),
    );
    let group = assign(
        profiles
            .iter()
            .map(|p| p.hint(GROUP_HINTS) + p.text_ratio * (1.0 - p.distinct_ratio))
            .collect(),
    );

    ColumnGuess {
        sku,
        group,
        date,
        qty,
    }
}

/// Counters from a pre-flight scan of the mapped rows.
///
/// Advisory only: aggregation still silently skips bad rows. `scanned`
/// counts rows that passed every check and entered the duplicate scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowValidation {
    pub invalid_dates: usize,
    pub invalid_quantities: usize,
    pub empty_groups: usize,
    pub duplicate_keys: usize,
    pub scanned: usize,
    pub truncated: bool,
}

impl RowValidation {
    /// Human-readable warnings, one per non-zero counter.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.invalid_dates > 0 {
            out.push(format!(
                "{} rows have unparseable dates and will be skipped",
                self.invalid_dates
            ));
        }
        if self.invalid_quantities > 0 {
            out.push(format!(
                "{} rows have non-numeric quantities and will be skipped",
                self.invalid_quantities
            ));
        }
        if self.duplicate_keys > 0 {
            out.push(format!(
                "{} duplicate SKU and date pairs found; their quantities will be summed",
                self.duplicate_keys
            ));
        }
        if self.empty_groups > 0 {
            out.push(format!(
                "{} rows are missing a product group value",
                self.empty_groups
            ));
        }
        if self.truncated {
            out.push("validation scanned only the leading rows of a large file".to_string());
        }
        out
    }

    pub fn is_clean(&self) -> bool {
        self.warnings().is_empty()
    }
}

/// Scan up to `limit` rows against a column mapping, counting data
/// quality issues without aborting on any of them.
pub fn validate_rows(
    rows: &[Vec<CellValue>],
    mapping: &ColumnMapping,
    limit: usize,
) -> RowValidation {
    let mut validation = RowValidation {
        truncated: rows.len() > limit,
        ..RowValidation::default()
    };
    let mut seen: HashSet<(String, NaiveDate)> = HashSet::new();

    for row in rows.iter().take(limit) {
        let sku = match row.get(mapping.sku) {
            Some(cell) => cell.to_text().trim().to_string(),
            None => continue,
        };
        if sku.is_empty() {
            continue;
        }
        let Some(date) = row.get(mapping.date).and_then(parse_date_cell) else {
            validation.invalid_dates += 1;
            continue;
        };
        if row.get(mapping.qty).and_then(parse_quantity).is_none() {
            validation.invalid_quantities += 1;
            continue;
        }

        validation.scanned += 1;
        if !seen.insert((sku, date)) {
            validation.duplicate_keys += 1;
        }
        if let Some(group_idx) = mapping.group {
            let group = row
                .get(group_idx)
                .map(CellValue::to_text)
                .unwrap_or_default();
            if group.trim().is_empty() {
                validation.empty_groups += 1;
            }
        }
    }
    validation
}
