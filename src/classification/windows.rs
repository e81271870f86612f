//! Window slicing over the period grid.

use super::engine::{classify, Classification};
use super::transitions::{build_transition_stats, TransitionStats};
use crate::core::{Dataset, Period};
use crate::error::{AnalysisError, Result};

/// One classified period slice.
#[derive(Debug, Clone)]
pub struct WindowResult {
    /// Stable machine key, `"all"` or `"w{size}-{index}"`.
    pub key: String,
    /// Human-readable window description.
    pub label: String,
    pub start_period: Period,
    pub end_period: Period,
    pub classification: Classification,
}

/// Every classified window plus transition statistics across the sized
/// windows.
#[derive(Debug, Clone)]
pub struct WindowAnalysis {
    /// The whole-range window first, then each sized slice in order.
    pub windows: Vec<WindowResult>,
    /// `None` when no window sizes were requested.
    pub transitions: Option<TransitionStats>,
}

/// Parse a user-entered window size list.
///
/// Splits on commas, semicolons, and whitespace; keeps positive
/// integers; deduplicates and sorts ascending. `"6, 3; 6 9"` parses to
/// `[3, 6, 9]`.
pub fn parse_window_sizes(text: &str) -> Vec<usize> {
    let mut sizes: Vec<usize> = text
        .split([',', ';'])
        .flat_map(str::split_whitespace)
        .filter_map(|token| token.parse::<usize>().ok())
        .filter(|size| *size > 0)
        .collect();
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

/// Classify the full period range plus consecutive non-overlapping
/// slices of each requested size, then derive transitions across the
/// sized windows.
///
/// A slice with no positive volume is skipped rather than failing the
/// whole analysis; the full range must still have positive volume.
pub fn analyze_windows(dataset: &Dataset, sizes: &[usize]) -> Result<WindowAnalysis> {
    let periods = dataset.periods();
    let series = dataset.series();
    let groups = Some(dataset.groups());

    let (Some(start), Some(end)) = (periods.first(), periods.last()) else {
        return Err(AnalysisError::EmptyData);
    };
    let full = classify(periods, series, groups)?;
    let mut windows = vec![WindowResult {
        key: "all".to_string(),
        label: "All periods".to_string(),
        start_period: start.clone(),
        end_period: end.clone(),
        classification: full,
    }];

    let mut normalized = sizes.to_vec();
    normalized.retain(|size| *size > 0);
    normalized.sort_unstable();
    normalized.dedup();

    for &size in &normalized {
        for (index, chunk) in periods.chunks(size).enumerate() {
            let (Some(chunk_start), Some(chunk_end)) = (chunk.first(), chunk.last()) else {
                continue;
            };
            match classify(chunk, series, groups) {
                Ok(classification) => windows.push(WindowResult {
                    key: format!("w{size}-{}", index + 1),
                    label: format!("{size}-period window #{}", index + 1),
                    start_period: chunk_start.clone(),
                    end_period: chunk_end.clone(),
                    classification,
                }),
                // A slice where nothing sold carries no signal.
                Err(AnalysisError::NoPositiveVolume) => {}
                Err(err) => return Err(err),
            }
        }
    }

    let transitions = if normalized.is_empty() {
        None
    } else {
        Some(build_transition_stats(&windows[1..]))
    };

    Ok(WindowAnalysis {
        windows,
        transitions,
    })
}
