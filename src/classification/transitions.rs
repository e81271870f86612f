//! Class-transition tracking across chronologically ordered windows.

use super::stats::{AbcClass, ClassIndex, XyzClass};
use super::windows::WindowResult;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// 3×3 from→to move counts along one class axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionMatrix<C> {
    counts: [[usize; 3]; 3],
    _axis: PhantomData<C>,
}

impl<C: ClassIndex> Default for TransitionMatrix<C> {
    fn default() -> Self {
        Self {
            counts: [[0; 3]; 3],
            _axis: PhantomData,
        }
    }
}

impl<C: ClassIndex> TransitionMatrix<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of `from → to` moves.
    pub fn get(&self, from: C, to: C) -> usize {
        self.counts[from.index()][to.index()]
    }

    fn increment(&mut self, from: C, to: C) {
        self.counts[from.index()][to.index()] += 1;
    }

    /// Total recorded moves across all cells.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// A SKU and how many class moves it made across the window sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuChange {
    pub sku: String,
    pub change_count: usize,
}

/// Transition matrices for both axes plus the per-SKU change ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionStats {
    pub abc_matrix: TransitionMatrix<AbcClass>,
    pub xyz_matrix: TransitionMatrix<XyzClass>,
    /// SKUs with at least one change, most volatile first; ties in
    /// alphabetical order.
    pub sku_changes: Vec<SkuChange>,
}

/// Count class moves between chronologically adjacent windows.
///
/// Windows are ordered by start period before comparison, so callers
/// may pass windows of mixed sizes in any order. A SKU absent from a
/// window is compared across the gap.
pub fn build_transition_stats(windows: &[WindowResult]) -> TransitionStats {
    let mut ordered: Vec<&WindowResult> = windows.iter().collect();
    ordered.sort_by(|a, b| a.start_period.cmp(&b.start_period));

    let mut tracks: BTreeMap<&str, Vec<(AbcClass, XyzClass)>> = BTreeMap::new();
    for window in &ordered {
        for stat in &window.classification.sku_stats {
            tracks
                .entry(stat.sku.as_str())
                .or_default()
                .push((stat.abc, stat.xyz));
        }
    }

    let mut stats = TransitionStats::default();
    for (sku, track) in tracks {
        let mut count = 0;
        for pair in track.windows(2) {
            let ((from_abc, from_xyz), (to_abc, to_xyz)) = (pair[0], pair[1]);
            if from_abc != to_abc {
                stats.abc_matrix.increment(from_abc, to_abc);
                count += 1;
            }
            if from_xyz != to_xyz {
                stats.xyz_matrix.increment(from_xyz, to_xyz);
                count += 1;
            }
        }
        if count > 0 {
            stats.sku_changes.push(SkuChange {
                sku: sku.to_string(),
                change_count: count,
            });
        }
    }
    stats.sku_changes.sort_by(|a, b| {
        b.change_count
            .cmp(&a.change_count)
            .then_with(|| a.sku.cmp(&b.sku))
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::engine::Classification;
    use crate::classification::stats::{ClassMatrix, SkuStat};
    use crate::core::Period;

    fn stat(sku: &str, abc: AbcClass, xyz: XyzClass) -> SkuStat {
        SkuStat {
            sku: sku.to_string(),
            group: None,
            total: 1.0,
            mean: 1.0,
            std: 0.0,
            cov: None,
            share: 1.0,
            cum_share: 1.0,
            abc,
            xyz,
            service_level: xyz.service_level(),
            safety_stock: 0.0,
        }
    }

    fn window(key: &str, start: &str, stats: Vec<SkuStat>) -> WindowResult {
        let period: Period = start.parse().unwrap();
        WindowResult {
            key: key.to_string(),
            label: key.to_string(),
            start_period: period.clone(),
            end_period: period.clone(),
            classification: Classification {
                periods: vec![period],
                total_sku: stats.len(),
                grand_total: stats.iter().map(|s| s.total).sum(),
                total_safety_stock: 0.0,
                matrix_counts: ClassMatrix::new(),
                safety_matrix: ClassMatrix::new(),
                sku_stats: stats,
            },
        }
    }

    #[test]
    fn counts_class_moves_between_windows() {
        let windows = vec![
            window(
                "w1",
                "2023-01",
                vec![
                    stat("S1", AbcClass::A, XyzClass::X),
                    stat("S2", AbcClass::B, XyzClass::Y),
                ],
            ),
            window(
                "w2",
                "2023-02",
                vec![
                    stat("S1", AbcClass::B, XyzClass::Y),
                    stat("S2", AbcClass::B, XyzClass::Z),
                ],
            ),
        ];

        let transitions = build_transition_stats(&windows);
        assert_eq!(transitions.abc_matrix.get(AbcClass::A, AbcClass::B), 1);
        assert_eq!(transitions.xyz_matrix.get(XyzClass::X, XyzClass::Y), 1);
        assert_eq!(transitions.xyz_matrix.get(XyzClass::Y, XyzClass::Z), 1);
        assert_eq!(transitions.sku_changes[0].sku, "S1");
        assert_eq!(transitions.sku_changes[0].change_count, 2);
        assert_eq!(transitions.sku_changes[1].sku, "S2");
        assert_eq!(transitions.sku_changes[1].change_count, 1);
    }

    #[test]
    fn windows_are_time_sorted_before_comparison() {
        let windows = vec![
            window(
                "later",
                "2023-02",
                vec![stat("S1", AbcClass::B, XyzClass::Z)],
            ),
            window(
                "earlier",
                "2023-01",
                vec![stat("S1", AbcClass::A, XyzClass::X)],
            ),
        ];

        let transitions = build_transition_stats(&windows);
        assert_eq!(transitions.abc_matrix.get(AbcClass::A, AbcClass::B), 1);
        assert_eq!(transitions.abc_matrix.get(AbcClass::B, AbcClass::A), 0);
        assert_eq!(transitions.xyz_matrix.get(XyzClass::X, XyzClass::Z), 1);
    }

    #[test]
    fn stable_classes_produce_no_changes() {
        let windows = vec![
            window("w1", "2023-01", vec![stat("S1", AbcClass::A, XyzClass::X)]),
            window("w2", "2023-02", vec![stat("S1", AbcClass::A, XyzClass::X)]),
        ];

        let transitions = build_transition_stats(&windows);
        assert_eq!(transitions.abc_matrix.total(), 0);
        assert_eq!(transitions.xyz_matrix.total(), 0);
        assert!(transitions.sku_changes.is_empty());
    }

    #[test]
    fn equal_change_counts_rank_alphabetically() {
        let windows = vec![
            window(
                "w1",
                "2023-01",
                vec![
                    stat("S2", AbcClass::A, XyzClass::X),
                    stat("S1", AbcClass::A, XyzClass::X),
                ],
            ),
            window(
                "w2",
                "2023-02",
                vec![
                    stat("S2", AbcClass::B, XyzClass::X),
                    stat("S1", AbcClass::B, XyzClass::X),
                ],
            ),
        ];

        let transitions = build_transition_stats(&windows);
        let order: Vec<&str> = transitions
            .sku_changes
            .iter()
            .map(|c| c.sku.as_str())
            .collect();
        assert_eq!(order, ["S1", "S2"]);
    }

    #[test]
    fn gaps_in_a_sku_track_are_bridged() {
        let windows = vec![
            window("w1", "2023-01", vec![stat("S1", AbcClass::A, XyzClass::X)]),
            window("w2", "2023-02", vec![stat("S2", AbcClass::C, XyzClass::Z)]),
            window("w3", "2023-03", vec![stat("S1", AbcClass::C, XyzClass::X)]),
        ];

        let transitions = build_transition_stats(&windows);
        assert_eq!(transitions.abc_matrix.get(AbcClass::A, AbcClass::C), 1);
        assert_eq!(transitions.sku_changes.len(), 1);
        assert_eq!(transitions.sku_changes[0].sku, "S1");
    }

    #[test]
    fn empty_window_list_yields_empty_stats() {
        let transitions = build_transition_stats(&[]);
        assert_eq!(transitions, TransitionStats::default());
    }
}
