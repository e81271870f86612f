//! ABC/XYZ classification, window slicing, and transition tracking.

mod engine;
mod stats;
mod transitions;
mod windows;

pub use engine::{
    aggregates_from_stats, classify, collect_sku_options, filter_stats, Aggregates,
    Classification, StatFilter,
};
pub use stats::{safety_stock, AbcClass, ClassIndex, ClassMatrix, SkuStat, XyzClass};
pub use transitions::{build_transition_stats, SkuChange, TransitionMatrix, TransitionStats};
pub use windows::{analyze_windows, parse_window_sizes, WindowAnalysis, WindowResult};
