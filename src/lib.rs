//! # abcxyz
//!
//! ABC/XYZ inventory analysis and demand forecasting.
//!
//! Raw sales rows are aggregated onto a contiguous period grid, every SKU
//! is classified by revenue contribution (ABC) and demand volatility (XYZ)
//! with safety-stock recommendations, and per-SKU or total demand can be
//! forecast with a model suite ranging from moving averages to auto-tuned
//! SARIMA and ETS, including automatic model selection by backtesting.
//! Export builders turn every result into spreadsheet-ready tables.

pub mod classification;
pub mod core;
pub mod error;
pub mod export;
pub mod models;
pub mod selection;
pub mod utils;

pub use error::{AnalysisError, Result};

pub mod prelude {
    pub use crate::classification::{classify, AbcClass, Classification, SkuStat, XyzClass};
    pub use crate::core::{Dataset, Granularity};
    pub use crate::error::{AnalysisError, Result};
    pub use crate::models::{forecast, ForecastModel, ForecastResult};
    pub use crate::selection::{select_best_model, ModelSelection};
}
