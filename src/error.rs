//! Error types for the abcxyz library.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur during aggregation, classification, or forecasting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// No row survived the aggregation filters.
    #[error("no usable rows: check the SKU, date and quantity columns")]
    NoUsableRows,

    /// Every aggregated quantity is zero (or negative), so share-based
    /// classification is undefined.
    #[error("total sales volume is not positive; ABC analysis is impossible")]
    NoPositiveVolume,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}
