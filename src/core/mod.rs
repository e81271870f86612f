//! Core data structures for demand history ingestion.

mod cell;
mod columns;
mod dataset;
mod period;

pub use cell::{parse_date_cell, parse_quantity, CellValue};
pub use columns::{guess_columns, validate_rows, ColumnGuess, RowValidation};
pub use dataset::{ColumnMapping, Dataset};
pub use period::{period_sequence, Granularity, Period};
