//! Shared utilities for eencijfer crates.
//!
//! `AnyValue` conversions and row-oriented DataFrame helpers used by the
//! enrichment, cohort, exam and pseudonymization stages.

pub mod error;
pub mod frame;
pub mod values;

pub use error::{FrameError, Result};
pub use frame::{
    LeftJoin, RowKey, column, ensure_unique, filter_rows, float_values, has_column,
    indicator_column, int_column, int_values, keep_first_by, require_columns, row_keys,
    row_keys_lossy, string_column, string_values,
};
pub use values::{
    any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty, format_numeric, parse_f64,
    parse_i64,
};
