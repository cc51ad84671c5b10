//! Errors raised by the frame helpers.

use thiserror::Error;

/// Errors from row-oriented DataFrame operations.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Column not found in DataFrame.
    #[error("column '{column}' not found in DataFrame")]
    MissingColumn { column: String },

    /// A key that must identify one row identifies several.
    #[error("{table}: key [{columns}] is not unique, '{key}' occurs more than once")]
    DuplicateKey {
        table: String,
        columns: String,
        key: String,
    },

    /// A join or filter produced a different number of rows than it received.
    #[error("{step}: row count changed from {expected} to {actual}")]
    RowCountMismatch {
        step: String,
        expected: usize,
        actual: usize,
    },

    /// Left and right key lists differ in length.
    #[error("{step}: {left} left keys but {right} right keys")]
    KeyArity {
        step: String,
        left: usize,
        right: usize,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for FrameError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameError::RowCountMismatch {
            step: "isced".to_string(),
            expected: 3,
            actual: 4,
        };
        assert_eq!(err.to_string(), "isced: row count changed from 3 to 4");
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let frame_err: FrameError = polars_err.into();
        assert!(matches!(frame_err, FrameError::DataFrame { .. }));
    }
}
