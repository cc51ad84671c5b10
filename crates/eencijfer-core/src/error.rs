//! Error types for asset derivation and pseudonymization.

use eencijfer_common::FrameError;
use thiserror::Error;

/// Errors raised while building assets or protecting identifiers.
#[derive(Debug, Error)]
pub enum CoreError {
    // === Exam Errors ===
    /// A score cell holds something other than a number.
    #[error("column {column}, row {row}: score '{value}' is not numeric")]
    InvalidScore {
        column: String,
        row: usize,
        value: String,
    },

    // === Pseudonymization Errors ===
    /// More distinct identifiers than seven-digit pseudo-ids.
    #[error("{count} distinct identifiers exceed the maximum of {max} pseudo-ids")]
    TooManyIdentifiers { count: usize, max: usize },

    /// Two identifiers received the same pseudo-id.
    #[error("pseudo-id '{id}' was assigned more than once")]
    DuplicatePseudoId { id: String },

    // === Frame Errors ===
    /// Frame helper failure (missing column, duplicate key, join fan-out).
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for CoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidScore {
            column: "CijferSchoolexamen".to_string(),
            row: 3,
            value: "v".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "column CijferSchoolexamen, row 3: score 'v' is not numeric"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("Cijfer".into());
        let err: CoreError = polars_err.into();
        assert!(matches!(err, CoreError::DataFrame { .. }));
    }
}
