//! Error types for the enrichment pipeline.

use eencijfer_common::FrameError;
use eencijfer_ingest::IngestError;
use thiserror::Error;

/// Errors raised while enriching the student table.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A step changed the number of rows.
    #[error("step {step}: row count changed from {expected} to {actual}")]
    RowCountMismatch {
        step: String,
        expected: usize,
        actual: usize,
    },

    /// A step dropped columns it received.
    #[error("step {step}: removed input columns [{columns}]")]
    RemovedColumns { step: String, columns: String },

    /// A step did not produce columns it declared.
    #[error("step {step}: declared columns [{columns}] are missing from the output")]
    MissingDeclaredColumns { step: String, columns: String },

    /// A step produced columns it did not declare.
    #[error("step {step}: produced undeclared columns [{columns}]")]
    UndeclaredColumns { step: String, columns: String },

    /// A step added nothing where new columns are required.
    #[error("step {step}: no columns were added")]
    NoColumnsAdded { step: String },

    /// A mandatory reference table is absent.
    #[error("reference table '{table}' is required but was not found")]
    MissingReference { table: String },

    /// Rows whose key has no match in a mandatory reference table.
    #[error("step {step}: {rows} row(s) have no match in {table}, e.g. codes [{sample}]")]
    UnresolvedReference {
        step: String,
        table: String,
        rows: usize,
        sample: String,
    },

    /// Frame helper failure (missing column, duplicate key, join fan-out).
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Reference table could not be read.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for enrichment operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransformError::RowCountMismatch {
            step: "isced".to_string(),
            expected: 10,
            actual: 12,
        };
        assert_eq!(err.to_string(), "step isced: row count changed from 10 to 12");
    }

    #[test]
    fn test_error_from_frame() {
        let err: TransformError = FrameError::MissingColumn {
            column: "Opleidingscode".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "column 'Opleidingscode' not found in DataFrame"
        );
    }
}
