//! Error types for eencijfer ingestion.

use std::path::PathBuf;

use eencijfer_model::LayoutIssue;
use thiserror::Error;

/// One record whose bytes extend beyond the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GarbageSample {
    /// 1-based line number in the raw file.
    pub line: usize,
    /// Value of the first layout field of the record.
    pub leading: String,
    /// Overflowing text.
    pub garbage: String,
}

/// Errors that can occur while reading definitions, raw files and tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Layout Errors ===
    #[error("failed to parse definition file {path}: {source}")]
    DefinitionParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("definition '{stem}' is defined twice: {first} and {second}")]
    DuplicateDefinition {
        stem: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("no definition file matches {file}")]
    LayoutNotFound { file: PathBuf },

    #[error("definition {layout} cannot be used: {source}")]
    InvalidLayout {
        layout: String,
        #[source]
        source: LayoutIssue,
    },

    // === Decoding Errors ===
    #[error(
        "{file}: {rows} row(s) have data beyond the layout in GarbageColumn; \
         the definition does not match the record width"
    )]
    GarbageColumn {
        file: PathBuf,
        rows: usize,
        samples: Vec<GarbageSample>,
    },

    #[error("{file}: cannot convert '{value}' in column {column} on line {line}: {reason}")]
    Conversion {
        file: PathBuf,
        column: String,
        line: usize,
        value: String,
        reason: String,
    },

    // === Table Errors ===
    #[error("unsupported table format: {path}")]
    UnsupportedTable { path: PathBuf },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::LayoutNotFound {
            file: PathBuf::from("/data/DUO_VAKHAVW.asc"),
        };
        assert_eq!(
            err.to_string(),
            "no definition file matches /data/DUO_VAKHAVW.asc"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
