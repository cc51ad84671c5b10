//! Reading and writing persisted tables.
//!
//! Parquet keeps dtypes. CSV tables are read with every column as text so
//! codes with leading zeros survive.

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::{
    CsvReadOptions, CsvWriter, DataFrame, ParquetReader, ParquetWriter, SerReader, SerWriter,
};

use eencijfer_model::ExportFormat;

use crate::error::{IngestError, Result};

fn table_format(path: &Path) -> Option<ExportFormat> {
    let ext = path.extension().and_then(|ext| ext.to_str())?;
    ExportFormat::ALL
        .into_iter()
        .find(|format| ext.eq_ignore_ascii_case(format.extension()))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads a CSV file with the given separator, all columns as text.
pub fn read_csv(path: &Path, separator: u8) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Reads a `.parquet` or `.csv` table.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let df = match table_format(path) {
        Some(ExportFormat::Parquet) => ParquetReader::new(open(path)?).finish()?,
        Some(ExportFormat::Csv) => read_csv(path, b',')?,
        None => {
            return Err(IngestError::UnsupportedTable {
                path: path.to_path_buf(),
            });
        }
    };
    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Read table"
    );
    Ok(df)
}

/// Locates `<name>.parquet` or `<name>.csv` in `dir`, preferring Parquet.
pub fn find_table(dir: &Path, name: &str) -> Option<PathBuf> {
    ExportFormat::ALL
        .into_iter()
        .map(|format| dir.join(format!("{name}.{}", format.extension())))
        .find(|path| path.is_file())
}

/// Reads a named table from `dir`; `Ok(None)` when it does not exist.
pub fn read_named_table(dir: &Path, name: &str) -> Result<Option<DataFrame>> {
    find_table(dir, name).map(|path| read_table(&path)).transpose()
}

/// Writes `df` as `<dir>/<name>.<ext>` and returns the path.
pub fn write_table(
    df: &mut DataFrame,
    dir: &Path,
    name: &str,
    format: ExportFormat,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| IngestError::FileWrite {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let path = dir.join(format!("{name}.{}", format.extension()));
    let mut file = File::create(&path).map_err(|e| IngestError::FileWrite {
        path: path.clone(),
        source: e,
    })?;
    match format {
        ExportFormat::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        ExportFormat::Csv => {
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
        }
    }
    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        format = %format,
        "Saved table"
    );
    Ok(path)
}
