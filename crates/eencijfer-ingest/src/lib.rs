//! Eencijfer data ingestion.
//!
//! Resolves raw fixed-width register files to their layout definitions,
//! decodes them into Polars DataFrames and reads or writes persisted tables.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use eencijfer_ingest::{ConverterRegistry, FixedWidthDecoder, LayoutCatalog, list_raw_files};
//!
//! let catalog = LayoutCatalog::open(Path::new("definitions"))?;
//! let registry = ConverterRegistry::standard();
//! let decoder = FixedWidthDecoder::new(&registry, true);
//!
//! for raw in list_raw_files(Path::new("eencijfer"))? {
//!     let layout = catalog.layout_for(&raw)?;
//!     let df = decoder.decode_file(&raw, &layout)?;
//! }
//! ```

mod catalog;
mod converters;
mod decoder;
mod discovery;
mod error;
mod tables;

// === Error Types ===
pub use error::{GarbageSample, IngestError, Result};

// === Layouts ===
pub use catalog::{LAYOUT_MARKERS, LayoutCatalog, load_definition};

// === Decoding ===
pub use converters::{
    ConvertFn, Converter, ConverterRegistry, FALLBACK_CONVERTER, Value, ValueKind,
};
pub use decoder::{FixedWidthDecoder, MAX_GARBAGE_SAMPLES};

// === File Discovery ===
pub use discovery::{
    EXAM_MARKER, STUDENT_MARKER, file_stem, find_exam_table, find_student_table, is_raw_file,
    list_raw_files,
};

// === Tables ===
pub use tables::{find_table, read_csv, read_named_table, read_table, write_table};
