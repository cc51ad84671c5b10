//! Fixed-width decoding of raw eencijfer files.
//!
//! Each line is one record. Fields are sliced at their layout spans, decoded
//! from latin-1 and trimmed; an empty field is missing. A synthetic
//! `GarbageColumn` covers the bytes right after the last field, and a file
//! where any record has text there is rejected.

use std::path::Path;

use encoding_rs::mem::decode_latin1 as latin1_to_str;
use polars::prelude::{Column, DataFrame, DataType, NamedFrom, Series};

use eencijfer_model::{FieldSpan, GARBAGE_COLUMN, GARBAGE_WIDTH, LayoutDefinition};

use crate::converters::{Converter, ConverterRegistry, Value, ValueKind};
use crate::error::{GarbageSample, IngestError, Result};

/// Maximum number of offending records kept for diagnostics.
pub const MAX_GARBAGE_SAMPLES: usize = 10;

/// Values of one column while records are being read.
#[derive(Debug)]
enum ColumnBuilder {
    Text(Vec<Option<String>>),
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Date(Vec<Option<i32>>),
    Null(usize),
}

impl ColumnBuilder {
    fn new(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Text => ColumnBuilder::Text(Vec::new()),
            ValueKind::Int => ColumnBuilder::Int(Vec::new()),
            ValueKind::Float => ColumnBuilder::Float(Vec::new()),
            ValueKind::Date => ColumnBuilder::Date(Vec::new()),
            ValueKind::Null => ColumnBuilder::Null(0),
        }
    }

    fn push(&mut self, value: Option<Value>) -> std::result::Result<(), String> {
        match (self, value) {
            (ColumnBuilder::Null(len), _) => *len += 1,
            (ColumnBuilder::Text(values), None) => values.push(None),
            (ColumnBuilder::Int(values), None) => values.push(None),
            (ColumnBuilder::Float(values), None) => values.push(None),
            (ColumnBuilder::Date(values), None) => values.push(None),
            (ColumnBuilder::Text(values), Some(Value::Text(v))) => values.push(Some(v)),
            (ColumnBuilder::Int(values), Some(Value::Int(v))) => values.push(Some(v)),
            (ColumnBuilder::Float(values), Some(Value::Float(v))) => values.push(Some(v)),
            #[allow(clippy::cast_precision_loss)]
            (ColumnBuilder::Float(values), Some(Value::Int(v))) => values.push(Some(v as f64)),
            (ColumnBuilder::Date(values), Some(Value::Date(d))) => {
                values.push(Some(Value::epoch_days(d)));
            }
            (_, Some(other)) => return Err(format!("unexpected converted value {other:?}")),
        }
        Ok(())
    }

    fn finish(self, name: &str) -> Result<Column> {
        let column = match self {
            ColumnBuilder::Text(values) => Column::new(name.into(), values),
            ColumnBuilder::Int(values) => Column::new(name.into(), values),
            ColumnBuilder::Float(values) => Column::new(name.into(), values),
            ColumnBuilder::Date(values) => {
                Column::from(Series::new(name.into(), values).cast(&DataType::Date)?)
            }
            ColumnBuilder::Null(len) => Column::full_null(name.into(), len, &DataType::Null),
        };
        Ok(column)
    }
}

/// ISO-8859-1: every byte is the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    latin1_to_str(bytes).trim().to_string()
}

fn slice_field(record: &[u8], start: usize, end: usize) -> String {
    let end = end.min(record.len());
    if start >= end {
        return String::new();
    }
    decode_latin1(&record[start..end])
}

/// Decodes raw files into typed tables with a resolved layout.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthDecoder<'a> {
    registry: &'a ConverterRegistry,
    use_column_converters: bool,
}

impl<'a> FixedWidthDecoder<'a> {
    /// With `use_column_converters` off every column is read as text.
    pub fn new(registry: &'a ConverterRegistry, use_column_converters: bool) -> Self {
        Self {
            registry,
            use_column_converters,
        }
    }

    pub fn uses_column_converters(&self) -> bool {
        self.use_column_converters
    }

    fn converters_for(&self, layout: &LayoutDefinition, spans: &[FieldSpan]) -> Vec<&'a Converter> {
        if !self.use_column_converters {
            return vec![self.registry.fallback(); spans.len()];
        }
        let mut missing = Vec::new();
        let converters = spans
            .iter()
            .map(|span| {
                let (converter, known) = self.registry.resolve(&span.converter);
                if !known {
                    missing.push(span.label.as_str());
                }
                converter
            })
            .collect();
        if !missing.is_empty() {
            tracing::warn!(
                layout = %layout.name,
                columns = %missing.join(", "),
                fallback = self.registry.fallback().id,
                "Missing converters, reading these columns as text"
            );
        }
        converters
    }

    /// Reads and decodes one raw file.
    pub fn decode_file(&self, path: &Path, layout: &LayoutDefinition) -> Result<DataFrame> {
        let bytes = std::fs::read(path).map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.decode_bytes(path, &bytes, layout)
    }

    /// Decodes raw bytes; `file` names the source in diagnostics.
    pub fn decode_bytes(
        &self,
        file: &Path,
        bytes: &[u8],
        layout: &LayoutDefinition,
    ) -> Result<DataFrame> {
        let spans = layout.spans().map_err(|e| IngestError::InvalidLayout {
            layout: layout.name.clone(),
            source: e,
        })?;
        let converters = self.converters_for(layout, &spans);
        let mut builders: Vec<ColumnBuilder> = converters
            .iter()
            .map(|c| ColumnBuilder::new(c.kind))
            .collect();

        let garbage_start = spans.last().map_or(0, FieldSpan::end);
        let garbage_end = garbage_start + GARBAGE_WIDTH;
        let mut garbage_rows = 0usize;
        let mut samples = Vec::new();

        for (idx, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
            let line = idx + 1;
            let record = raw_line.strip_suffix(b"\r").unwrap_or(raw_line);
            if record.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let garbage = slice_field(record, garbage_start, garbage_end);
            if !garbage.is_empty() {
                garbage_rows += 1;
                if samples.len() < MAX_GARBAGE_SAMPLES {
                    let leading = spans
                        .first()
                        .map(|s| slice_field(record, s.offset, s.end()))
                        .unwrap_or_default();
                    samples.push(GarbageSample {
                        line,
                        leading,
                        garbage,
                    });
                }
                continue;
            }
            if garbage_rows > 0 {
                continue;
            }

            for ((span, converter), builder) in
                spans.iter().zip(&converters).zip(builders.iter_mut())
            {
                let text = slice_field(record, span.offset, span.end());
                let value = if text.is_empty() {
                    None
                } else {
                    converter
                        .convert(&text)
                        .map_err(|reason| IngestError::Conversion {
                            file: file.to_path_buf(),
                            column: span.label.clone(),
                            line,
                            value: text.clone(),
                            reason,
                        })?
                };
                builder
                    .push(value)
                    .map_err(|reason| IngestError::Conversion {
                        file: file.to_path_buf(),
                        column: span.label.clone(),
                        line,
                        value: text,
                        reason,
                    })?;
            }
        }

        if garbage_rows > 0 {
            tracing::error!(
                file = %file.display(),
                layout = %layout.name,
                rows = garbage_rows,
                column = GARBAGE_COLUMN,
                "Records extend beyond the layout"
            );
            return Err(IngestError::GarbageColumn {
                file: file.to_path_buf(),
                rows: garbage_rows,
                samples,
            });
        }

        let columns = spans
            .iter()
            .zip(builders)
            .map(|(span, builder)| builder.finish(&span.label))
            .collect::<Result<Vec<_>>>()?;
        let df = DataFrame::new(columns)?;

        if df.height() == 0 {
            tracing::info!(file = %file.display(), layout = %layout.name, "File has no records");
        } else {
            tracing::debug!(
                file = %file.display(),
                layout = %layout.name,
                rows = df.height(),
                columns = df.width(),
                converters = self.use_column_converters,
                "Decoded fixed-width file"
            );
        }
        Ok(df)
    }
}
