//! Column-layout definitions for fixed-width eencijfer files.
//!
//! A layout lists, per field, the label that becomes the column name, the
//! starting position and width of the field inside a record, and the
//! identifier of the converter applied to the sliced text.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label of the synthetic trailing field that catches bytes beyond the layout.
pub const GARBAGE_COLUMN: &str = "GarbageColumn";

/// Width of the synthetic garbage field.
pub const GARBAGE_WIDTH: usize = 10;

/// One row of a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayoutField {
    pub label: String,
    pub starting_position: usize,
    pub number_of_positions: usize,
    /// Converter identifier; empty when the definition leaves it blank.
    #[serde(default)]
    pub converter: String,
}

impl LayoutField {
    pub fn new(
        label: impl Into<String>,
        starting_position: usize,
        number_of_positions: usize,
        converter: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            starting_position,
            number_of_positions,
            converter: converter.into(),
        }
    }
}

/// A field with its byte span relative to the start of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpan {
    pub label: String,
    pub offset: usize,
    pub width: usize,
    pub converter: String,
}

impl FieldSpan {
    pub fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Reasons a layout cannot be used to slice records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutIssue {
    #[error("layout has no fields")]
    Empty,

    #[error("field '{label}' has zero width")]
    ZeroWidth { label: String },

    #[error("gap after field '{after}': next field starts at {found}, expected {expected}")]
    Gap {
        after: String,
        expected: usize,
        found: usize,
    },

    #[error("field '{field}' overlaps '{after}': starts at {found}, expected {expected}")]
    Overlap {
        after: String,
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("label '{label}' occurs more than once or is reserved")]
    DuplicateLabel { label: String },
}

/// An ordered set of fields describing one fixed-width file format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDefinition {
    /// Stem of the definition file this layout was read from.
    pub name: String,
    pub fields: Vec<LayoutField>,
}

impl LayoutDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<LayoutField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Total width of a record described by this layout.
    pub fn record_width(&self) -> usize {
        self.fields.iter().map(|f| f.number_of_positions).sum()
    }

    /// Resolves the fields into contiguous spans ordered by starting position.
    ///
    /// Offsets are relative to the lowest starting position, so both 0- and
    /// 1-based definitions produce spans starting at offset 0.
    pub fn spans(&self) -> Result<Vec<FieldSpan>, LayoutIssue> {
        let mut ordered: Vec<&LayoutField> = self.fields.iter().collect();
        ordered.sort_by_key(|f| f.starting_position);
        let Some(first) = ordered.first() else {
            return Err(LayoutIssue::Empty);
        };
        let base = first.starting_position;

        let mut seen = BTreeSet::new();
        seen.insert(GARBAGE_COLUMN.to_string());
        let mut spans: Vec<FieldSpan> = Vec::with_capacity(ordered.len());
        for field in ordered {
            if field.number_of_positions == 0 {
                return Err(LayoutIssue::ZeroWidth {
                    label: field.label.clone(),
                });
            }
            if !seen.insert(field.label.clone()) {
                return Err(LayoutIssue::DuplicateLabel {
                    label: field.label.clone(),
                });
            }
            let offset = field.starting_position - base;
            if let Some(previous) = spans.last() {
                let expected = previous.end();
                if offset > expected {
                    return Err(LayoutIssue::Gap {
                        after: previous.label.clone(),
                        expected: expected + base,
                        found: field.starting_position,
                    });
                }
                if offset < expected {
                    return Err(LayoutIssue::Overlap {
                        after: previous.label.clone(),
                        field: field.label.clone(),
                        expected: expected + base,
                        found: field.starting_position,
                    });
                }
            }
            spans.push(FieldSpan {
                label: field.label.clone(),
                offset,
                width: field.number_of_positions,
                converter: field.converter.clone(),
            });
        }
        Ok(spans)
    }
}
