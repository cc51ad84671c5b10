//! Named per-value converters applied while decoding fixed-width fields.
//!
//! The registry is built once with [`ConverterRegistry::standard`] and
//! passed by reference into the decoder. Every converter has a fixed output
//! kind, which decides the dtype of the decoded column.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use eencijfer_model::{EnrollmentForm, Sex};

/// Converter used when a layout names no converter or an unknown one.
pub const FALLBACK_CONVERTER: &str = "convert_to_object";

/// Days between 0001-01-01 and 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Dtype produced by a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Int,
    Float,
    Date,
    Null,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::Date => "date",
            ValueKind::Null => "null",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A converted field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
}

impl Value {
    /// Days since the Unix epoch for date values.
    pub fn epoch_days(date: NaiveDate) -> i32 {
        date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
    }
}

/// Converts one trimmed, non-empty field. `Ok(None)` means missing.
pub type ConvertFn = fn(&str) -> Result<Option<Value>, String>;

/// A registered converter.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    pub id: &'static str,
    pub kind: ValueKind,
    convert: ConvertFn,
}

impl Converter {
    pub const fn new(id: &'static str, kind: ValueKind, convert: ConvertFn) -> Self {
        Self { id, kind, convert }
    }

    pub fn convert(&self, raw: &str) -> Result<Option<Value>, String> {
        (self.convert)(raw)
    }
}

fn parse_int(raw: &str) -> Result<i64, String> {
    raw.parse::<i64>()
        .map_err(|_| format!("'{raw}' is not an integer"))
}

fn to_text(raw: &str) -> Result<Option<Value>, String> {
    Ok(Some(Value::Text(raw.to_string())))
}

fn to_int(raw: &str) -> Result<Option<Value>, String> {
    parse_int(raw).map(|v| Some(Value::Int(v)))
}

fn to_float(raw: &str) -> Result<Option<Value>, String> {
    raw.parse::<f64>()
        .map(|v| Some(Value::Float(v)))
        .map_err(|_| format!("'{raw}' is not a number"))
}

fn to_date(raw: &str) -> Result<Option<Value>, String> {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .map(|d| Some(Value::Date(d)))
        .map_err(|e| format!("'{raw}' is not a YYYYMMDD date: {e}"))
}

fn to_null(_raw: &str) -> Result<Option<Value>, String> {
    Ok(None)
}

/// `M`, `V` or anything else as `man`, `vrouw`, `onbekend`. Blank fields
/// never get here; they are null, not `onbekend`.
fn decode_sex(raw: &str) -> Result<Option<Value>, String> {
    Ok(Some(Value::Text(Sex::from_code(raw).as_str().to_string())))
}

fn decode_enrollment_form(raw: &str) -> Result<Option<Value>, String> {
    let code = parse_int(raw)?;
    let label = match EnrollmentForm::from_code(code) {
        Some(form) => form.as_str().to_string(),
        None => raw.to_string(),
    };
    Ok(Some(Value::Text(label)))
}

fn zero_to_missing(raw: &str) -> Result<Option<Value>, String> {
    match parse_int(raw)? {
        0 => Ok(None),
        v => Ok(Some(Value::Int(v))),
    }
}

const STANDARD: [Converter; 8] = [
    Converter::new("convert_to_object", ValueKind::Text, to_text),
    Converter::new("convert_to_int64", ValueKind::Int, to_int),
    Converter::new("convert_to_float64", ValueKind::Float, to_float),
    Converter::new("convert_to_date", ValueKind::Date, to_date),
    Converter::new("convert_to_none", ValueKind::Null, to_null),
    Converter::new("convert_geslacht", ValueKind::Text, decode_sex),
    Converter::new("convert_opleidingsvorm", ValueKind::Text, decode_enrollment_form),
    Converter::new("convert_to_int_zero_to_nan", ValueKind::Int, zero_to_missing),
];

/// Immutable mapping from converter id to converter.
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    converters: BTreeMap<&'static str, Converter>,
    fallback: Converter,
}

impl ConverterRegistry {
    /// Registry with every converter the definition files refer to.
    pub fn standard() -> Self {
        let converters = STANDARD.iter().map(|c| (c.id, *c)).collect();
        Self {
            converters,
            fallback: STANDARD[0],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Converter> {
        self.converters.get(id.trim())
    }

    /// The to-string converter substituted for unresolved ids.
    pub fn fallback(&self) -> &Converter {
        &self.fallback
    }

    /// Resolves `id`, returning the fallback and `false` when it is unknown.
    pub fn resolve(&self, id: &str) -> (&Converter, bool) {
        match self.get(id) {
            Some(converter) => (converter, true),
            None => (&self.fallback, false),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.converters.keys().copied()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(id: &str, raw: &str) -> Result<Option<Value>, String> {
        ConverterRegistry::standard()
            .get(id)
            .expect("registered")
            .convert(raw)
    }

    #[test]
    fn standard_registry_has_all_converters() {
        let registry = ConverterRegistry::standard();
        assert_eq!(registry.ids().count(), 8);
        assert_eq!(registry.fallback().id, FALLBACK_CONVERTER);
    }

    #[test]
    fn unknown_id_resolves_to_fallback() {
        let registry = ConverterRegistry::standard();
        let (converter, known) = registry.resolve("convert_to_roman");
        assert!(!known);
        assert_eq!(converter.kind, ValueKind::Text);
        let (_, known) = registry.resolve("");
        assert!(!known);
    }

    #[test]
    fn sex_decode() {
        assert_eq!(
            convert("convert_geslacht", "M").unwrap(),
            Some(Value::Text("man".into()))
        );
        assert_eq!(
            convert("convert_geslacht", "V").unwrap(),
            Some(Value::Text("vrouw".into()))
        );
        assert_eq!(
            convert("convert_geslacht", "O").unwrap(),
            Some(Value::Text("onbekend".into()))
        );
    }

    #[test]
    fn enrollment_form_decode_passes_unknown_codes_through() {
        assert_eq!(
            convert("convert_opleidingsvorm", "2").unwrap(),
            Some(Value::Text("deeltijd".into()))
        );
        assert_eq!(
            convert("convert_opleidingsvorm", "4").unwrap(),
            Some(Value::Text("4".into()))
        );
        assert!(convert("convert_opleidingsvorm", "x").is_err());
    }

    #[test]
    fn zero_becomes_missing() {
        assert_eq!(convert("convert_to_int_zero_to_nan", "0000").unwrap(), None);
        assert_eq!(
            convert("convert_to_int_zero_to_nan", "2019").unwrap(),
            Some(Value::Int(2019))
        );
    }

    #[test]
    fn dates_use_yyyymmdd() {
        let date = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        assert_eq!(
            convert("convert_to_date", "20230901").unwrap(),
            Some(Value::Date(date))
        );
        assert!(convert("convert_to_date", "01-09-2023").is_err());
        assert_eq!(Value::epoch_days(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1);
    }

    #[test]
    fn to_none_discards() {
        assert_eq!(convert("convert_to_none", "anything").unwrap(), None);
    }
}
