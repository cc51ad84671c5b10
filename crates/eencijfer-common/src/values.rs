//! Polars `AnyValue` conversions.
//!
//! Register tables arrive either typed (decoded with converters) or as raw
//! strings. These helpers read both shapes the same way.

use polars::prelude::AnyValue;

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null` and formats floats without trailing
/// zeros, so `2020.0` and `2020` render identically.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use eencijfer_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int64(2021)), "2021");
/// assert_eq!(any_to_string(AnyValue::Float64(2021.0)), "2021");
/// assert_eq!(any_to_string(AnyValue::String("ba")), "ba");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Converts `AnyValue` to a trimmed `String`, returning `None` when blank.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use eencijfer_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(6.5), "6.5");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Converts an `AnyValue` to `i64`, returning `None` for non-integer or null values.
///
/// Floats are accepted only when they carry no fractional part.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::Float32(v) => float_to_i64(f64::from(v)),
        AnyValue::Float64(v) => float_to_i64(v),
        AnyValue::String(s) => parse_i64(s),
        AnyValue::StringOwned(s) => parse_i64(&s),
        _ => None,
    }
}

fn float_to_i64(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 {
        Some(v as i64)
    } else {
        None
    }
}

/// Parses a string as `f64`, accepting a decimal comma.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', ".").parse::<f64>().ok()
}

/// Parses a string as `i64`, returning `None` for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_numbers() {
        assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
        assert_eq!(any_to_string(AnyValue::Int64(-100)), "-100");
        assert_eq!(any_to_string(AnyValue::Float64(1.5)), "1.5");
        assert_eq!(any_to_string(AnyValue::Float64(20.0)), "20");
    }

    #[test]
    fn test_any_to_string_non_empty_trims() {
        assert_eq!(any_to_string_non_empty(AnyValue::Null), None);
        assert_eq!(any_to_string_non_empty(AnyValue::String("  ")), None);
        assert_eq!(
            any_to_string_non_empty(AnyValue::String(" 34567 ")),
            Some("34567".to_string())
        );
    }

    #[test]
    fn test_format_numeric_keeps_integer_zeros() {
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(2020.0), "2020");
        assert_eq!(format_numeric(-0.5), "-0.5");
    }

    #[test]
    fn test_any_to_i64() {
        assert_eq!(any_to_i64(AnyValue::Null), None);
        assert_eq!(any_to_i64(AnyValue::Float64(2020.0)), Some(2020));
        assert_eq!(any_to_i64(AnyValue::Float64(3.9)), None);
        assert_eq!(any_to_i64(AnyValue::String("100")), Some(100));
        assert_eq!(any_to_i64(AnyValue::String("ba")), None);
    }

    #[test]
    fn test_parse_f64_decimal_comma() {
        assert_eq!(parse_f64("5,5"), Some(5.5));
        assert_eq!(parse_f64(" 7.0 "), Some(7.0));
        assert_eq!(parse_f64(""), None);
    }
}
