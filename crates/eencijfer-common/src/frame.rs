//! Row-oriented DataFrame helpers.
//!
//! Keys are compared through their trimmed string rendering, so an integer
//! key column and a string key column holding the same digits match. Joins
//! are left joins that must keep the left row count; a right table that
//! matches a left row more than once is reported instead of silently
//! multiplying rows.

use std::collections::{HashMap, HashSet};

use polars::prelude::{
    BooleanChunked, Column, DataFrame, IdxCa, IdxSize, NamedFrom, NewChunkedArray, PlSmallStr,
};

use crate::error::{FrameError, Result};
use crate::values::{any_to_f64, any_to_i64, any_to_string_non_empty};

/// Composite key of one row.
pub type RowKey = Vec<String>;

/// Looks up a column, mapping absence to [`FrameError::MissingColumn`].
pub fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| FrameError::MissingColumn {
        column: name.to_string(),
    })
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Fails on the first name that is not a column of `df`.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        column(df, name)?;
    }
    Ok(())
}

/// Column values as trimmed strings; nulls and blanks become `None`.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = column(df, name)?;
    (0..df.height())
        .map(|idx| Ok(any_to_string_non_empty(column.get(idx)?)))
        .collect()
}

/// Column values as integers; nulls and non-integers become `None`.
pub fn int_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = column(df, name)?;
    (0..df.height())
        .map(|idx| Ok(any_to_i64(column.get(idx)?)))
        .collect()
}

/// Column values as floats; nulls and non-numeric values become `None`.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = column(df, name)?;
    (0..df.height())
        .map(|idx| Ok(any_to_f64(column.get(idx)?)))
        .collect()
}

fn key_parts(df: &DataFrame, columns: &[&str]) -> Result<Vec<Vec<Option<String>>>> {
    columns.iter().map(|name| string_values(df, name)).collect()
}

/// Composite keys per row; `None` when any part of the key is missing.
pub fn row_keys(df: &DataFrame, columns: &[&str]) -> Result<Vec<Option<RowKey>>> {
    let parts = key_parts(df, columns)?;
    Ok((0..df.height())
        .map(|row| {
            parts
                .iter()
                .map(|values| values[row].clone())
                .collect::<Option<RowKey>>()
        })
        .collect())
}

/// Composite keys per row with missing parts rendered as empty strings.
pub fn row_keys_lossy(df: &DataFrame, columns: &[&str]) -> Result<Vec<RowKey>> {
    let parts = key_parts(df, columns)?;
    Ok((0..df.height())
        .map(|row| {
            parts
                .iter()
                .map(|values| values[row].clone().unwrap_or_default())
                .collect()
        })
        .collect())
}

/// Checks that no two rows share a (complete) key.
pub fn ensure_unique(df: &DataFrame, columns: &[&str], table: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for key in row_keys(df, columns)?.into_iter().flatten() {
        if seen.contains(&key) {
            return Err(FrameError::DuplicateKey {
                table: table.to_string(),
                columns: columns.join(", "),
                key: key.join("|"),
            });
        }
        seen.insert(key);
    }
    Ok(())
}

/// Keeps the rows where `mask` is true.
pub fn filter_rows(df: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice(PlSmallStr::from_static("mask"), mask);
    Ok(df.filter(&mask)?)
}

/// Sorts by `order_by` ascending (missing values last, stable) and keeps the
/// first row of every key.
pub fn keep_first_by(df: &DataFrame, keys: &[&str], order_by: &str) -> Result<DataFrame> {
    let order = int_values(df, order_by)?;
    let row_keys = row_keys_lossy(df, keys)?;
    let mut rows: Vec<usize> = (0..df.height()).collect();
    rows.sort_by_key(|&row| (order[row].is_none(), order[row]));

    let mut seen: HashSet<&RowKey> = HashSet::new();
    let keep: Vec<IdxSize> = rows
        .into_iter()
        .filter(|&row| seen.insert(&row_keys[row]))
        .map(|row| row as IdxSize)
        .collect();
    let idx = IdxCa::from_vec(PlSmallStr::from_static("keep"), keep);
    Ok(df.take(&idx)?)
}

/// 0/1 indicator column.
pub fn indicator_column(name: &str, flags: &[bool]) -> Column {
    let values: Vec<i32> = flags.iter().map(|&flag| i32::from(flag)).collect();
    Column::new(name.into(), values)
}

pub fn int_column(name: &str, values: Vec<Option<i64>>) -> Column {
    Column::new(name.into(), values)
}

pub fn string_column(name: &str, values: Vec<Option<String>>) -> Column {
    Column::new(name.into(), values)
}

/// A row-preserving left join.
///
/// Right key columns with the same name as their left counterpart are
/// merged into the left column. Other right columns whose name already
/// exists on the left get `suffix` appended.
#[derive(Debug, Clone, Copy)]
pub struct LeftJoin<'a> {
    step: &'a str,
    left_on: &'a [&'a str],
    right_on: &'a [&'a str],
    suffix: &'a str,
    drop_right_keys: bool,
}

impl<'a> LeftJoin<'a> {
    /// Join on keys that carry the same names on both sides.
    pub fn on(step: &'a str, keys: &'a [&'a str]) -> Self {
        Self::new(step, keys, keys)
    }

    pub fn new(step: &'a str, left_on: &'a [&'a str], right_on: &'a [&'a str]) -> Self {
        Self {
            step,
            left_on,
            right_on,
            suffix: "_right",
            drop_right_keys: false,
        }
    }

    #[must_use]
    pub fn suffix(mut self, suffix: &'a str) -> Self {
        self.suffix = suffix;
        self
    }

    /// Do not attach right key columns, even when their names differ.
    #[must_use]
    pub fn drop_right_keys(mut self) -> Self {
        self.drop_right_keys = true;
        self
    }

    /// Names the attached columns will carry, in right-table order.
    pub fn attached_names(&self, left: &DataFrame, right: &DataFrame) -> Vec<(String, String)> {
        let skipped: HashSet<&str> = self
            .left_on
            .iter()
            .zip(self.right_on)
            .filter(|(l, r)| self.drop_right_keys || l == r)
            .map(|(_, r)| *r)
            .collect();
        right
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .filter(|name| !skipped.contains(name))
            .map(|name| {
                let target = if has_column(left, name) {
                    format!("{name}{}", self.suffix)
                } else {
                    name.to_string()
                };
                (name.to_string(), target)
            })
            .collect()
    }

    pub fn execute(&self, left: &DataFrame, right: &DataFrame) -> Result<DataFrame> {
        if self.left_on.len() != self.right_on.len() {
            return Err(FrameError::KeyArity {
                step: self.step.to_string(),
                left: self.left_on.len(),
                right: self.right_on.len(),
            });
        }
        require_columns(left, self.left_on)?;
        require_columns(right, self.right_on)?;

        let mut index: HashMap<RowKey, Vec<IdxSize>> = HashMap::new();
        for (row, key) in row_keys(right, self.right_on)?.into_iter().enumerate() {
            if let Some(key) = key {
                index.entry(key).or_default().push(row as IdxSize);
            }
        }

        let mut take: Vec<Option<IdxSize>> = Vec::with_capacity(left.height());
        let mut produced = 0usize;
        for key in row_keys(left, self.left_on)? {
            match key.as_ref().and_then(|key| index.get(key)) {
                Some(rows) => {
                    produced += rows.len();
                    take.push(rows.first().copied());
                }
                None => {
                    produced += 1;
                    take.push(None);
                }
            }
        }
        if produced != left.height() {
            return Err(FrameError::RowCountMismatch {
                step: self.step.to_string(),
                expected: left.height(),
                actual: produced,
            });
        }

        let names = self.attached_names(left, right);
        if names.is_empty() {
            return Ok(left.clone());
        }
        let idx = IdxCa::from_iter_options(PlSmallStr::from_static("take"), take.into_iter());
        let mut attached = Vec::with_capacity(names.len());
        for (source, target) in &names {
            let taken = column(right, source)?.take(&idx)?;
            attached.push(taken.with_name(target.as_str().into()));
        }
        let mut joined = left.clone();
        joined.hstack_mut(&attached)?;
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn students() -> DataFrame {
        DataFrame::new(vec![
            Column::new("pgn".into(), vec![1i64, 2, 3]),
            Column::new("code".into(), vec!["A", "B", "Z"]),
        ])
        .unwrap()
    }

    #[test]
    fn left_join_fills_unmatched_with_null() {
        let right = DataFrame::new(vec![
            Column::new("code".into(), vec!["A", "B"]),
            Column::new("name".into(), vec!["alpha", "beta"]),
        ])
        .unwrap();
        let joined = LeftJoin::on("names", &["code"])
            .execute(&students(), &right)
            .unwrap();
        assert_eq!(joined.height(), 3);
        assert_eq!(
            string_values(&joined, "name").unwrap(),
            vec![Some("alpha".to_string()), Some("beta".to_string()), None]
        );
    }

    #[test]
    fn left_join_rejects_fan_out() {
        let right = DataFrame::new(vec![
            Column::new("code".into(), vec!["A", "A"]),
            Column::new("name".into(), vec!["alpha", "again"]),
        ])
        .unwrap();
        let err = LeftJoin::on("names", &["code"])
            .execute(&students(), &right)
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::RowCountMismatch {
                expected: 3,
                actual: 4,
                ..
            }
        ));
    }

    #[test]
    fn left_join_suffixes_collisions_and_keeps_differently_named_keys() {
        let right = DataFrame::new(vec![
            Column::new("ref".into(), vec!["A"]),
            Column::new("pgn".into(), vec![9i64]),
        ])
        .unwrap();
        let joined = LeftJoin::new("collide", &["code"], &["ref"])
            .suffix("_x")
            .execute(&students(), &right)
            .unwrap();
        let names: Vec<&str> = joined
            .get_column_names()
            .into_iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(names, vec!["pgn", "code", "ref", "pgn_x"]);
    }

    #[test]
    fn integer_and_string_keys_match() {
        let right = DataFrame::new(vec![
            Column::new("pgn".into(), vec!["2"]),
            Column::new("flag".into(), vec!["y"]),
        ])
        .unwrap();
        let joined = LeftJoin::on("mixed", &["pgn"])
            .execute(&students(), &right)
            .unwrap();
        assert_eq!(
            string_values(&joined, "flag").unwrap(),
            vec![None, Some("y".to_string()), None]
        );
    }

    #[test]
    fn keep_first_by_prefers_lowest_order() {
        let df = DataFrame::new(vec![
            Column::new("pgn".into(), vec![1i64, 1, 2]),
            Column::new("year".into(), vec![Some(2022i64), Some(2020), None]),
        ])
        .unwrap();
        let kept = keep_first_by(&df, &["pgn"], "year").unwrap();
        assert_eq!(kept.height(), 2);
        assert_eq!(
            int_values(&kept, "year").unwrap(),
            vec![Some(2020), None]
        );
    }

    #[test]
    fn ensure_unique_reports_key() {
        let df = DataFrame::new(vec![Column::new("code".into(), vec!["A", "B", "A"])]).unwrap();
        let err = ensure_unique(&df, &["code"], "Dec_isat").unwrap_err();
        assert!(err.to_string().contains("'A'"));
    }
}
