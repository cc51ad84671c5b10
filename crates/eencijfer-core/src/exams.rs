//! Final-exam grades reshaped from one row per subject to one row per
//! subject and exam kind.
//!
//! Every score column (`CijferEersteCentraalExamen`, ...) becomes a long row
//! with its attempt number and exam kind. Per student, prior education,
//! exam kind and subject only the last attempt is kept.

use std::collections::HashMap;

use polars::prelude::{Column, DataFrame, IdxCa, IdxSize, NamedFrom, NewChunkedArray, PlSmallStr};

use eencijfer_common::{
    LeftJoin, RowKey, any_to_f64, any_to_string_non_empty, column, ensure_unique, has_column,
    require_columns, string_column, string_values,
};
use eencijfer_model::ExamKind;
use eencijfer_model::columns::{
    CIJFER, DIPLOMAJAAR, OMSCHRIJVING_VOOROPLEIDING_OORSPRONKELIJK, PERSOONSGEBONDEN_NUMMER,
    POGING, SCORE_COLUMNS, SOORT_EXAMEN, VAK_AFKORTING, VAK_CODE, VOOROPLEIDING,
    VOOROPLEIDING_OORSPRONKELIJK,
};
use eencijfer_transform::{DEC_VOOROPL, VOOROPLEIDING_OVERIG, vooropleiding_kort};

use crate::error::{CoreError, Result};

/// Attempt number encoded in a score column name; 1 when none is named.
pub fn attempt_for(score_column: &str) -> i64 {
    if score_column.contains("Derde") {
        3
    } else if score_column.contains("Tweede") {
        2
    } else {
        1
    }
}

/// Exam kind encoded in a score column name.
pub fn exam_kind_for(score_column: &str) -> ExamKind {
    if score_column.contains("Centraal") {
        ExamKind::Central
    } else {
        ExamKind::School
    }
}

/// Short prior-education code per exam row.
///
/// Joins `Dec_vooropl` on the original prior-education code. Without the
/// reference table every row becomes `overig`.
pub fn exam_prior_education(
    exams: &DataFrame,
    reference: Option<&DataFrame>,
) -> Result<Vec<String>> {
    let Some(reference) = reference else {
        tracing::warn!(
            table = DEC_VOOROPL,
            "Prior-education reference not found, using '{VOOROPLEIDING_OVERIG}'"
        );
        return Ok(vec![VOOROPLEIDING_OVERIG.to_string(); exams.height()]);
    };
    require_columns(
        reference,
        &[
            VOOROPLEIDING_OORSPRONKELIJK,
            OMSCHRIJVING_VOOROPLEIDING_OORSPRONKELIJK,
        ],
    )?;
    ensure_unique(reference, &[VOOROPLEIDING_OORSPRONKELIJK], DEC_VOOROPL)?;

    let lookup = reference.select([
        VOOROPLEIDING_OORSPRONKELIJK,
        OMSCHRIJVING_VOOROPLEIDING_OORSPRONKELIJK,
    ])?;
    let joined = LeftJoin::on("vooropleiding_examen", &[VOOROPLEIDING_OORSPRONKELIJK])
        .execute(exams, &lookup)?;
    let description = if has_column(exams, OMSCHRIJVING_VOOROPLEIDING_OORSPRONKELIJK) {
        format!("{OMSCHRIJVING_VOOROPLEIDING_OORSPRONKELIJK}_right")
    } else {
        OMSCHRIJVING_VOOROPLEIDING_OORSPRONKELIJK.to_string()
    };

    Ok(string_values(&joined, &description)?
        .into_iter()
        .map(|d| {
            d.as_deref()
                .map_or(VOOROPLEIDING_OVERIG, vooropleiding_kort)
                .to_string()
        })
        .collect())
}

/// One score of one wide row.
#[derive(Debug, Clone, Copy)]
struct Score {
    source_row: usize,
    attempt: i64,
    kind: ExamKind,
    value: f64,
}

fn collect_scores(exams: &DataFrame) -> Result<Vec<Score>> {
    let present: Vec<(&str, &Column)> = SCORE_COLUMNS
        .into_iter()
        .filter_map(|name| exams.column(name).ok().map(|col| (name, col)))
        .collect();
    if present.len() < SCORE_COLUMNS.len() {
        tracing::debug!(
            present = present.len(),
            expected = SCORE_COLUMNS.len(),
            "Some score columns are absent"
        );
    }

    let mut scores = Vec::new();
    for row in 0..exams.height() {
        for (name, col) in &present {
            let raw = col.get(row)?;
            let Some(text) = any_to_string_non_empty(raw.clone()) else {
                continue;
            };
            let value = any_to_f64(raw).ok_or_else(|| CoreError::InvalidScore {
                column: (*name).to_string(),
                row: row + 1,
                value: text,
            })?;
            scores.push(Score {
                source_row: row,
                attempt: attempt_for(name),
                kind: exam_kind_for(name),
                value,
            });
        }
    }
    Ok(scores)
}

/// Reshapes the exam table into one row per kept grade.
///
/// Output columns: `PersoonsgebondenNummer`, `Vooropleiding`,
/// `Diplomajaar`, `VakCode`, `VakAfkorting`, `Poging`, `SoortExamen`,
/// `Cijfer`. Groups keep the position of their first score; the highest
/// attempt wins and ties keep the first.
pub fn reshape_exam_grades(exams: &DataFrame, reference: Option<&DataFrame>) -> Result<DataFrame> {
    require_columns(
        exams,
        &[PERSOONSGEBONDEN_NUMMER, DIPLOMAJAAR, VAK_CODE, VAK_AFKORTING],
    )?;
    let prior = exam_prior_education(exams, reference)?;
    let ids = string_values(exams, PERSOONSGEBONDEN_NUMMER)?;
    let codes = string_values(exams, VAK_CODE)?;
    let abbreviations = string_values(exams, VAK_AFKORTING)?;

    let scores = collect_scores(exams)?;
    let long_rows = scores.len();

    let mut groups: HashMap<RowKey, usize> = HashMap::new();
    let mut kept: Vec<Score> = Vec::new();
    for score in scores {
        let row = score.source_row;
        let key: RowKey = vec![
            ids[row].clone().unwrap_or_default(),
            prior[row].clone(),
            score.kind.as_str().to_string(),
            abbreviations[row].clone().unwrap_or_default(),
            codes[row].clone().unwrap_or_default(),
        ];
        match groups.get(&key) {
            Some(&slot) => {
                if score.attempt > kept[slot].attempt {
                    kept[slot] = score;
                }
            }
            None => {
                groups.insert(key, kept.len());
                kept.push(score);
            }
        }
    }

    let idx = IdxCa::from_vec(
        PlSmallStr::from_static("rows"),
        kept.iter().map(|s| s.source_row as IdxSize).collect(),
    );
    let take = |name: &str| -> Result<Column> { Ok(column(exams, name)?.take(&idx)?) };

    let df = DataFrame::new(vec![
        take(PERSOONSGEBONDEN_NUMMER)?,
        string_column(
            VOOROPLEIDING,
            kept.iter()
                .map(|s| Some(prior[s.source_row].clone()))
                .collect(),
        ),
        take(DIPLOMAJAAR)?,
        take(VAK_CODE)?,
        take(VAK_AFKORTING)?,
        Column::new(
            POGING.into(),
            kept.iter().map(|s| s.attempt).collect::<Vec<i64>>(),
        ),
        Column::new(
            SOORT_EXAMEN.into(),
            kept.iter().map(|s| s.kind.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            CIJFER.into(),
            kept.iter().map(|s| s.value).collect::<Vec<f64>>(),
        ),
    ])?;

    tracing::info!(
        input_rows = exams.height(),
        scores = long_rows,
        rows = df.height(),
        "Exam grades reshaped"
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_and_kind_from_column_name() {
        assert_eq!(attempt_for("CijferEersteCentraalExamen"), 1);
        assert_eq!(attempt_for("CijferTweedeCentraalExamen"), 2);
        assert_eq!(attempt_for("CijferDerdeCentraalExamen"), 3);
        assert_eq!(attempt_for("CijferSchoolexamen"), 1);
        assert_eq!(exam_kind_for("CijferDerdeCentraalExamen"), ExamKind::Central);
        assert_eq!(exam_kind_for("CijferSchoolexamen"), ExamKind::School);
    }
}
