//! Entry cohorts with first-year and degree indicators.
//!
//! The entry cohort holds the active primary enrollments in the first year
//! at the current institution. Every derivation below joins onto that set
//! and must keep its row count.
//!
//! # Derivation Order
//!
//! 1. Second-year enrollment (`*_2ejaar` columns)
//! 2. `UitvalEerstejaar`, `opleiding_gelijk`, `HerinschrijvingInstelling`,
//!    `SwitchBinnenInstelling`
//! 3. Earliest propedeuse (`JaarPropedeuseDiploma`, `PropedeuseIn1Jaar`,
//!    `PropedeuseIn2Jaar`, `Uitval1JaarMetPropedeuse`,
//!    `HerinschrijvingMetPropedeuse`)
//! 4. Earliest bachelor degree (`*_EenDiploma`)
//! 5. Earliest bachelor degree in the entry program (`*_DitDiploma`)
//! 6. `StatusNa1Jaar`, `Cohort`, `CohortType`, `TypeOpleiding`

use polars::prelude::{Column, DataFrame};

use eencijfer_common::{
    LeftJoin, filter_rows, has_column, indicator_column, int_column, int_values, keep_first_by,
    require_columns, string_column, string_values,
};
use eencijfer_model::columns::{
    AANTAL, ACTUELE_INSTELLING, BACHELOR_DIPLOMA, COHORT, COHORT_TYPE, DATUM_TEKENING_DIPLOMA,
    DEGREE_WINDOWS, DIPLOMA_FASE, DIPLOMAJAAR, DIT_BACHELOR_DIPLOMA, EERSTE_JAAR_INSTELLING,
    HERINSCHRIJVING_INSTELLING, HERINSCHRIJVING_MET_PROPEDEUSE, HO_DIPLOMA_EERSTE_JAAR,
    IN_PA_COHORT, INDICATIE_ACTIEF, INSCHRIJVINGSJAAR, JAAR_PROPEDEUSE_DIPLOMA,
    JAAR_TOT_DIT_DIPLOMA, JAAR_TOT_EEN_DIPLOMA, OPLEIDING, OPLEIDING_ACTUEEL, OPLEIDING_GELIJK,
    OPLEIDINGSVORM, PERSOONSGEBONDEN_NUMMER, PROPEDEUSE_IN_1_JAAR, PROPEDEUSE_IN_2_JAAR,
    SOORT_INSCHRIJVING_HO, STATUS_NA_1_JAAR, SUFFIX_DIT_DIPLOMA, SUFFIX_EEN_DIPLOMA,
    SUFFIX_TWEEDE_JAAR, SWITCH_BINNEN_INSTELLING, TYPE_HO, TYPE_OPLEIDING, UITVAL_EERSTE_JAAR,
    UITVAL_MET_PROPEDEUSE, dit_diploma_binnen, een_diploma_binnen,
};
use eencijfer_model::{DiplomaPhase, HigherEducationType, PerformanceAgreement, StatusAfterYear1};

use crate::error::Result;

const SECOND_YEAR_FIELDS: [&str; 5] = [
    PERSOONSGEBONDEN_NUMMER,
    OPLEIDING,
    ACTUELE_INSTELLING,
    OPLEIDINGSVORM,
    OPLEIDING_ACTUEEL,
];

const BACHELOR_FIELDS: [&str; 7] = [
    PERSOONSGEBONDEN_NUMMER,
    OPLEIDING_ACTUEEL,
    OPLEIDING,
    DATUM_TEKENING_DIPLOMA,
    DIPLOMAJAAR,
    OPLEIDINGSVORM,
    AANTAL,
];

/// Builds the cohort table from the enriched student table.
pub fn derive_cohorts(enriched: &DataFrame) -> Result<DataFrame> {
    require_columns(
        enriched,
        &[
            PERSOONSGEBONDEN_NUMMER,
            INSCHRIJVINGSJAAR,
            EERSTE_JAAR_INSTELLING,
            INDICATIE_ACTIEF,
            SOORT_INSCHRIJVING_HO,
            ACTUELE_INSTELLING,
            OPLEIDING,
            OPLEIDING_ACTUEEL,
            OPLEIDINGSVORM,
            HO_DIPLOMA_EERSTE_JAAR,
            DIPLOMA_FASE,
            DIPLOMAJAAR,
        ],
    )?;

    let entry = entry_cohort(enriched)?;
    tracing::info!(rows = entry.height(), "Entry cohort selected");

    let second_year = second_year(enriched)?;
    let mut cohort = LeftJoin::on("tweede_jaar", &[PERSOONSGEBONDEN_NUMMER])
        .suffix(SUFFIX_TWEEDE_JAAR)
        .execute(&entry, &second_year)?;
    add_first_year_flags(&mut cohort)?;

    let propedeuse = propedeuse_diplomas(enriched)?;
    cohort = LeftJoin::on("propedeuse", &[PERSOONSGEBONDEN_NUMMER]).execute(&cohort, &propedeuse)?;
    add_propedeuse_flags(&mut cohort)?;

    let bachelor = bachelor_diplomas(enriched)?;
    let first_degree = keep_first_by(&bachelor, &[PERSOONSGEBONDEN_NUMMER], DIPLOMAJAAR)?;
    cohort = LeftJoin::on("een_diploma", &[PERSOONSGEBONDEN_NUMMER])
        .suffix(SUFFIX_EEN_DIPLOMA)
        .execute(&cohort, &first_degree)?;
    add_degree_columns(&mut cohort, &EEN_DIPLOMA)?;

    let program_keys = [PERSOONSGEBONDEN_NUMMER, OPLEIDING];
    let program_degree = keep_first_by(&bachelor, &program_keys, DIPLOMAJAAR)?;
    cohort = LeftJoin::on("dit_diploma", &program_keys)
        .suffix(SUFFIX_DIT_DIPLOMA)
        .execute(&cohort, &program_degree)?;
    add_degree_columns(&mut cohort, &DIT_DIPLOMA)?;

    add_status(&mut cohort)?;
    add_cohort_labels(&mut cohort)?;

    tracing::info!(
        rows = cohort.height(),
        columns = cohort.width(),
        "Cohort table derived"
    );
    Ok(cohort)
}

fn is_one(value: Option<i64>) -> bool {
    value == Some(1)
}

/// Equality of two present values.
fn same(left: &[Option<String>], right: &[Option<String>]) -> Vec<bool> {
    left.iter()
        .zip(right)
        .map(|(l, r)| l.is_some() && l == r)
        .collect()
}

fn set_columns(df: &mut DataFrame, columns: Vec<Column>) -> Result<()> {
    for column in columns {
        df.with_column(column)?;
    }
    Ok(())
}

/// Active primary enrollments in the first year at the institution.
pub fn entry_cohort(df: &DataFrame) -> Result<DataFrame> {
    let active = int_values(df, INDICATIE_ACTIEF)?;
    let kind = int_values(df, SOORT_INSCHRIJVING_HO)?;
    let year = int_values(df, INSCHRIJVINGSJAAR)?;
    let first = int_values(df, EERSTE_JAAR_INSTELLING)?;

    let mask: Vec<bool> = (0..df.height())
        .map(|row| {
            is_one(active[row])
                && is_one(kind[row])
                && year[row].is_some()
                && year[row] == first[row]
        })
        .collect();
    Ok(filter_rows(df, &mask)?)
}

/// Primary enrollments one year after the first year at the institution.
fn second_year(df: &DataFrame) -> Result<DataFrame> {
    let kind = int_values(df, SOORT_INSCHRIJVING_HO)?;
    let year = int_values(df, INSCHRIJVINGSJAAR)?;
    let first = int_values(df, EERSTE_JAAR_INSTELLING)?;

    let mask: Vec<bool> = (0..df.height())
        .map(|row| {
            is_one(kind[row])
                && matches!((year[row], first[row]), (Some(y), Some(f)) if y == f + 1)
        })
        .collect();
    Ok(filter_rows(df, &mask)?.select(SECOND_YEAR_FIELDS)?)
}

/// Earliest propedeuse diploma per student.
fn propedeuse_diplomas(df: &DataFrame) -> Result<DataFrame> {
    let phase = string_values(df, DIPLOMA_FASE)?;
    let year = int_values(df, DIPLOMAJAAR)?;
    let mask: Vec<bool> = (0..df.height())
        .map(|row| {
            year[row].is_some()
                && phase[row].as_deref().and_then(DiplomaPhase::from_code)
                    == Some(DiplomaPhase::Propedeuse)
        })
        .collect();
    let diplomas = filter_rows(df, &mask)?;
    let mut earliest = keep_first_by(&diplomas, &[PERSOONSGEBONDEN_NUMMER], DIPLOMAJAAR)?
        .select([PERSOONSGEBONDEN_NUMMER, DIPLOMAJAAR])?;
    earliest.rename(DIPLOMAJAAR, JAAR_PROPEDEUSE_DIPLOMA.into())?;
    Ok(earliest)
}

/// Bachelor diplomas with a present, non-zero diploma year.
fn bachelor_diplomas(df: &DataFrame) -> Result<DataFrame> {
    let phase = string_values(df, DIPLOMA_FASE)?;
    let year = int_values(df, DIPLOMAJAAR)?;
    let mask: Vec<bool> = (0..df.height())
        .map(|row| {
            year[row].is_some_and(|y| y != 0)
                && phase[row].as_deref().and_then(DiplomaPhase::from_code)
                    == Some(DiplomaPhase::Bachelor)
        })
        .collect();
    let fields: Vec<&str> = BACHELOR_FIELDS
        .into_iter()
        .filter(|name| has_column(df, name))
        .collect();
    Ok(filter_rows(df, &mask)?.select(fields)?)
}

fn add_first_year_flags(cohort: &mut DataFrame) -> Result<()> {
    let second = |name: &str| format!("{name}{SUFFIX_TWEEDE_JAAR}");

    let institution = string_values(cohort, ACTUELE_INSTELLING)?;
    let institution_2 = string_values(cohort, &second(ACTUELE_INSTELLING))?;
    let same_institution = same(&institution, &institution_2);

    let program_same = same(
        &string_values(cohort, OPLEIDING)?,
        &string_values(cohort, &second(OPLEIDING))?,
    );
    let equivalent_same = same(
        &string_values(cohort, OPLEIDING_ACTUEEL)?,
        &string_values(cohort, &second(OPLEIDING_ACTUEEL))?,
    );
    let degree: Vec<bool> = int_values(cohort, HO_DIPLOMA_EERSTE_JAAR)?
        .into_iter()
        .map(is_one)
        .collect();

    let rows = cohort.height();
    let dropout: Vec<bool> = (0..rows)
        .map(|row| !(same_institution[row] || degree[row]))
        .collect();
    let same_program: Vec<bool> = (0..rows)
        .map(|row| program_same[row] || equivalent_same[row])
        .collect();
    // Re-enrollment is institution equality; the program-based value is overwritten.
    let reenrolled = same_institution;
    let switched: Vec<bool> = (0..rows)
        .map(|row| !same_program[row] && !dropout[row] && !degree[row])
        .collect();

    set_columns(
        cohort,
        vec![
            indicator_column(UITVAL_EERSTE_JAAR, &dropout),
            indicator_column(OPLEIDING_GELIJK, &same_program),
            indicator_column(HERINSCHRIJVING_INSTELLING, &reenrolled),
            indicator_column(SWITCH_BINNEN_INSTELLING, &switched),
        ],
    )
}

fn add_propedeuse_flags(cohort: &mut DataFrame) -> Result<()> {
    let first = int_values(cohort, EERSTE_JAAR_INSTELLING)?;
    let propedeuse = int_values(cohort, JAAR_PROPEDEUSE_DIPLOMA)?;
    let dropout = int_values(cohort, UITVAL_EERSTE_JAAR)?;
    let reenrolled = int_values(cohort, HERINSCHRIJVING_INSTELLING)?;

    let rows = cohort.height();
    let in_one: Vec<bool> = (0..rows)
        .map(|row| first[row].is_some() && propedeuse[row] == first[row])
        .collect();
    let in_two: Vec<bool> = (0..rows)
        .map(|row| {
            in_one[row]
                || matches!((propedeuse[row], first[row]), (Some(p), Some(f)) if p == f + 1)
        })
        .collect();
    let dropout_with: Vec<bool> = (0..rows)
        .map(|row| is_one(dropout[row]) && in_one[row])
        .collect();
    let reenrolled_with: Vec<bool> = (0..rows)
        .map(|row| is_one(reenrolled[row]) && in_one[row])
        .collect();

    set_columns(
        cohort,
        vec![
            indicator_column(PROPEDEUSE_IN_1_JAAR, &in_one),
            indicator_column(PROPEDEUSE_IN_2_JAAR, &in_two),
            indicator_column(UITVAL_MET_PROPEDEUSE, &dropout_with),
            indicator_column(HERINSCHRIJVING_MET_PROPEDEUSE, &reenrolled_with),
        ],
    )
}

/// Names of the columns derived from one degree join.
struct DegreeColumns {
    suffix: &'static str,
    has_degree: &'static str,
    years_to_degree: &'static str,
    within: fn(i64) -> String,
}

const EEN_DIPLOMA: DegreeColumns = DegreeColumns {
    suffix: SUFFIX_EEN_DIPLOMA,
    has_degree: BACHELOR_DIPLOMA,
    years_to_degree: JAAR_TOT_EEN_DIPLOMA,
    within: een_diploma_binnen,
};

const DIT_DIPLOMA: DegreeColumns = DegreeColumns {
    suffix: SUFFIX_DIT_DIPLOMA,
    has_degree: DIT_BACHELOR_DIPLOMA,
    years_to_degree: JAAR_TOT_DIT_DIPLOMA,
    within: dit_diploma_binnen,
};

fn add_degree_columns(cohort: &mut DataFrame, names: &DegreeColumns) -> Result<()> {
    let first = int_values(cohort, EERSTE_JAAR_INSTELLING)?;
    let degree_year = int_values(cohort, &format!("{DIPLOMAJAAR}{}", names.suffix))?;

    let has_degree: Vec<bool> = degree_year.iter().map(Option::is_some).collect();
    let years: Vec<Option<i64>> = degree_year
        .iter()
        .zip(&first)
        .map(|(degree, first)| Some((*degree)? - (*first)?))
        .collect();

    let mut columns = vec![
        indicator_column(names.has_degree, &has_degree),
        int_column(names.years_to_degree, years.clone()),
    ];
    for window in DEGREE_WINDOWS {
        let within: Vec<bool> = years
            .iter()
            .map(|years| years.is_some_and(|y| y <= window - 1))
            .collect();
        columns.push(indicator_column(&(names.within)(window), &within));
    }
    set_columns(cohort, columns)
}

fn add_status(cohort: &mut DataFrame) -> Result<()> {
    let switched = int_values(cohort, SWITCH_BINNEN_INSTELLING)?;
    let degree = int_values(cohort, HO_DIPLOMA_EERSTE_JAAR)?;
    let dropout = int_values(cohort, UITVAL_EERSTE_JAAR)?;

    let status = (0..cohort.height())
        .map(|row| {
            let status = StatusAfterYear1::classify(
                is_one(switched[row]),
                is_one(degree[row]),
                is_one(dropout[row]),
            );
            Some(status.as_str().to_string())
        })
        .collect();
    set_columns(cohort, vec![string_column(STATUS_NA_1_JAAR, status)])
}

fn add_cohort_labels(cohort: &mut DataFrame) -> Result<()> {
    let mut columns = vec![int_column(COHORT, int_values(cohort, INSCHRIJVINGSJAAR)?)];

    if has_column(cohort, IN_PA_COHORT) {
        let types = string_values(cohort, IN_PA_COHORT)?
            .into_iter()
            .map(|flag| {
                flag.map(|flag| match PerformanceAgreement::parse(&flag) {
                    Some(agreement) => agreement.cohort_type().to_string(),
                    None => flag,
                })
            })
            .collect();
        columns.push(string_column(COHORT_TYPE, types));
    }

    if has_column(cohort, TYPE_HO) {
        let types = string_values(cohort, TYPE_HO)?
            .into_iter()
            .map(|code| {
                code.map(|code| match HigherEducationType::from_code(&code) {
                    Some(kind) => kind.as_str().to_string(),
                    None => code,
                })
            })
            .collect();
        columns.push(string_column(TYPE_OPLEIDING, types));
    }
    set_columns(cohort, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_requires_both_values() {
        let left = vec![Some("A".to_string()), None, Some("B".to_string())];
        let right = vec![Some("A".to_string()), None, Some("C".to_string())];
        assert_eq!(same(&left, &right), vec![true, false, false]);
    }
}
