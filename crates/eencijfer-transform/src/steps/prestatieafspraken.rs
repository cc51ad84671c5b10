//! Performance-agreement (prestatieafspraken) cohort flag.
//!
//! A record belongs to the cohort when all of these hold:
//!
//! - active on the reference date
//! - primary enrollment
//! - bachelor level
//! - program code does not start with `80` (associate degrees)
//! - full-time
//! - highest prior education equals the highest prior education before
//!   higher education
//! - first year in higher education equals the enrollment year
//!
//! Missing values make a predicate false.

use polars::prelude::DataFrame;

use eencijfer_common::{int_values, string_column, string_values};
use eencijfer_model::columns::{
    EERSTE_JAAR_HO, HOOGSTE_VOOROPLEIDING, HOOGSTE_VOOROPLEIDING_VOOR_HO, INDICATIE_ACTIEF,
    IN_PA_COHORT, INSCHRIJVINGSJAAR, OPLEIDINGSCODE, OPLEIDINGSVORM, SOORT_INSCHRIJVING_HO,
    TYPE_HO,
};
use eencijfer_model::{EnrollmentForm, PerformanceAgreement};

use super::with_columns;
use crate::error::Result;
use crate::pipeline::EnrichmentStep;
use crate::reference::ReferenceTables;

const ASSOCIATE_DEGREE_PREFIX: &str = "80";

/// Evaluates the cohort predicates per row.
pub fn in_pa_cohort(df: &DataFrame) -> Result<Vec<bool>> {
    let active = int_values(df, INDICATIE_ACTIEF)?;
    let enrollment_kind = int_values(df, SOORT_INSCHRIJVING_HO)?;
    let level = string_values(df, TYPE_HO)?;
    let program = string_values(df, OPLEIDINGSCODE)?;
    let form = string_values(df, OPLEIDINGSVORM)?;
    let prior = string_values(df, HOOGSTE_VOOROPLEIDING)?;
    let prior_before_ho = string_values(df, HOOGSTE_VOOROPLEIDING_VOOR_HO)?;
    let first_year_ho = int_values(df, EERSTE_JAAR_HO)?;
    let year = int_values(df, INSCHRIJVINGSJAAR)?;

    let flags = (0..df.height())
        .map(|row| {
            active[row] == Some(1)
                && enrollment_kind[row] == Some(1)
                && level[row].as_deref() == Some("ba")
                && program[row]
                    .as_deref()
                    .is_some_and(|code| !code.starts_with(ASSOCIATE_DEGREE_PREFIX))
                && form[row]
                    .as_deref()
                    .and_then(|form| form.parse::<EnrollmentForm>().ok())
                    == Some(EnrollmentForm::Voltijd)
                && prior[row].is_some()
                && prior[row] == prior_before_ho[row]
                && year[row].is_some()
                && first_year_ho[row] == year[row]
        })
        .collect();
    Ok(flags)
}

/// Adds `InPACohortDefinitie` (`Ja`/`Nee`).
pub struct PaCohortStep;

impl EnrichmentStep for PaCohortStep {
    fn step_name(&self) -> &str {
        "pa_cohort"
    }

    fn declared_columns(&self, _input: &DataFrame, _refs: &ReferenceTables) -> Vec<String> {
        vec![IN_PA_COHORT.to_string()]
    }

    fn execute(&self, df: &DataFrame, _refs: &ReferenceTables) -> Result<DataFrame> {
        let flags = in_pa_cohort(df)?;
        let members = flags.iter().filter(|flag| **flag).count();
        tracing::debug!(
            step = self.step_name(),
            members,
            rows = df.height(),
            "Performance-agreement cohort"
        );
        let labels = flags
            .into_iter()
            .map(|flag| Some(PerformanceAgreement::from_flag(flag).as_str().to_string()))
            .collect();
        with_columns(df, vec![string_column(IN_PA_COHORT, labels)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, NamedFrom};

    fn record(program: &str, form: &str, first_year_ho: i64) -> DataFrame {
        DataFrame::new(vec![
            Column::new(INDICATIE_ACTIEF.into(), vec![1i64]),
            Column::new(SOORT_INSCHRIJVING_HO.into(), vec![1i64]),
            Column::new(TYPE_HO.into(), vec!["ba"]),
            Column::new(OPLEIDINGSCODE.into(), vec![program]),
            Column::new(OPLEIDINGSVORM.into(), vec![form]),
            Column::new(HOOGSTE_VOOROPLEIDING.into(), vec!["203"]),
            Column::new(HOOGSTE_VOOROPLEIDING_VOOR_HO.into(), vec!["203"]),
            Column::new(EERSTE_JAAR_HO.into(), vec![first_year_ho]),
            Column::new(INSCHRIJVINGSJAAR.into(), vec![2020i64]),
        ])
        .unwrap()
    }

    #[test]
    fn all_predicates_must_hold() {
        assert_eq!(in_pa_cohort(&record("34479", "voltijd", 2020)).unwrap(), vec![true]);
        assert_eq!(in_pa_cohort(&record("34479", "1", 2020)).unwrap(), vec![true]);
        assert_eq!(in_pa_cohort(&record("80001", "voltijd", 2020)).unwrap(), vec![false]);
        assert_eq!(in_pa_cohort(&record("34479", "deeltijd", 2020)).unwrap(), vec![false]);
        assert_eq!(in_pa_cohort(&record("34479", "voltijd", 2019)).unwrap(), vec![false]);
    }

    #[test]
    fn step_writes_ja_nee() {
        let out = PaCohortStep
            .execute(&record("34479", "voltijd", 2020), &ReferenceTables::default())
            .unwrap();
        assert_eq!(
            string_values(&out, IN_PA_COHORT).unwrap(),
            vec![Some("Ja".to_string())]
        );
    }
}
