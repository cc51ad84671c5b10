//! Diploma type and first-year degree indicator.

use polars::prelude::DataFrame;

use eencijfer_common::{indicator_column, int_values, string_column, string_values};
use eencijfer_model::DiplomaPhase;
use eencijfer_model::columns::{
    DIPLOMA_FASE, DIPLOMAJAAR, EERSTE_JAAR_INSTELLING, HO_DIPLOMA_EERSTE_JAAR, SOORT_DIPLOMA,
};

use super::with_columns;
use crate::error::Result;
use crate::pipeline::EnrichmentStep;
use crate::reference::ReferenceTables;

/// Diploma type label. Codes outside the table are kept as they are.
pub struct SoortDiplomaStep;

impl EnrichmentStep for SoortDiplomaStep {
    fn step_name(&self) -> &str {
        "soort_diploma"
    }

    fn declared_columns(&self, _input: &DataFrame, _refs: &ReferenceTables) -> Vec<String> {
        vec![SOORT_DIPLOMA.to_string()]
    }

    fn execute(&self, df: &DataFrame, _refs: &ReferenceTables) -> Result<DataFrame> {
        let labels = string_values(df, DIPLOMA_FASE)?
            .into_iter()
            .map(|code| {
                code.map(|code| match DiplomaPhase::from_code(&code) {
                    Some(phase) => phase.as_str().to_string(),
                    None => code,
                })
            })
            .collect();
        with_columns(df, vec![string_column(SOORT_DIPLOMA, labels)])
    }
}

/// 1 when a degree (not a propedeuse) was obtained in the first year at the
/// institution, 0 otherwise.
pub struct HoDiplomaEersteJaarStep;

impl EnrichmentStep for HoDiplomaEersteJaarStep {
    fn step_name(&self) -> &str {
        "ho_diploma_eerste_jaar"
    }

    fn declared_columns(&self, _input: &DataFrame, _refs: &ReferenceTables) -> Vec<String> {
        vec![HO_DIPLOMA_EERSTE_JAAR.to_string()]
    }

    fn execute(&self, df: &DataFrame, _refs: &ReferenceTables) -> Result<DataFrame> {
        let phases = string_values(df, DIPLOMA_FASE)?;
        let diploma_years = int_values(df, DIPLOMAJAAR)?;
        let first_years = int_values(df, EERSTE_JAAR_INSTELLING)?;

        let flags: Vec<bool> = phases
            .iter()
            .zip(&diploma_years)
            .zip(&first_years)
            .map(|((phase, diploma_year), first_year)| {
                let degree = phase
                    .as_deref()
                    .and_then(DiplomaPhase::from_code)
                    .is_some_and(|phase| phase.is_degree());
                degree && diploma_year.is_some() && diploma_year == first_year
            })
            .collect();
        with_columns(df, vec![indicator_column(HO_DIPLOMA_EERSTE_JAAR, &flags)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, NamedFrom};

    fn diplomas() -> DataFrame {
        DataFrame::new(vec![
            Column::new(DIPLOMA_FASE.into(), vec![Some("B"), Some("D"), Some("X"), None]),
            Column::new(
                DIPLOMAJAAR.into(),
                vec![Some(2020i64), Some(2020), Some(2020), None],
            ),
            Column::new(
                EERSTE_JAAR_INSTELLING.into(),
                vec![Some(2020i64), Some(2020), Some(2020), None],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn unknown_diploma_codes_pass_through() {
        let out = SoortDiplomaStep
            .execute(&diplomas(), &ReferenceTables::default())
            .unwrap();
        assert_eq!(
            string_values(&out, SOORT_DIPLOMA).unwrap(),
            vec![
                Some("bachelor".to_string()),
                Some("propedeuse".to_string()),
                Some("X".to_string()),
                None
            ]
        );
    }

    #[test]
    fn propedeuse_is_not_a_first_year_degree() {
        let out = HoDiplomaEersteJaarStep
            .execute(&diplomas(), &ReferenceTables::default())
            .unwrap();
        assert_eq!(
            int_values(&out, HO_DIPLOMA_EERSTE_JAAR).unwrap(),
            vec![Some(1), Some(0), Some(0), Some(0)]
        );
    }
}
