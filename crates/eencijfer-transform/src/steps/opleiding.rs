//! Program (opleiding) decoding: names, canonical code, sector, phase,
//! institution-local names and ISCED classification.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;

use eencijfer_common::{
    LeftJoin, ensure_unique, int_values, require_columns, string_column, string_values,
};
use eencijfer_model::columns::{
    CODE_OPLEIDING, CROHO_ONDERDEEL, CROHO_ONDERDEEL_ACTUEEL, ISCED_RUBRIEK, NAAM_OPLEIDING,
    NAAM_OPLEIDING_CROHO, OPLEIDING, OPLEIDING_ACTUEEL, OPLEIDING_HISTORISCH, OPLEIDINGSCODE,
    OPLEIDINGSFASE, TYPE_OPLEIDING,
};
use eencijfer_model::{CrohoSector, ProgramType};

use super::with_columns;
use crate::error::{Result, TransformError};
use crate::pipeline::EnrichmentStep;
use crate::reference::{DEC_HO_ISCED, DEC_ISAT, LOCAL_NAMES, ReferenceTables};

/// Fill value for program names that cannot be resolved.
pub const ONBEKEND: &str = "onbekend";

const SAMPLE_SIZE: usize = 5;

/// Distinct values of `codes` at the given rows, at most [`SAMPLE_SIZE`].
fn sample_codes(codes: &[Option<String>], rows: &[usize]) -> String {
    let distinct: BTreeSet<&str> = rows
        .iter()
        .map(|&row| codes[row].as_deref().unwrap_or("<leeg>"))
        .collect();
    distinct
        .into_iter()
        .take(SAMPLE_SIZE)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Target name of `source` among the columns a join attaches.
fn attached_target(names: &[(String, String)], source: &str) -> Option<String> {
    names
        .iter()
        .find(|(from, _)| from == source)
        .map(|(_, target)| target.clone())
}

/// Program name from `Dec_isat`; unresolved codes become `onbekend`.
pub struct NaamOpleidingStep;

impl NaamOpleidingStep {
    fn lookup(reference: &DataFrame) -> Result<DataFrame> {
        ensure_unique(reference, &[OPLEIDINGSCODE], DEC_ISAT)?;
        Ok(DataFrame::new(vec![
            string_column(OPLEIDINGSCODE, string_values(reference, OPLEIDINGSCODE)?),
            string_column(NAAM_OPLEIDING_CROHO, string_values(reference, NAAM_OPLEIDING)?),
        ])?)
    }
}

impl EnrichmentStep for NaamOpleidingStep {
    fn step_name(&self) -> &str {
        "naam_opleiding"
    }

    fn declared_columns(&self, _input: &DataFrame, _refs: &ReferenceTables) -> Vec<String> {
        vec![NAAM_OPLEIDING_CROHO.to_string()]
    }

    fn execute(&self, df: &DataFrame, refs: &ReferenceTables) -> Result<DataFrame> {
        let Some(reference) = refs.opleidingen.as_ref() else {
            tracing::warn!(
                table = DEC_ISAT,
                "Program names unavailable, filling with '{ONBEKEND}'"
            );
            let names = vec![Some(ONBEKEND.to_string()); df.height()];
            return with_columns(df, vec![string_column(NAAM_OPLEIDING_CROHO, names)]);
        };

        let lookup = Self::lookup(reference)?;
        let joined = LeftJoin::new(self.step_name(), &[OPLEIDING_ACTUEEL], &[OPLEIDINGSCODE])
            .drop_right_keys()
            .execute(df, &lookup)?;

        let names = string_values(&joined, NAAM_OPLEIDING_CROHO)?;
        let unresolved: Vec<usize> = names
            .iter()
            .enumerate()
            .filter_map(|(row, name)| name.is_none().then_some(row))
            .collect();
        if unresolved.is_empty() {
            return Ok(joined);
        }

        let codes = string_values(df, OPLEIDING_ACTUEEL)?;
        tracing::warn!(
            step = self.step_name(),
            rows = unresolved.len(),
            codes = %sample_codes(&codes, &unresolved),
            "Program codes without a name in {DEC_ISAT}, filling with '{ONBEKEND}'"
        );
        let filled = names
            .into_iter()
            .map(|name| Some(name.unwrap_or_else(|| ONBEKEND.to_string())))
            .collect();
        with_columns(&joined, vec![string_column(NAAM_OPLEIDING_CROHO, filled)])
    }
}

/// Canonical program code: the historical equivalent when present, the
/// current equivalent otherwise.
pub struct OpleidingStep;

impl EnrichmentStep for OpleidingStep {
    fn step_name(&self) -> &str {
        "opleiding"
    }

    fn declared_columns(&self, _input: &DataFrame, _refs: &ReferenceTables) -> Vec<String> {
        vec![OPLEIDING.to_string()]
    }

    fn execute(&self, df: &DataFrame, _refs: &ReferenceTables) -> Result<DataFrame> {
        let historisch = string_values(df, OPLEIDING_HISTORISCH)?;
        let actueel = string_values(df, OPLEIDING_ACTUEEL)?;
        let codes = historisch
            .into_iter()
            .zip(actueel)
            .map(|(h, a)| h.or(a))
            .collect();
        with_columns(df, vec![string_column(OPLEIDING, codes)])
    }
}

/// Croho sector of the current program.
pub struct CrohoOnderdeelStep;

impl EnrichmentStep for CrohoOnderdeelStep {
    fn step_name(&self) -> &str {
        "croho_onderdeel"
    }

    fn declared_columns(&self, _input: &DataFrame, _refs: &ReferenceTables) -> Vec<String> {
        vec![CROHO_ONDERDEEL.to_string()]
    }

    fn execute(&self, df: &DataFrame, _refs: &ReferenceTables) -> Result<DataFrame> {
        let sectors = int_values(df, CROHO_ONDERDEEL_ACTUEEL)?
            .into_iter()
            .map(|code| {
                let label = code
                    .and_then(CrohoSector::from_code)
                    .map_or(CrohoSector::UNKNOWN, |sector| sector.as_str());
                Some(label.to_string())
            })
            .collect();
        with_columns(df, vec![string_column(CROHO_ONDERDEEL, sectors)])
    }
}

/// Program phase label.
pub struct TypeOpleidingStep;

impl EnrichmentStep for TypeOpleidingStep {
    fn step_name(&self) -> &str {
        "type_opleiding"
    }

    fn declared_columns(&self, _input: &DataFrame, _refs: &ReferenceTables) -> Vec<String> {
        vec![TYPE_OPLEIDING.to_string()]
    }

    fn execute(&self, df: &DataFrame, _refs: &ReferenceTables) -> Result<DataFrame> {
        let types = string_values(df, OPLEIDINGSFASE)?
            .into_iter()
            .map(|code| {
                let label = code
                    .as_deref()
                    .and_then(ProgramType::from_code)
                    .map_or(ProgramType::UNKNOWN, |phase| phase.as_str());
                Some(label.to_string())
            })
            .collect();
        with_columns(df, vec![string_column(TYPE_OPLEIDING, types)])
    }
}

/// Institution-local program and faculty names.
///
/// The local table is keyed on `Opleidingscode` and joined on the current
/// program code. Codes without a local name stay empty.
pub struct LokaleNaamOpleidingStep;

impl LokaleNaamOpleidingStep {
    fn join(&self) -> LeftJoin<'static> {
        LeftJoin::new("lokale_naam_opleiding", &[OPLEIDING_ACTUEEL], &[OPLEIDINGSCODE])
            .drop_right_keys()
            .suffix("_naam")
    }
}

impl EnrichmentStep for LokaleNaamOpleidingStep {
    fn step_name(&self) -> &str {
        "lokale_naam_opleiding"
    }

    fn declared_columns(&self, input: &DataFrame, refs: &ReferenceTables) -> Vec<String> {
        refs.lokale_namen
            .as_ref()
            .map(|reference| {
                self.join()
                    .attached_names(input, reference)
                    .into_iter()
                    .map(|(_, target)| target)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn should_skip(&self, refs: &ReferenceTables) -> bool {
        refs.lokale_namen.is_none()
    }

    fn execute(&self, df: &DataFrame, refs: &ReferenceTables) -> Result<DataFrame> {
        let reference =
            refs.lokale_namen
                .as_ref()
                .ok_or_else(|| TransformError::MissingReference {
                    table: LOCAL_NAMES.to_string(),
                })?;
        ensure_unique(reference, &[OPLEIDINGSCODE], LOCAL_NAMES)?;

        let join = self.join();
        let names = join.attached_names(df, reference);
        let joined = join.execute(df, reference)?;

        if let Some(target) = attached_target(&names, CODE_OPLEIDING) {
            let local = string_values(&joined, &target)?;
            let missing: Vec<usize> = local
                .iter()
                .enumerate()
                .filter_map(|(row, code)| code.is_none().then_some(row))
                .collect();
            if !missing.is_empty() {
                let codes = string_values(df, OPLEIDING_ACTUEEL)?;
                tracing::info!(
                    step = self.step_name(),
                    rows = missing.len(),
                    codes = %sample_codes(&codes, &missing),
                    "Program codes without a local name"
                );
            }
        }
        Ok(joined)
    }
}

/// ISCED-F 2013 classification from `Dec_ho_ISCED`.
///
/// The classification is a complete reference: the table is mandatory and
/// every row must resolve to a rubric.
pub struct IscedStep;

impl IscedStep {
    fn join(&self) -> LeftJoin<'static> {
        LeftJoin::on("isced", &[OPLEIDINGSCODE]).suffix("_opleiding")
    }

    fn reference<'a>(&self, refs: &'a ReferenceTables) -> Result<&'a DataFrame> {
        refs.isced
            .as_ref()
            .ok_or_else(|| TransformError::MissingReference {
                table: DEC_HO_ISCED.to_string(),
            })
    }
}

impl EnrichmentStep for IscedStep {
    fn step_name(&self) -> &str {
        "isced"
    }

    fn declared_columns(&self, input: &DataFrame, refs: &ReferenceTables) -> Vec<String> {
        refs.isced
            .as_ref()
            .map(|reference| {
                self.join()
                    .attached_names(input, reference)
                    .into_iter()
                    .map(|(_, target)| target)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn execute(&self, df: &DataFrame, refs: &ReferenceTables) -> Result<DataFrame> {
        let reference = self.reference(refs)?;
        require_columns(reference, &[OPLEIDINGSCODE, ISCED_RUBRIEK])?;
        ensure_unique(reference, &[OPLEIDINGSCODE], DEC_HO_ISCED)?;

        let join = self.join();
        let names = join.attached_names(df, reference);
        if names.is_empty() {
            return Err(TransformError::NoColumnsAdded {
                step: self.step_name().to_string(),
            });
        }
        let joined = join.execute(df, reference)?;

        let rubric = attached_target(&names, ISCED_RUBRIEK).ok_or_else(|| {
            TransformError::NoColumnsAdded {
                step: self.step_name().to_string(),
            }
        })?;
        let unresolved: Vec<usize> = string_values(&joined, &rubric)?
            .iter()
            .enumerate()
            .filter_map(|(row, value)| value.is_none().then_some(row))
            .collect();
        if !unresolved.is_empty() {
            let codes = string_values(df, OPLEIDINGSCODE)?;
            return Err(TransformError::UnresolvedReference {
                step: self.step_name().to_string(),
                table: DEC_HO_ISCED.to_string(),
                rows: unresolved.len(),
                sample: sample_codes(&codes, &unresolved),
            });
        }
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, NamedFrom};

    fn students() -> DataFrame {
        DataFrame::new(vec![
            Column::new(OPLEIDINGSCODE.into(), vec!["34479", "39100"]),
            Column::new(
                OPLEIDING_ACTUEEL.into(),
                vec![Some("34479"), Some("39100")],
            ),
            Column::new(OPLEIDING_HISTORISCH.into(), vec![None, Some("30000")]),
            Column::new(CROHO_ONDERDEEL_ACTUEEL.into(), vec![Some(7i64), Some(42)]),
            Column::new(OPLEIDINGSFASE.into(), vec![Some("B"), None]),
        ])
        .unwrap()
    }

    #[test]
    fn canonical_code_prefers_historical() {
        let out = OpleidingStep
            .execute(&students(), &ReferenceTables::default())
            .unwrap();
        assert_eq!(
            string_values(&out, OPLEIDING).unwrap(),
            vec![Some("34479".to_string()), Some("30000".to_string())]
        );
    }

    #[test]
    fn unknown_sector_and_phase_become_onbekend() {
        let refs = ReferenceTables::default();
        let out = CrohoOnderdeelStep.execute(&students(), &refs).unwrap();
        assert_eq!(
            string_values(&out, CROHO_ONDERDEEL).unwrap(),
            vec![Some("recht".to_string()), Some("onbekend".to_string())]
        );
        let out = TypeOpleidingStep.execute(&students(), &refs).unwrap();
        assert_eq!(
            string_values(&out, TYPE_OPLEIDING).unwrap(),
            vec![Some("bachelor".to_string()), Some("onbekend".to_string())]
        );
    }

    #[test]
    fn unresolved_program_names_are_filled() {
        let refs = ReferenceTables {
            opleidingen: Some(
                DataFrame::new(vec![
                    Column::new(OPLEIDINGSCODE.into(), vec!["34479"]),
                    Column::new(NAAM_OPLEIDING.into(), vec!["B Rechtsgeleerdheid"]),
                ])
                .unwrap(),
            ),
            ..Default::default()
        };
        let out = NaamOpleidingStep.execute(&students(), &refs).unwrap();
        assert_eq!(
            string_values(&out, NAAM_OPLEIDING_CROHO).unwrap(),
            vec![
                Some("B Rechtsgeleerdheid".to_string()),
                Some(ONBEKEND.to_string())
            ]
        );
    }

    #[test]
    fn isced_requires_every_row_to_resolve() {
        let refs = ReferenceTables {
            isced: Some(
                DataFrame::new(vec![
                    Column::new(OPLEIDINGSCODE.into(), vec!["34479"]),
                    Column::new(ISCED_RUBRIEK.into(), vec!["0421"]),
                ])
                .unwrap(),
            ),
            ..Default::default()
        };
        let err = IscedStep.execute(&students(), &refs).unwrap_err();
        assert!(matches!(
            err,
            TransformError::UnresolvedReference { rows: 1, ref sample, .. } if sample == "39100"
        ));
    }

    #[test]
    fn isced_without_table_is_fatal() {
        let err = IscedStep
            .execute(&students(), &ReferenceTables::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::MissingReference { .. }));
    }
}
