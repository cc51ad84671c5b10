//! Tests for the enrichment pipeline.

use polars::prelude::{Column, DataFrame, NamedFrom};
use proptest::prelude::*;

use eencijfer_common::{int_values, string_values};
use eencijfer_model::PriorEducationRole;
use eencijfer_model::columns::{
    AANTAL, BRINNUMMER, CROHO_ONDERDEEL_ACTUEEL, DIPLOMA_FASE, DIPLOMAJAAR, EERSTE_JAAR_HO,
    EERSTE_JAAR_INSTELLING, HOOGSTE_VOOROPLEIDING, HOOGSTE_VOOROPLEIDING_VOOR_HO, IN_PA_COHORT,
    INDICATIE_ACTIEF, INSCHRIJVINGSJAAR, ISCED_RUBRIEK, NAAM_OPLEIDING, NAAM_OPLEIDING_CROHO,
    OMSCHRIJVING_VOOROPLEIDING, OPLEIDING_ACTUEEL, OPLEIDING_HISTORISCH, OPLEIDINGSCODE,
    OPLEIDINGSFASE, OPLEIDINGSVORM, PERSOONSGEBONDEN_NUMMER, SOORT_INSCHRIJVING_HO, TYPE_HO,
    VESTIGINGSNUMMER, VOOROPLEIDING_CODE,
};
use eencijfer_transform::{
    EnrichmentPipeline, EnrichmentStep, ReferenceTables, Result, TransformError,
    build_default_pipeline, check_contract, vooropleiding_kort,
};

const PROGRAMS: [&str; 3] = ["34479", "39100", "80001"];
const PRIOR: [&str; 3] = ["203", "401", "999"];

fn students(programs: &[&str], prior: &[&str]) -> DataFrame {
    let n = programs.len();
    DataFrame::new(vec![
        Column::new(PERSOONSGEBONDEN_NUMMER.into(), (1..=n as i64).collect::<Vec<_>>()),
        Column::new(INSCHRIJVINGSJAAR.into(), vec![2020i64; n]),
        Column::new(EERSTE_JAAR_INSTELLING.into(), vec![2020i64; n]),
        Column::new(EERSTE_JAAR_HO.into(), vec![2020i64; n]),
        Column::new(OPLEIDINGSCODE.into(), programs.to_vec()),
        Column::new(OPLEIDING_ACTUEEL.into(), programs.to_vec()),
        Column::new(OPLEIDING_HISTORISCH.into(), vec![None::<&str>; n]),
        Column::new(CROHO_ONDERDEEL_ACTUEEL.into(), vec![7i64; n]),
        Column::new(OPLEIDINGSFASE.into(), vec!["B"; n]),
        Column::new(DIPLOMA_FASE.into(), vec![None::<&str>; n]),
        Column::new(DIPLOMAJAAR.into(), vec![None::<i64>; n]),
        Column::new(INDICATIE_ACTIEF.into(), vec![1i64; n]),
        Column::new(SOORT_INSCHRIJVING_HO.into(), vec![1i64; n]),
        Column::new(TYPE_HO.into(), vec!["ba"; n]),
        Column::new(OPLEIDINGSVORM.into(), vec!["voltijd"; n]),
        Column::new(HOOGSTE_VOOROPLEIDING.into(), prior.to_vec()),
        Column::new(HOOGSTE_VOOROPLEIDING_VOOR_HO.into(), prior.to_vec()),
        Column::new(
            "InstellingVanDeHoogsteVooropleiding".into(),
            vec!["00AA"; n],
        ),
        Column::new(
            "VestigingsnummerVanDeHoogsteVooropleiding".into(),
            vec!["01"; n],
        ),
    ])
    .unwrap()
}

fn reference_tables() -> ReferenceTables {
    ReferenceTables {
        vooropleidingen: Some(
            DataFrame::new(vec![
                Column::new(VOOROPLEIDING_CODE.into(), vec!["203", "401"]),
                Column::new(
                    OMSCHRIJVING_VOOROPLEIDING.into(),
                    vec!["havo profiel economie & maatschappij", "vwo algemeen"],
                ),
            ])
            .unwrap(),
        ),
        instellingen: Some(
            DataFrame::new(vec![
                Column::new(BRINNUMMER.into(), vec!["00AA"]),
                Column::new(VESTIGINGSNUMMER.into(), vec!["01"]),
                Column::new("NaamInstellingVooropleiding".into(), vec!["Stedelijk Lyceum"]),
            ])
            .unwrap(),
        ),
        opleidingen: Some(
            DataFrame::new(vec![
                Column::new(OPLEIDINGSCODE.into(), vec!["34479", "39100"]),
                Column::new(NAAM_OPLEIDING.into(), vec!["B Rechtsgeleerdheid", "B Psychologie"]),
            ])
            .unwrap(),
        ),
        isced: Some(
            DataFrame::new(vec![
                Column::new(OPLEIDINGSCODE.into(), PROGRAMS.to_vec()),
                Column::new(ISCED_RUBRIEK.into(), vec!["0421", "0313", "0413"]),
            ])
            .unwrap(),
        ),
        ..Default::default()
    }
}

// ============================================================================
// Pipeline Structure Tests
// ============================================================================

#[test]
fn default_pipeline_has_standard_steps() {
    let pipeline = build_default_pipeline(PriorEducationRole::Hoogste);
    assert_eq!(
        pipeline.step_names(),
        vec![
            "aantal",
            "vooropleiding",
            "instelling_vooropleiding",
            "naam_opleiding",
            "opleiding",
            "croho_onderdeel",
            "soort_diploma",
            "ho_diploma_eerste_jaar",
            "type_opleiding",
            "lokale_naam_opleiding",
            "pa_cohort",
            "isced",
        ]
    );
}

#[test]
fn pipeline_can_remove_steps() {
    let pipeline = build_default_pipeline(PriorEducationRole::Hoogste).remove_step("isced");
    assert_eq!(pipeline.step_names().len(), 11);
    assert!(!pipeline.step_names().contains(&"isced"));
}

#[test]
fn short_codes_for_prior_education() {
    assert_eq!(vooropleiding_kort("HAVO - profiel EM"), "havo");
    assert_eq!(vooropleiding_kort("onbekende vooropleiding"), "overig");
}

// ============================================================================
// End-to-end Enrichment
// ============================================================================

#[test]
fn enriches_small_student_table() {
    let input = students(&["34479", "80001"], &["203", "999"]);
    let pipeline = build_default_pipeline(PriorEducationRole::Hoogste);
    let (out, reports) = pipeline.execute(input, &reference_tables()).unwrap();

    assert_eq!(out.height(), 2);
    assert_eq!(int_values(&out, AANTAL).unwrap(), vec![Some(1), Some(1)]);
    assert_eq!(
        string_values(&out, "HoogsteVooropleidingKort").unwrap(),
        vec![Some("havo".to_string()), None]
    );
    assert_eq!(
        string_values(&out, "HoogsteVooropleidingProfiel").unwrap(),
        vec![Some("EM".to_string()), None]
    );
    assert_eq!(
        string_values(&out, "NaamInstellingHoogsteVooropleiding").unwrap(),
        vec![
            Some("Stedelijk Lyceum".to_string()),
            Some("Stedelijk Lyceum".to_string())
        ]
    );
    assert_eq!(
        string_values(&out, NAAM_OPLEIDING_CROHO).unwrap(),
        vec![
            Some("B Rechtsgeleerdheid".to_string()),
            Some("onbekend".to_string())
        ]
    );
    assert_eq!(
        string_values(&out, IN_PA_COHORT).unwrap(),
        vec![Some("Ja".to_string()), Some("Nee".to_string())]
    );
    assert_eq!(
        string_values(&out, ISCED_RUBRIEK).unwrap(),
        vec![Some("0421".to_string()), Some("0413".to_string())]
    );

    let skipped: Vec<&str> = reports
        .iter()
        .filter(|report| report.skipped)
        .map(|report| report.step.as_str())
        .collect();
    assert_eq!(skipped, vec!["lokale_naam_opleiding"]);
}

#[test]
fn missing_optional_reference_skips_step() {
    let refs = ReferenceTables {
        vooropleidingen: None,
        instellingen: None,
        ..reference_tables()
    };
    let pipeline = build_default_pipeline(PriorEducationRole::Hoogste);
    let (out, reports) = pipeline
        .execute(students(&["34479"], &["203"]), &refs)
        .unwrap();

    assert!(out.column("HoogsteVooropleidingKort").is_err());
    assert!(reports[1].skipped);
    assert!(reports[2].skipped);
    assert!(!reports[3].skipped);
}

#[test]
fn unresolved_isced_is_fatal() {
    let refs = ReferenceTables {
        isced: Some(
            DataFrame::new(vec![
                Column::new(OPLEIDINGSCODE.into(), vec!["34479"]),
                Column::new(ISCED_RUBRIEK.into(), vec!["0421"]),
            ])
            .unwrap(),
        ),
        ..reference_tables()
    };
    let pipeline = build_default_pipeline(PriorEducationRole::Hoogste);
    let err = pipeline
        .execute(students(&["34479", "39100"], &["203", "203"]), &refs)
        .unwrap_err();
    assert!(matches!(err, TransformError::UnresolvedReference { rows: 1, .. }));
}

#[test]
fn duplicate_reference_key_is_fatal() {
    let refs = ReferenceTables {
        opleidingen: Some(
            DataFrame::new(vec![
                Column::new(OPLEIDINGSCODE.into(), vec!["34479", "34479"]),
                Column::new(NAAM_OPLEIDING.into(), vec!["B Rechten", "B Rechtsgeleerdheid"]),
            ])
            .unwrap(),
        ),
        ..reference_tables()
    };
    let pipeline = build_default_pipeline(PriorEducationRole::Hoogste);
    let err = pipeline
        .execute(students(&["34479"], &["203"]), &refs)
        .unwrap_err();
    assert!(matches!(err, TransformError::Frame(_)));
}

// ============================================================================
// Step Contract Tests
// ============================================================================

struct DropRows;

impl EnrichmentStep for DropRows {
    fn step_name(&self) -> &str {
        "drop_rows"
    }

    fn declared_columns(&self, _input: &DataFrame, _refs: &ReferenceTables) -> Vec<String> {
        Vec::new()
    }

    fn execute(&self, df: &DataFrame, _refs: &ReferenceTables) -> Result<DataFrame> {
        Ok(df.head(Some(1)))
    }
}

#[test]
fn row_count_change_is_fatal() {
    let pipeline = EnrichmentPipeline::new().add_step(Box::new(DropRows));
    let err = pipeline
        .execute(
            students(&["34479", "39100"], &["203", "401"]),
            &ReferenceTables::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        TransformError::RowCountMismatch { expected: 2, actual: 1, .. }
    ));
}

#[test]
fn undeclared_columns_are_rejected() {
    let input = students(&["34479"], &["203"]);
    let mut output = input.clone();
    output
        .with_column(Column::new("Extra".into(), vec![1i64]))
        .unwrap();
    let err = check_contract("extra", &input, &output, &[]).unwrap_err();
    assert!(matches!(err, TransformError::UndeclaredColumns { .. }));

    let added = check_contract("extra", &input, &output, &["Extra".to_string()]).unwrap();
    assert_eq!(added, vec!["Extra".to_string()]);
}

proptest! {
    #[test]
    fn enrichment_preserves_row_count(
        rows in prop::collection::vec((0usize..3, 0usize..3), 1..40)
    ) {
        let programs: Vec<&str> = rows.iter().map(|(p, _)| PROGRAMS[*p]).collect();
        let prior: Vec<&str> = rows.iter().map(|(_, v)| PRIOR[*v]).collect();
        let input = students(&programs, &prior);
        let pipeline = build_default_pipeline(PriorEducationRole::Hoogste);
        let (out, _) = pipeline.execute(input, &reference_tables()).unwrap();
        prop_assert_eq!(out.height(), rows.len());
    }
}
