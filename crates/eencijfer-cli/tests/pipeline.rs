//! Integration tests for the batch commands.

use std::fs;
use std::path::{Path, PathBuf};

use eencijfer_cli::config::Config;
use eencijfer_cli::pipeline::{convert, create_assets, init, list_tables, qa};
use eencijfer_common::string_values;
use eencijfer_ingest::read_table;
use eencijfer_model::ExportFormat;
use eencijfer_model::columns::{BURGERSERVICENUMMER, PERSOONSGEBONDEN_NUMMER};
use tempfile::TempDir;

const STUDENT_DEFINITION: &str = "Label,StartingPosition,NumberOfPositions,Converter\n\
PersoonsgebondenNummer,1,9,convert_to_int64\n\
Burgerservicenummer,10,9,convert_to_object\n\
Inschrijvingsjaar,19,4,convert_to_int64\n";

const EXAM_DEFINITION: &str = "Label,StartingPosition,NumberOfPositions,Converter\n\
PersoonsgebondenNummer,1,9,convert_to_int64\n\
VakCode,10,4,convert_to_vakcode\n";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn installation(root: &Path) -> Config {
    let config = Config {
        export_format: ExportFormat::Parquet,
        ..Config::rooted_at(root)
    };
    write(
        &config.import_definitions_dir,
        "EV_layout.csv",
        STUDENT_DEFINITION,
    );
    write(&config.import_definitions_dir, "VAKHAVO.csv", EXAM_DEFINITION);
    write(&config.import_definitions_dir, "Unused.csv", EXAM_DEFINITION);
    write(
        &config.source_dir,
        "EV299XX23.asc",
        "0000000011234567892020\n0000000029876543212021\n0000000011234567892021\n",
    );
    write(
        &config.source_dir,
        "VAKHAVO299XX23.asc",
        "0000000020030\n0000000010031\n",
    );
    write(&config.source_dir, "XYZ.asc", "whatever\n");
    config
}

#[test]
fn convert_decodes_and_pseudonymizes() {
    let root = TempDir::new().unwrap();
    let config = installation(root.path());

    let result = convert(&config, true).unwrap();
    assert!(result.column_converters);
    assert_eq!(result.files.len(), 3);
    assert!(!result.has_errors);
    assert!(result.errors.is_empty());
    assert!(result.files[2].status.is_skipped());
    assert_eq!(result.files[2].layout, None);
    assert_eq!(result.files[0].rows, 3);
    assert_eq!(result.files[0].layout.as_deref(), Some("EV_layout"));
    assert_eq!(result.protected.len(), 2);

    let students = read_table(&config.result_dir.join("EV299XX23.parquet")).unwrap();
    let exams = read_table(&config.result_dir.join("VAKHAVO299XX23.parquet")).unwrap();
    let student_ids = string_values(&students, PERSOONSGEBONDEN_NUMMER).unwrap();
    let exam_ids = string_values(&exams, PERSOONSGEBONDEN_NUMMER).unwrap();

    assert_eq!(student_ids[0], student_ids[2]);
    assert!(student_ids.iter().flatten().all(|id| id.len() == 7));
    assert_eq!(exam_ids[0], student_ids[1]);
    assert_eq!(exam_ids[1], student_ids[0]);
    assert_eq!(students.column(BURGERSERVICENUMMER).unwrap().null_count(), 3);
}

#[test]
fn convert_fails_a_file_that_does_not_fit_its_definition() {
    let root = TempDir::new().unwrap();
    let config = installation(root.path());
    write(
        &config.source_dir,
        "VAKHAVO299XX23.asc",
        "0000000020030\n000000001003099\n",
    );

    let result = convert(&config, true).unwrap();
    assert!(result.has_errors);
    assert_eq!(result.errors.len(), 1);
    assert!(result.files[1].status.is_failed());
    assert!(result.files[2].status.is_skipped());
    assert!(result.files[0].status.written_path().is_some());
}

#[test]
fn convert_can_keep_identifiers() {
    let root = TempDir::new().unwrap();
    let config = Config {
        remove_pii: false,
        ..installation(root.path())
    };

    let result = convert(&config, false).unwrap();
    assert!(!result.column_converters);
    assert!(result.protected.is_empty());
    let students = read_table(&config.result_dir.join("EV299XX23.parquet")).unwrap();
    assert_eq!(
        string_values(&students, PERSOONSGEBONDEN_NUMMER).unwrap()[0].as_deref(),
        Some("000000001")
    );
}

#[test]
fn qa_reports_matches_and_unused_definitions() {
    let root = TempDir::new().unwrap();
    let config = installation(root.path());

    let report = qa(&config).unwrap();
    let resolved: Vec<Option<String>> = report
        .matches
        .iter()
        .map(|m| {
            m.definition
                .as_ref()
                .and_then(|d| d.file_name())
                .map(|n| n.to_string_lossy().into_owned())
        })
        .collect();
    assert_eq!(
        resolved,
        vec![
            Some("EV_layout.csv".to_string()),
            Some("VAKHAVO.csv".to_string()),
            None
        ]
    );
    let widths: Vec<Option<usize>> = report.matches.iter().map(|m| m.record_width).collect();
    assert_eq!(widths, vec![Some(22), Some(13), None]);
    assert!(report.matches[0].unknown_converters.is_empty());
    assert_eq!(report.matches[1].unknown_converters, vec!["convert_to_vakcode"]);
    assert_eq!(report.unresolved().count(), 1);
    assert_eq!(report.unused.len(), 1);
    assert!(report.unused[0].ends_with("Unused.csv"));
}

#[test]
fn init_keeps_an_existing_configuration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let first = init(&path, false).unwrap();
    assert!(first.written);
    assert!(path.is_file());

    fs::write(&path, "remove_pii = false\n").unwrap();
    let second = init(&path, false).unwrap();
    assert!(!second.written);
    assert!(!Config::load(&path).unwrap().remove_pii);

    let forced = init(&path, true).unwrap();
    assert!(forced.written);
    assert!(Config::load(&path).unwrap().remove_pii);
}

#[test]
fn create_assets_needs_a_student_table() {
    let root = TempDir::new().unwrap();
    let config = Config::rooted_at(root.path());
    fs::create_dir_all(&config.result_dir).unwrap();
    assert!(create_assets(&config).is_err());
}

#[test]
fn list_tables_filters_on_format() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "b.csv", "x\n1\n");
    write(dir.path(), "a.csv", "x\n1\n");
    write(dir.path(), "c.parquet", "");
    let tables = list_tables(dir.path(), ExportFormat::Csv).unwrap();
    let names: Vec<&str> = tables
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(names, vec!["a.csv", "b.csv"]);
}
