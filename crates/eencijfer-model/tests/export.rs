//! Tests for export format parsing.

use eencijfer_model::ExportFormat;
use serde::Deserialize;

#[derive(Deserialize)]
struct Settings {
    export_format: ExportFormat,
}

#[test]
fn export_format_reads_from_toml() {
    let settings: Settings = toml::from_str("export_format = \"csv\"").expect("parse toml");
    assert_eq!(settings.export_format, ExportFormat::Csv);
}

#[test]
fn export_format_from_str_is_case_insensitive() {
    assert_eq!("Parquet".parse::<ExportFormat>(), Ok(ExportFormat::Parquet));
    assert!("xlsx".parse::<ExportFormat>().is_err());
}

#[test]
fn extension_matches_display() {
    for format in ExportFormat::ALL {
        assert_eq!(format.to_string(), format.extension());
    }
}
