//! Integration tests for fixed-width decoding.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use eencijfer_ingest::{
    ConverterRegistry, FixedWidthDecoder, IngestError, LayoutCatalog, MAX_GARBAGE_SAMPLES,
};
use eencijfer_model::{GARBAGE_COLUMN, LayoutDefinition, LayoutField};
use polars::prelude::{AnyValue, DataType};
use proptest::prelude::*;
use tempfile::TempDir;

const DEFINITION: &str = "Label,StartingPosition,NumberOfPositions,Converter\n\
PersoonsgebondenNummer,1,9,convert_to_int64\n\
Geslacht,10,1,convert_geslacht\n\
Opleidingsvorm,11,1,convert_opleidingsvorm\n\
DatumTekeningDiploma,12,8,convert_to_date\n";

const RECORDS: &str = "000000001M120230901\n000000002V220230615\n000000003O3        \n";

fn write(dir: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

#[test]
fn three_records_with_date_field() {
    let defs = TempDir::new().expect("temp dir");
    let raw = TempDir::new().expect("temp dir");
    write(defs.path(), "EV_layout.csv", DEFINITION.as_bytes());
    let file = write(raw.path(), "EV299XX23.asc", RECORDS.as_bytes());

    let catalog = LayoutCatalog::open(defs.path()).expect("catalog");
    let layout = catalog.layout_for(&file).expect("layout");
    assert_eq!(layout.record_width(), 19);

    let registry = ConverterRegistry::standard();
    let df = FixedWidthDecoder::new(&registry, true)
        .decode_file(&file, &layout)
        .expect("decode");

    assert_eq!(df.height(), 3);
    assert!(df.column(GARBAGE_COLUMN).is_err());
    let dates = df.column("DatumTekeningDiploma").expect("date column");
    assert_eq!(dates.dtype(), &DataType::Date);
    let expected = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let days = i32::try_from((expected - epoch).num_days()).unwrap();
    assert_eq!(dates.get(0).unwrap(), AnyValue::Date(days));
    assert_eq!(dates.get(2).unwrap(), AnyValue::Null);

    let forms = df.column("Opleidingsvorm").expect("form");
    assert_eq!(forms.get(1).unwrap(), AnyValue::String("deeltijd"));
    assert_eq!(forms.get(2).unwrap(), AnyValue::String("duaal"));
}

#[test]
fn layout_two_bytes_too_narrow_is_rejected() {
    let layout = LayoutDefinition::new(
        "EV_narrow",
        vec![
            LayoutField::new("PersoonsgebondenNummer", 1, 9, ""),
            LayoutField::new("Geslacht", 10, 1, ""),
        ],
    );
    let registry = ConverterRegistry::standard();
    let err = FixedWidthDecoder::new(&registry, false)
        .decode_bytes(Path::new("EV.asc"), b"000000001M12\n000000002V12\n", &layout)
        .unwrap_err();

    match err {
        IngestError::GarbageColumn { rows, samples, .. } => {
            assert_eq!(rows, 2);
            assert_eq!(samples[0].line, 1);
            assert_eq!(samples[0].garbage, "12");
            assert_eq!(samples[0].leading, "000000001");
        }
        other => panic!("expected garbage error, got {other:?}"),
    }
}

#[test]
fn garbage_samples_are_capped() {
    let layout = LayoutDefinition::new("EV", vec![LayoutField::new("Code", 0, 2, "")]);
    let content = "AAxx\n".repeat(25);
    let registry = ConverterRegistry::standard();
    let err = FixedWidthDecoder::new(&registry, false)
        .decode_bytes(Path::new("EV.asc"), content.as_bytes(), &layout)
        .unwrap_err();
    let IngestError::GarbageColumn { rows, samples, .. } = err else {
        panic!("expected garbage error");
    };
    assert_eq!(rows, 25);
    assert_eq!(samples.len(), MAX_GARBAGE_SAMPLES);
}

#[test]
fn gap_in_layout_is_reported() {
    let layout = LayoutDefinition::new(
        "EV_gap",
        vec![
            LayoutField::new("A", 1, 2, ""),
            LayoutField::new("B", 5, 2, ""),
        ],
    );
    let registry = ConverterRegistry::standard();
    let err = FixedWidthDecoder::new(&registry, false)
        .decode_bytes(Path::new("EV.asc"), b"AA  BB\n", &layout)
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"definition EV_gap cannot be used: gap after field 'A': next field starts at 5, expected 3"
    );
}

fn field_value(width: usize) -> impl Strategy<Value = String> {
    proptest::string::string_regex(&format!("[A-Z0-9]{{1,{width}}}")).expect("regex")
}

proptest! {
    #[test]
    fn slicing_reproduces_field_values(
        widths in prop::collection::vec(1usize..8, 1..6),
        seed in prop::collection::vec(field_value(8), 6),
    ) {
        let mut fields = Vec::new();
        let mut record = String::new();
        let mut expected = Vec::new();
        let mut position = 1;
        for (idx, width) in widths.iter().enumerate() {
            let value: String = seed[idx].chars().take(*width).collect();
            record.push_str(&format!("{value:<width$}"));
            fields.push(LayoutField::new(format!("F{idx}"), position, *width, ""));
            expected.push(value);
            position += width;
        }
        record.push('\n');

        let layout = LayoutDefinition::new("EV_prop", fields);
        let registry = ConverterRegistry::standard();
        let df = FixedWidthDecoder::new(&registry, true)
            .decode_bytes(Path::new("EV.asc"), record.as_bytes(), &layout)
            .expect("decode");

        prop_assert_eq!(df.height(), 1);
        for (idx, value) in expected.iter().enumerate() {
            let got = df.column(&format!("F{idx}")).expect("column").get(0).expect("value");
            prop_assert_eq!(got, AnyValue::String(value.as_str()));
        }
    }
}
