// tests/run_control.rs
mod common;
use crate::common::init_tracing;

use std::io::Write;

use proptest::prelude::*;
use tempfile::NamedTempFile;
use swell_core::errors::SwellError;
use swell_core::fs::RealFileSystem;
use swell_core::rc::{ProcessGrid, RunControlDocument};

#[test]
fn parses_colon_and_equals_entries() {
    let doc = RunControlDocument::parse(
        r#"
# AGCM resource file
NX: 4
NY = 6
DYCORE: FV3
MAPL_ENABLE_TIMERS: YES
"#,
    );

    assert_eq!(doc.get("NX"), Some("4"));
    assert_eq!(doc.get("NY"), Some("6"));
    assert_eq!(doc.get("DYCORE"), Some("FV3"));
    assert_eq!(doc.len(), 4);
    assert!(doc.get("#").is_none());
}

#[test]
fn later_duplicates_override_earlier_entries() {
    let doc = RunControlDocument::parse("NX: 2\nNX: 8\n");
    assert_eq!(doc.get("NX"), Some("8"));
}

#[test]
fn quoted_values_give_product_of_dimensions() {
    init_tracing();

    let doc = RunControlDocument::parse("NX: '4'\nNY: '6'\n");
    let grid = ProcessGrid::from_document(&doc).unwrap();

    assert_eq!((grid.nx(), grid.ny()), (4, 6));
    assert_eq!(grid, ProcessGrid::new(4, 6).unwrap());
    assert_eq!(grid.process_count(), 24);
}

#[test]
fn equals_style_with_quotes_is_accepted() {
    let doc = RunControlDocument::parse("NX='3'\nNY=\"5\"\n");
    let grid = ProcessGrid::from_document(&doc).unwrap();
    assert_eq!(grid.process_count(), 15);
}

#[test]
fn missing_dimension_is_config_error_naming_key() {
    let doc = RunControlDocument::parse("NX: 4\n");

    match ProcessGrid::from_document(&doc) {
        Err(SwellError::ConfigError(msg)) => assert!(msg.contains("'NY'"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn non_numeric_dimension_is_config_error() {
    let doc = RunControlDocument::parse("NX: four\nNY: 6\n");

    match ProcessGrid::from_document(&doc) {
        Err(SwellError::ConfigError(msg)) => {
            assert!(msg.contains("NX"), "{msg}");
            assert!(msg.contains("four"), "{msg}");
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn expressions_are_not_evaluated() {
    let doc = RunControlDocument::parse("NX: 2*2\nNY: 6\n");
    assert!(matches!(
        ProcessGrid::from_document(&doc),
        Err(SwellError::ConfigError(_))
    ));
}

#[test]
fn zero_dimension_is_rejected() {
    let doc = RunControlDocument::parse("NX: '0'\nNY: '6'\n");
    assert!(matches!(
        ProcessGrid::from_document(&doc),
        Err(SwellError::ConfigError(_))
    ));
}

#[test]
fn overflowing_product_is_rejected() {
    assert!(matches!(
        ProcessGrid::new(u32::MAX, 2),
        Err(SwellError::ConfigError(_))
    ));
}

#[test]
fn overflowing_product_from_document_is_rejected() {
    let doc = RunControlDocument::parse("NX: '65536'\nNY: '65536'\n");

    match ProcessGrid::from_document(&doc) {
        Err(SwellError::ConfigError(msg)) => assert!(msg.contains("overflows"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn direct_construction_validates_every_dimension() {
    assert!(matches!(
        ProcessGrid::new(0, 6),
        Err(SwellError::ConfigError(_))
    ));
    assert!(matches!(
        ProcessGrid::new(6, 0),
        Err(SwellError::ConfigError(_))
    ));

    let largest = ProcessGrid::new(65535, 65537).unwrap();
    assert_eq!(largest.process_count(), u32::MAX);
}

#[test]
fn load_reads_from_disk_and_records_source() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "NX: '2'\nNY: '3'\n").unwrap();

    let doc = RunControlDocument::load(&RealFileSystem, file.path()).unwrap();

    assert_eq!(doc.source(), Some(file.path()));
    assert_eq!(ProcessGrid::from_document(&doc).unwrap().process_count(), 6);
}

#[test]
fn load_of_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("AGCM.rc");

    match RunControlDocument::load(&RealFileSystem, &missing) {
        Err(SwellError::ConfigError(msg)) => assert!(msg.contains("AGCM.rc"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn process_count_is_product_of_quoted_or_bare_dimensions(
        nx in 1u32..=4096,
        ny in 1u32..=4096,
        quote_nx in prop_oneof![Just(""), Just("'"), Just("\"")],
        quote_ny in prop_oneof![Just(""), Just("'"), Just("\"")],
        sep in prop_oneof![Just(": "), Just(" = "), Just("=")],
    ) {
        let text = format!(
            "NX{sep}{q1}{nx}{q1}\nNY{sep}{q2}{ny}{q2}\n",
            q1 = quote_nx,
            q2 = quote_ny,
        );
        let doc = RunControlDocument::parse(&text);
        let grid = ProcessGrid::from_document(&doc).unwrap();
        prop_assert_eq!(grid.process_count(), nx * ny);
    }
}
