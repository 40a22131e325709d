use std::collections::BTreeMap;

use super::*;
use crate::fcs::FcsWriter;
use crate::frame::{Dimension, Frame};

fn file_with(keywords: &[(&str, &str)], columns: &[(&str, Vec<f64>)]) -> Vec<u8> {
    let map: BTreeMap<String, String> = keywords
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let events = columns.first().map_or(0, |(_, v)| v.len());
    let mut frame = Frame::new(map, events);
    for (i, (name, values)) in columns.iter().enumerate() {
        frame
            .add_dimension(Dimension::new(i + 1, *name, values.clone()))
            .unwrap();
    }
    FcsWriter::new().to_bytes(&frame)
}

fn scatter() -> Vec<u8> {
    file_with(
        &[("$FIL", "a.fcs")],
        &[
            ("FSC-A", vec![10.0, 20.0, 30.0]),
            ("SSC-A", vec![1.0, 2.0, 3.0]),
        ],
    )
}

#[test]
fn test_validation_report_display() {
    let mut report = ValidationReport::new("test.fcs");
    report.pass("Test check 1");
    report.warn("Test check 2", "This is a warning");
    report.fail("Test check 3", "This failed");

    let output = format!("{}", report);
    assert!(output.contains("✓"));
    assert!(output.contains("⚠"));
    assert!(output.contains("✗"));
    assert!(output.contains("1 passed, 1 warnings, 1 failed"));
    assert!(report.has_failures());
}

#[test]
fn test_report_serializes_status_and_message() {
    let mut report = ValidationReport::new("x.fcs");
    report.warn("Finite values", "2 NaN or infinite values");
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["checks"][0]["status"], "warning");
    assert_eq!(json["checks"][0]["message"], "2 NaN or infinite values");
}

#[test]
fn test_written_file_is_clean() {
    let report = validate_fcs_bytes("a.fcs", &scatter());
    let summary = report.summary();
    assert_eq!(summary.failed, 0, "{report}");
    assert_eq!(summary.warnings, 0, "{report}");
    assert_eq!(report.status_of("DATA size"), Some(&CheckStatus::Ok));
}

#[test]
fn test_garbage_fails_at_header() {
    let report = validate_fcs_bytes("junk", b"not an fcs file at all");
    assert_eq!(report.checks.len(), 1);
    assert!(matches!(report.status_of("Header"), Some(CheckStatus::Failed(_))));
}

#[test]
fn test_truncated_file_fails() {
    let bytes = scatter();
    let report = validate_fcs_bytes("cut.fcs", &bytes[..bytes.len() - 8]);
    assert!(report.has_failures());
    assert!(matches!(
        report.status_of("DATA segment within file"),
        Some(CheckStatus::Failed(_))
    ));
}

#[test]
fn test_non_finite_values_warn() {
    let bytes = file_with(&[], &[("FL1-A", vec![1.0, f64::NAN, f64::INFINITY])]);
    let report = validate_fcs_bytes("nan.fcs", &bytes);
    assert!(!report.has_failures(), "{report}");
    assert_eq!(
        report.status_of("Finite values"),
        Some(&CheckStatus::Warning("2 NaN or infinite values".to_string()))
    );
}

#[test]
fn test_spillover_with_foreign_names_warns() {
    let bytes = file_with(
        &[("$SPILLOVER", "1,FL9-A,1")],
        &[("FL1-A", vec![1.0, 2.0])],
    );
    let report = validate_fcs_bytes("spill.fcs", &bytes);
    match report.status_of("Spillover matrix") {
        Some(CheckStatus::Warning(m)) => assert!(m.contains("FL9-A")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_validate_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(validate_fcs_file(&dir.path().join("absent.fcs")).is_err());
}

#[test]
fn test_validate_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.fcs");
    std::fs::write(&path, scatter()).unwrap();
    let report = validate_fcs_file(&path).unwrap();
    assert!(!report.has_failures());
    assert!(report.file.ends_with("a.fcs"));
}
