//! Integration tests for fcsframe
//!
//! These tests run the full pipeline: FCS bytes on disk, parsing,
//! compensation, gating, statistics, export and persistence.

mod common;

use std::fs;

use common::{doubles_le, scatter_file, FcsBuilder};
use fcsframe::prelude::*;
use fcsframe::transform::TransformKind;
use tempfile::tempdir;

const FSC: [f64; 6] = [100.0, 200.0, 300.0, 400.0, 500.0, 600.0];
const SSC: [f64; 6] = [50.0, 60.0, 70.0, 80.0, 90.0, 5000.0];
const TRUE_FL1: [f64; 6] = [10.0, 2000.0, 3000.0, 15.0, 4000.0, 5000.0];
const TRUE_FL2: [f64; 6] = [500.0, 20.0, 30.0, 600.0, 40.0, 50.0];

/// Four-colour double file whose FL channels carry 10% / 5% crosstalk
fn panel_file() -> Vec<u8> {
    // observed = true · S with S = [[1, 0.1], [0.05, 1]]
    let fl1: Vec<f64> = TRUE_FL1
        .iter()
        .zip(TRUE_FL2)
        .map(|(t1, t2)| t1 + 0.05 * t2)
        .collect();
    let fl2: Vec<f64> = TRUE_FL1
        .iter()
        .zip(TRUE_FL2)
        .map(|(t1, t2)| 0.1 * t1 + t2)
        .collect();

    FcsBuilder::new("FCS3.1")
        .keyword("$PAR", "4")
        .keyword("$TOT", "6")
        .keyword("$DATATYPE", "D")
        .keyword("$BYTEORD", "1,2,3,4,5,6,7,8")
        .keyword("$MODE", "L")
        .keyword("$FIL", "panel.fcs")
        .keyword("$CYT", "Bench | Analyzer")
        .keyword("$SPILLOVER", "2,FL1-A,FL2-A,1,0.1,0.05,1")
        .parameter(1, "FSC-A", None, 64, 262144)
        .parameter(2, "SSC-A", None, 64, 262144)
        .parameter(3, "FL1-A", Some("CD3 FITC"), 64, 262144)
        .parameter(4, "FL2-A", Some("CD4 PE"), 64, 262144)
        .data(doubles_le(&[&FSC, &SSC, &fl1, &fl2]))
        .build()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{a} != {e}");
    }
}

#[test]
fn test_parse_compensate_gate_and_summarise() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("panel.fcs");
    fs::write(&path, panel_file()).unwrap();

    let mut frame = FcsReader::default().read_path(&path).unwrap();
    assert_eq!(frame.row_count(), 6);
    assert_eq!(frame.dimension_names(), ["FSC-A", "SSC-A", "FL1-A", "FL2-A"]);
    assert_eq!(frame.keyword("$cyt"), Some("Bench | Analyzer"));
    assert_eq!(frame.preferred_name(), "panel.fcs");

    let fsc = frame.dimension("FSC-A").unwrap();
    assert_eq!(fsc.preferred_transform().unwrap().kind(), TransformKind::Bounded);
    let fl1 = frame.find_dimension("cd3-fitc").unwrap();
    assert_eq!(fl1.short_name(), "FL1-A");
    assert_eq!(fl1.preferred_transform().unwrap().kind(), TransformKind::Logicle);

    let fl1_id = fl1.id();
    compensate_in_place(&mut frame).unwrap();
    let fl1 = frame.dimension("FL1-A").unwrap();
    assert_eq!(fl1.id(), fl1_id);
    assert!(fl1.compensation_id().is_some());
    assert_close(fl1.values(), &TRUE_FL1);
    assert_close(frame.dimension("FL2-A").unwrap().values(), &TRUE_FL2);
    assert_eq!(frame.dimension("FSC-A").unwrap().values(), &FSC);

    let cells = Subset::new(
        "Cells",
        "FSC-A",
        "SSC-A",
        Geometry::rectangle(0.0, 0.0, 1000.0, 1000.0).unwrap(),
    );
    let cd3 = Subset::new(
        "CD3+",
        "FL1-A",
        "FL2-A",
        Geometry::rectangle(1000.0, -100.0, 10_000.0, 1000.0).unwrap(),
    )
    .with_parent(Some(cells.id()));
    let (cells_id, cd3_id) = (cells.id(), cd3.id());
    frame.add_subset(cells).unwrap();
    frame.add_subset(cd3).unwrap();

    let mask = effective_mask(&frame, cd3_id).unwrap();
    assert_eq!(mask.iter_ones().collect::<Vec<_>>(), [1, 2, 4]);

    let specs = [
        StatSpec::new(Statistic::Count).subset(cells_id),
        StatSpec::new(Statistic::Frequency {
            child: cd3_id,
            parent: cells_id,
        }),
        StatSpec::new(Statistic::Median).dimension("FL1-A").subset(cd3_id),
        StatSpec::new(Statistic::Mean).dimension("APC-A"),
    ];
    let values = evaluate_batch(&specs, &frame);
    assert_eq!(values[0], Some(5.0));
    assert_eq!(values[1], Some(0.6));
    assert!((values[2].unwrap() - 3000.0).abs() < 1e-9);
    assert_eq!(values[3], None);

    assert_eq!(specs[0].label(&frame), "Count: Cells");
    assert_eq!(specs[1].label(&frame), "CD3+ Frequency of Parent");
    assert_eq!(specs[2].label(&frame), "CD3+ - MEDIAN: FL1-A");
}

#[test]
fn test_writer_output_reads_back() {
    let source = fcsframe::fcs::parse(&panel_file()).unwrap();
    let compensated = compensate(&source).unwrap();
    assert_ne!(compensated.id(), source.id());

    let dir = tempdir().unwrap();
    let path = dir.path().join("out.fcs");
    FcsWriter::new().write_path(&compensated, &path).unwrap();

    let reread = fcsframe::fcs::read_path(&path).unwrap();
    assert_eq!(reread.row_count(), 6);
    assert_eq!(reread.dimension_names(), compensated.dimension_names());
    assert_eq!(reread.keyword("$FIL"), Some("panel.fcs"));
    assert_eq!(reread.keyword("$CYT"), Some("Bench | Analyzer"));
    assert_eq!(
        reread.dimension("FL2-A").unwrap().stain_name(),
        Some("CD4 PE")
    );
    for dim in compensated.dimensions() {
        assert_eq!(
            reread.dimension(dim.short_name()).unwrap().values(),
            dim.values()
        );
    }

    let report = validate_fcs_file(&path).unwrap();
    assert!(!report.has_failures(), "{report}");
}

#[test]
fn test_saved_frame_survives_reload() {
    let mut frame = fcsframe::fcs::parse(&panel_file()).unwrap();
    compensate_in_place(&mut frame).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("panel.frame");
    fcsframe::persist::save_to_path(&frame, &path).unwrap();
    let restored = fcsframe::persist::load_from_path(&path).unwrap();

    assert_eq!(restored.id(), frame.id());
    assert_eq!(restored.compensation_id(), frame.compensation_id());
    for (a, b) in frame.dimensions().iter().zip(restored.dimensions()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.values(), b.values());
        assert_eq!(a.preferred_transform(), b.preferred_transform());
    }

    // undoing compensation restores the recorded signal
    let original = fcsframe::fcs::parse(&panel_file()).unwrap();
    let undone = Compensator::for_frame(&restored)
        .unwrap()
        .decompensate(&restored)
        .unwrap();
    assert_close(
        undone.dimension("FL1-A").unwrap().values(),
        original.dimension("FL1-A").unwrap().values(),
    );
    assert!(undone.compensation_id().is_none());
}

#[test]
fn test_scan_directory_and_batch_read() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.fcs"), scatter_file("b.fcs", 4)).unwrap();
    fs::write(dir.path().join("a.fcs"), scatter_file("a.fcs", 7)).unwrap();
    fs::write(dir.path().join("notes.txt"), "not cytometry").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();

    let mut broken = scatter_file("c.fcs", 5);
    broken.truncate(broken.len() - 4);
    fs::write(dir.path().join("c.fcs"), broken).unwrap();

    let files = scan_directory(dir.path()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.fcs", "b.fcs", "c.fcs"]);

    let results = read_batch(&files, &FcsReader::default(), Some(2));
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().row_count(), 7);
    assert_eq!(results[1].as_ref().unwrap().row_count(), 4);
    assert!(matches!(results[2], Err(FcsError::TruncatedData { .. })));
}

#[test]
fn test_reader_config_controls_transforms() {
    let reader = FcsReader::new(ReaderConfig {
        assign_default_transforms: false,
        ..ReaderConfig::default()
    });
    let frame = reader.parse(&panel_file()).unwrap();
    assert!(frame
        .dimensions()
        .iter()
        .all(|d| d.preferred_transform().is_none()));
}
