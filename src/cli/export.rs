use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::PathBuf;

use fcsframe::compensation::compensate_in_place;
use fcsframe::frame::Frame;

use super::load_frame;

/// Export events as CSV, one column per dimension
pub fn run(file: PathBuf, output: Option<PathBuf>, display: bool, compensate: bool) -> Result<()> {
    let mut frame = load_frame(&file)?;
    if compensate && frame.compensation_id().is_none() {
        compensate_in_place(&mut frame)
            .with_context(|| format!("Failed to compensate {}", file.display()))?;
    }

    match output {
        Some(path) => {
            let out = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(&frame, display, out)?;
            info!("Wrote {} events to {}", frame.row_count(), path.display());
        }
        None => write_csv(&frame, display, std::io::stdout().lock())?,
    }
    Ok(())
}

fn write_csv<W: Write>(frame: &Frame, display: bool, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(frame.dimensions().iter().map(|d| d.display_name()))?;

    let columns: Vec<Vec<f64>> = frame
        .dimensions()
        .iter()
        .map(|d| {
            if display {
                d.display_values()
            } else {
                d.values().to_vec()
            }
        })
        .collect();
    let mut record = Vec::with_capacity(columns.len());
    for event in 0..frame.row_count() {
        record.clear();
        record.extend(columns.iter().map(|c| c[event].to_string()));
        writer.write_record(&record)?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcsframe::frame::Dimension;
    use fcsframe::transform::Transform;
    use std::collections::BTreeMap;

    #[test]
    fn test_csv_raw_and_display() {
        let mut frame = Frame::new(BTreeMap::new(), 2);
        frame
            .add_dimension(
                Dimension::new(1, "FSC-A", vec![-5.0, 50.0])
                    .transform(Some(Transform::bounded(0.0, 10.0).unwrap())),
            )
            .unwrap();
        frame
            .add_dimension(Dimension::new(2, "FL1-A", vec![1.5, 2.5]).stain("CD3"))
            .unwrap();

        let mut raw = Vec::new();
        write_csv(&frame, false, &mut raw).unwrap();
        assert_eq!(
            String::from_utf8(raw).unwrap(),
            "FSC-A,FL1-A (CD3)\n-5,1.5\n50,2.5\n"
        );

        let mut shown = Vec::new();
        write_csv(&frame, true, &mut shown).unwrap();
        assert_eq!(
            String::from_utf8(shown).unwrap(),
            "FSC-A,FL1-A (CD3)\n0,1.5\n10,2.5\n"
        );
    }
}
