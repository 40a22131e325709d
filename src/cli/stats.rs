use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use fcsframe::compensation::compensate_in_place;
use fcsframe::frame::Frame;
use fcsframe::stats::{evaluate_batch, StatSpec};

use super::config::Config;
use super::{load_frame, TableFormat};

/// One output row
#[derive(Debug, Serialize)]
struct StatRow {
    label: String,
    value: Option<f64>,
}

/// Apply configured gates to a file and print configured statistics
pub fn run(
    file: PathBuf,
    config: PathBuf,
    format: TableFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = Config::from_file(&config)?;
    let mut frame = load_frame(&file)?;

    if config.read.compensate.unwrap_or(false) && frame.compensation_id().is_none() {
        compensate_in_place(&mut frame)
            .with_context(|| format!("Failed to compensate {}", file.display()))?;
    }

    let subsets = config.subsets()?;
    for subset in &subsets {
        frame
            .add_subset(subset.clone())
            .with_context(|| format!("Failed to add gate {:?}", subset.label()))?;
    }
    let specs = config.specs(&subsets)?;
    info!(
        "Evaluating {} statistics over {} gates on {}",
        specs.len(),
        subsets.len(),
        frame.preferred_name()
    );

    let rows = compute(&specs, &frame);
    let rendered = match format {
        TableFormat::Tsv => render_tsv(&rows),
        TableFormat::Json => serde_json::to_string_pretty(&rows)? + "\n",
    };

    match output {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => std::io::stdout().write_all(rendered.as_bytes())?,
    }
    Ok(())
}

fn compute(specs: &[StatSpec], frame: &Frame) -> Vec<StatRow> {
    specs
        .iter()
        .zip(evaluate_batch(specs, frame))
        .map(|(spec, value)| StatRow {
            label: spec.label(frame),
            value,
        })
        .collect()
}

fn render_tsv(rows: &[StatRow]) -> String {
    let mut out = String::from("statistic\tvalue\n");
    for row in rows {
        let value = row
            .value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "NA".to_string());
        out.push_str(&format!("{}\t{}\n", row.label, value));
    }
    out
}
