use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use fcsframe::compensation::{Compensator, CompensationError};
use fcsframe::fcs::{read_batch, scan_directory, FcsReader};
use fcsframe::frame::Frame;
use fcsframe::persist;

use super::config::Config;

/// Extension of saved frames
const FRAME_EXTENSION: &str = "frame";

/// Parse FCS files (in parallel when built with `parallel`) and save each as a frame
pub fn run(
    inputs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    compensate: bool,
    threads: Option<usize>,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = match config {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    let compensate = compensate || config.read.compensate.unwrap_or(false);
    let threads = threads.or(config.read.threads);

    let files = collect_inputs(&inputs)?;
    if files.is_empty() {
        anyhow::bail!("No FCS files found in the given inputs");
    }
    if let Some(dir) = &output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    info!("fcsframe convert");
    info!("================");
    info!("Files: {}", files.len());
    info!("Compensate: {}", compensate);
    if let Some(n) = threads {
        info!("Threads: {}", n);
    }

    let start = Instant::now();
    let reader = FcsReader::default();
    let results = read_batch(&files, &reader, threads);

    let mut failed = 0usize;
    for (path, result) in files.iter().zip(results) {
        let outcome = result
            .with_context(|| format!("Failed to parse {}", path.display()))
            .and_then(|mut frame| {
                if compensate {
                    compensate_if_declared(&mut frame, path)?;
                }
                let target = output_path(path, output_dir.as_deref());
                persist::save_to_path(&frame, &target)
                    .with_context(|| format!("Failed to save {}", target.display()))?;
                Ok((frame, target))
            });
        match outcome {
            Ok((frame, target)) => println!(
                "{} -> {} ({} events x {} parameters)",
                path.display(),
                target.display(),
                frame.row_count(),
                frame.column_count()
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{:#}", e);
            }
        }
    }

    info!(
        "Converted {} of {} files in {:.2}s",
        files.len() - failed,
        files.len(),
        start.elapsed().as_secs_f64()
    );
    if failed > 0 {
        anyhow::bail!("{} of {} files failed", failed, files.len());
    }
    Ok(())
}

/// Expand directories into the FCS files they contain
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = scan_directory(input)
                .with_context(|| format!("Failed to scan {}", input.display()))?;
            info!("{}: {} FCS files", input.display(), found.len());
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            anyhow::bail!("Input does not exist: {}", input.display());
        }
    }
    Ok(files)
}

fn compensate_if_declared(frame: &mut Frame, path: &Path) -> Result<()> {
    match Compensator::for_frame(frame) {
        Ok(compensator) => compensator
            .compensate_in_place(frame)
            .with_context(|| format!("Failed to compensate {}", path.display())),
        Err(CompensationError::MissingSpillover) => {
            warn!("{} declares no spillover matrix, left uncompensated", path.display());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Bad spillover in {}", path.display())),
    }
}

fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let name = input.with_extension(FRAME_EXTENSION);
    match (output_dir, name.file_name()) {
        (Some(dir), Some(file_name)) => dir.join(file_name),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("plate/A1.fcs"), None),
            PathBuf::from("plate/A1.frame")
        );
        assert_eq!(
            output_path(Path::new("plate/A1.fcs"), Some(Path::new("out"))),
            PathBuf::from("out/A1.frame")
        );
    }
}
