use anyhow::Result;
use log::info;
use std::path::PathBuf;

/// Validate FCS file integrity
pub fn run(file: PathBuf, json: bool) -> Result<()> {
    use fcsframe::validator::validate_fcs_file;

    info!("FCS Validator");
    info!("=============");
    info!("File: {}", file.display());

    match validate_fcs_file(&file) {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.format_colored());
            }

            // Exit with error code if validation failed
            if report.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Validation error: {:#}", e);
            std::process::exit(1);
        }
    }
}
