//! # FCS Validation
//!
//! Integrity checks for FCS files, reported check by check instead of
//! stopping at the first problem the reader would raise.
//!
//! ## Checklist
//!
//! 1. **Structure**: header, version, segment offsets inside the file
//! 2. **Keywords**: TEXT parses, required keywords present, unique parameter
//!    names, a usable data layout and spillover matrix
//! 3. **Data**: DATA size matches `$TOT` × row width, values decode, are
//!    finite, and integer values stay within `$PnR`
//!
//! A failed step ends validation; later steps need its results.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fcsframe::validator::validate_fcs_file;
//! use std::path::Path;
//!
//! let report = validate_fcs_file(Path::new("sample.fcs"))?;
//! println!("{}", report);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::Path;

use anyhow::{Context, Result};

pub use report::{CheckStatus, Summary, ValidationCheck, ValidationReport};

mod data;
mod metadata;
mod report;
mod structure;

#[cfg(test)]
mod tests;

/// Validate a file on disk
pub fn validate_fcs_file(path: &Path) -> Result<ValidationReport> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(validate_fcs_bytes(path.display().to_string(), &bytes))
}

/// Validate a file held in memory
pub fn validate_fcs_bytes(name: impl Into<String>, bytes: &[u8]) -> ValidationReport {
    let mut report = ValidationReport::new(name);

    let Some(header) = structure::check_structure(bytes, &mut report) else {
        return report;
    };
    let Some((meta, layout)) = metadata::check_keywords(bytes, &header, &mut report) else {
        return report;
    };
    data::check_data(bytes, &meta, &layout, &mut report);

    report
}
