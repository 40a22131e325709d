use std::collections::HashSet;

use crate::compensation::{SpilloverMatrix, SPILLOVER_KEYWORDS};
use crate::fcs::{keywords, DataLayout, FcsHeader, FcsMetadata, FcsReader};

use super::ValidationReport;

/// Step 2: TEXT keywords and data layout
pub(crate) fn check_keywords(
    bytes: &[u8],
    header: &FcsHeader,
    report: &mut ValidationReport,
) -> Option<(FcsMetadata, DataLayout)> {
    let meta = match FcsReader::default().metadata(bytes) {
        Ok(meta) => meta,
        Err(e) => {
            report.fail("TEXT segment", e.to_string());
            return None;
        }
    };
    report.pass(format!("TEXT segment ({} keywords)", meta.keywords.len()));

    let mut missing: Vec<String> = [keywords::BYTEORD, keywords::DATATYPE, keywords::PAR]
        .into_iter()
        .filter(|k| meta.keyword(k).is_none())
        .map(str::to_string)
        .collect();
    let parameters = meta.parameter_count().unwrap_or(0);
    for n in 1..=parameters {
        for key in [keywords::bits(n), keywords::short_name(n)] {
            if meta.keyword(&key).is_none() {
                missing.push(key);
            }
        }
    }
    if missing.is_empty() {
        report.pass("Required keywords");
    } else {
        report.fail("Required keywords", format!("missing {}", missing.join(", ")));
        return None;
    }

    let mut absent: Vec<String> = [keywords::MODE, keywords::TOT]
        .into_iter()
        .filter(|k| meta.keyword(k).is_none())
        .map(str::to_string)
        .collect();
    absent.extend(
        (1..=parameters)
            .map(keywords::range)
            .filter(|k| meta.keyword(k).is_none()),
    );
    if absent.is_empty() {
        report.pass("Recommended keywords");
    } else {
        report.warn("Recommended keywords", format!("missing {}", absent.join(", ")));
    }

    check_parameter_names(&meta, parameters, report);

    let layout = match meta.layout() {
        Ok(layout) => layout,
        Err(e) => {
            report.fail("Data layout", e.to_string());
            return None;
        }
    };
    report.pass(format!(
        "Data layout ({}, {} parameters, {} bytes per event)",
        layout.data_type.as_str(),
        layout.bits.len(),
        layout.row_bytes()
    ));

    if header.data.is_none() && meta.data.is_none() && parameters > 0 {
        report.warn("DATA segment", "no DATA offsets in header or TEXT");
    }

    check_spillover(&meta, parameters, report);

    match meta.keyword(keywords::NEXTDATA) {
        Some(next) if next.parse::<u64>().map_or(true, |n| n != 0) => report.warn(
            "Single data set",
            format!("{} is {next}, only the first data set is read", keywords::NEXTDATA),
        ),
        _ => report.pass("Single data set"),
    }

    Some((meta, layout))
}

fn check_parameter_names(meta: &FcsMetadata, parameters: usize, report: &mut ValidationReport) {
    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = (1..=parameters)
        .filter_map(|n| meta.keyword(&keywords::short_name(n)))
        .filter(|name| !seen.insert(*name))
        .collect();
    if duplicates.is_empty() {
        report.pass("Unique parameter names");
    } else {
        report.fail(
            "Unique parameter names",
            format!("repeated {}", duplicates.join(", ")),
        );
    }
}

fn check_spillover(meta: &FcsMetadata, parameters: usize, report: &mut ValidationReport) {
    let declared = SPILLOVER_KEYWORDS
        .iter()
        .any(|k| meta.keywords.keys().any(|key| key.eq_ignore_ascii_case(k)));
    if !declared {
        return;
    }
    let spillover = match SpilloverMatrix::from_keywords(&meta.keywords) {
        Ok(s) => s,
        Err(e) => {
            report.warn("Spillover matrix", e.to_string());
            return;
        }
    };
    let names: HashSet<&str> = (1..=parameters)
        .filter_map(|n| meta.keyword(&keywords::short_name(n)))
        .collect();
    let unknown: Vec<&str> = spillover
        .parameter_names()
        .iter()
        .map(String::as_str)
        .filter(|name| !names.contains(name))
        .collect();
    if unknown.is_empty() {
        report.pass(format!("Spillover matrix ({0}x{0})", spillover.size()));
    } else {
        report.warn(
            "Spillover matrix",
            format!("names not among parameters: {}", unknown.join(", ")),
        );
    }
}
