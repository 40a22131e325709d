use crate::fcs::{FcsHeader, FcsVersion, Segment};

use super::ValidationReport;

/// Step 1: header and segment bounds
pub(crate) fn check_structure(bytes: &[u8], report: &mut ValidationReport) -> Option<FcsHeader> {
    let header = match FcsHeader::parse(bytes) {
        Ok(header) => header,
        Err(e) => {
            report.fail("Header", e.to_string());
            return None;
        }
    };
    report.pass("Header");

    match header.version {
        FcsVersion::Fcs2_0 => report.warn(
            format!("Version {}", header.version),
            "legacy revision, $PnE and $PnG may be interpreted differently",
        ),
        version => report.pass(format!("Version {version}")),
    }

    let len = bytes.len() as u64;
    if !within(header.text, len) {
        report.fail(
            "TEXT segment within file",
            format!(
                "segment {}..={} but file is {} bytes",
                header.text.begin, header.text.end, len
            ),
        );
        return None;
    }
    report.pass("TEXT segment within file");

    match header.data {
        Some(data) if !within(data, len) => {
            report.fail(
                "DATA segment within file",
                format!("segment {}..={} but file is {} bytes", data.begin, data.end, len),
            );
            return None;
        }
        Some(data) if overlaps(data, header.text) => {
            report.fail("DATA segment within file", "DATA overlaps TEXT");
            return None;
        }
        Some(_) => report.pass("DATA segment within file"),
        None => report.pass("DATA offsets deferred to TEXT"),
    }

    if let Some(analysis) = header.analysis {
        if within(analysis, len) {
            report.pass("ANALYSIS segment within file");
        } else {
            report.warn(
                "ANALYSIS segment within file",
                format!("segment {}..={} ignored", analysis.begin, analysis.end),
            );
        }
    }

    Some(header)
}

pub(super) fn within(segment: Segment, len: u64) -> bool {
    segment.end < len
}

pub(super) fn overlaps(a: Segment, b: Segment) -> bool {
    a.begin <= b.end && b.begin <= a.end
}
