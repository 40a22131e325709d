use crate::fcs::{keywords, DataLayout, DataType, FcsMetadata};

use super::structure::within;
use super::ValidationReport;

/// Step 3: DATA size and value sanity
pub(crate) fn check_data(
    bytes: &[u8],
    meta: &FcsMetadata,
    layout: &DataLayout,
    report: &mut ValidationReport,
) {
    let events = match meta.event_count(layout) {
        Ok(events) => events,
        Err(e) => {
            report.fail("Event count", e.to_string());
            return;
        }
    };
    if meta.keyword(keywords::TOT).is_some() {
        report.pass(format!("Event count ({events})"));
    } else {
        report.warn(
            "Event count",
            format!("{} missing, {events} events inferred from DATA size", keywords::TOT),
        );
    }

    let Some(segment) = meta.data else {
        if events == 0 {
            report.pass("DATA size (empty)");
        } else {
            report.fail("DATA size", format!("{events} events but no DATA segment"));
        }
        return;
    };
    if !within(segment, bytes.len() as u64) {
        report.fail(
            "DATA segment within file",
            format!(
                "segment {}..={} but file is {} bytes",
                segment.begin,
                segment.end,
                bytes.len()
            ),
        );
        return;
    }

    let expected = events.saturating_mul(layout.row_bytes());
    let declared = meta.data_len();
    if declared < expected {
        report.fail(
            "DATA size",
            format!("{events} events need {expected} bytes, segment holds {declared}"),
        );
        return;
    } else if declared > expected {
        report.warn(
            "DATA size",
            format!("{} bytes after the last event", declared - expected),
        );
    } else {
        report.pass("DATA size");
    }

    let start = usize::try_from(segment.begin).unwrap_or(usize::MAX);
    let columns = match layout.decode(bytes.get(start..).unwrap_or(&[]), events) {
        Ok(columns) => columns,
        Err(e) => {
            report.fail("Decode events", e.to_string());
            return;
        }
    };
    report.pass(format!(
        "Decode events ({} x {})",
        events,
        columns.len()
    ));

    let non_finite = columns
        .iter()
        .flatten()
        .filter(|v| !v.is_finite())
        .count();
    if non_finite == 0 {
        report.pass("Finite values");
    } else {
        report.warn("Finite values", format!("{non_finite} NaN or infinite values"));
    }

    if layout.data_type == DataType::Integer {
        let over: Vec<String> = columns
            .iter()
            .enumerate()
            .filter_map(|(i, column)| {
                let n = i + 1;
                let range: f64 = meta.keyword(&keywords::range(n))?.parse().ok()?;
                let count = column.iter().filter(|&&v| v >= range).count();
                (count > 0).then(|| format!("{} ({count})", keywords::range(n)))
            })
            .collect();
        if over.is_empty() {
            report.pass("Values within $PnR");
        } else {
            report.warn(
                "Values within $PnR",
                format!("values at or above range: {}", over.join(", ")),
            );
        }
    }
}
