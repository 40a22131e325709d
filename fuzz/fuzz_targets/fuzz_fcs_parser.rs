#![no_main]

use libfuzzer_sys::fuzz_target;

use fcsframe::fcs::{parse_text, FcsReader};
use fcsframe::validator::validate_fcs_bytes;

fuzz_target!(|data: &[u8]| {
    // Malformed input must come back as an error, never a panic
    let reader = FcsReader::default();
    if let Ok(frame) = reader.parse(data) {
        for dim in frame.dimensions() {
            let _ = dim.display_values();
        }
    }

    let _ = parse_text(data);
    let _ = validate_fcs_bytes("fuzz", data);
});
