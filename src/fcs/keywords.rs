//! Standard FCS keyword names.
//!
//! Keys are stored upper-cased, so every constant here is upper case.

/// Number of parameters
pub const PAR: &str = "$PAR";
/// Number of events
pub const TOT: &str = "$TOT";
/// Numeric encoding of the DATA segment
pub const DATATYPE: &str = "$DATATYPE";
/// Byte order of the DATA segment
pub const BYTEORD: &str = "$BYTEORD";
/// Acquisition mode
pub const MODE: &str = "$MODE";
/// Start of DATA when the header field cannot hold it
pub const BEGINDATA: &str = "$BEGINDATA";
/// End of DATA when the header field cannot hold it
pub const ENDDATA: &str = "$ENDDATA";
/// Start of ANALYSIS
pub const BEGINANALYSIS: &str = "$BEGINANALYSIS";
/// End of ANALYSIS
pub const ENDANALYSIS: &str = "$ENDANALYSIS";
/// Start of supplemental TEXT
pub const BEGINSTEXT: &str = "$BEGINSTEXT";
/// End of supplemental TEXT
pub const ENDSTEXT: &str = "$ENDSTEXT";
/// Next data set offset
pub const NEXTDATA: &str = "$NEXTDATA";
/// Original file name
pub const FIL: &str = "$FIL";

/// `$Pn<suffix>` for 1-based parameter `n`, e.g. `param(3, 'N')` is `$P3N`
pub fn param(n: usize, suffix: char) -> String {
    format!("$P{n}{suffix}")
}

/// Parameter short name
pub fn short_name(n: usize) -> String {
    param(n, 'N')
}

/// Parameter stain (long) name
pub fn stain_name(n: usize) -> String {
    param(n, 'S')
}

/// Bits per value
pub fn bits(n: usize) -> String {
    param(n, 'B')
}

/// Instrument range
pub fn range(n: usize) -> String {
    param(n, 'R')
}

/// Amplification
pub fn amplification(n: usize) -> String {
    param(n, 'E')
}
