//! The fixed-width FCS header.
//!
//! ```text
//! bytes  0..6    version, e.g. "FCS3.1"
//! bytes  6..10   spaces
//! bytes 10..18   TEXT begin      18..26  TEXT end
//! bytes 26..34   DATA begin      34..42  DATA end
//! bytes 42..50   ANALYSIS begin  50..58  ANALYSIS end
//! ```
//!
//! Offsets are right-justified ASCII decimals and inclusive. A field that is
//! blank or zero means "see the TEXT segment", which is how files larger than
//! 99,999,999 bytes declare their DATA segment.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use super::FcsError;

/// Bytes needed to parse every header field
pub const HEADER_LEN: usize = 58;

/// Bytes read by [`probe_path`]
pub const PROBE_LEN: usize = 256;

/// Largest offset an 8-digit header field can hold
pub const MAX_HEADER_OFFSET: u64 = 99_999_999;

/// FCS format revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum FcsVersion {
    /// FCS 2.0
    Fcs2_0,
    /// FCS 3.0
    Fcs3_0,
    /// FCS 3.1
    Fcs3_1,
    /// FCS 3.2
    Fcs3_2,
}

impl FcsVersion {
    /// Parse the six version bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"FCS2.0" => Some(Self::Fcs2_0),
            b"FCS3.0" => Some(Self::Fcs3_0),
            b"FCS3.1" => Some(Self::Fcs3_1),
            b"FCS3.2" => Some(Self::Fcs3_2),
            _ => None,
        }
    }

    /// Version string as written in the header
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fcs2_0 => "FCS2.0",
            Self::Fcs3_0 => "FCS3.0",
            Self::Fcs3_1 => "FCS3.1",
            Self::Fcs3_2 => "FCS3.2",
        }
    }
}

impl std::fmt::Display for FcsVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive byte range of one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// First byte
    pub begin: u64,
    /// Last byte
    pub end: u64,
}

impl Segment {
    /// Segment from inclusive offsets; `None` when both are zero or reversed
    pub fn new(begin: u64, end: u64) -> Option<Self> {
        if (begin == 0 && end == 0) || end < begin {
            None
        } else {
            Some(Self { begin, end })
        }
    }

    /// Number of bytes covered, saturating at `u64::MAX`
    pub fn byte_count(&self) -> u64 {
        self.end.saturating_sub(self.begin).saturating_add(1)
    }

    /// Borrow the segment from a whole-file buffer
    pub fn slice<'a>(&self, bytes: &'a [u8]) -> Option<&'a [u8]> {
        let begin = usize::try_from(self.begin).ok()?;
        let end = usize::try_from(self.end).ok()?;
        bytes.get(begin..=end)
    }
}

/// Parsed header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FcsHeader {
    /// Format revision
    pub version: FcsVersion,
    /// TEXT segment (always present)
    pub text: Segment,
    /// DATA segment, `None` when deferred to `$BEGINDATA`/`$ENDDATA`
    pub data: Option<Segment>,
    /// ANALYSIS segment, if any
    pub analysis: Option<Segment>,
}

impl FcsHeader {
    /// Parse the header from the start of a file
    pub fn parse(bytes: &[u8]) -> Result<Self, FcsError> {
        if bytes.len() < HEADER_LEN {
            return Err(FcsError::InvalidHeader(format!(
                "need {HEADER_LEN} bytes, found {}",
                bytes.len()
            )));
        }
        let version = FcsVersion::from_bytes(&bytes[0..6]).ok_or_else(|| {
            FcsError::InvalidHeader(format!(
                "unknown version {:?}",
                String::from_utf8_lossy(&bytes[0..6])
            ))
        })?;

        let text_begin = offset_field(bytes, 10)?;
        let text_end = offset_field(bytes, 18)?;
        let text = Segment::new(text_begin, text_end).ok_or_else(|| {
            FcsError::InvalidHeader(format!("empty TEXT segment {text_begin}..{text_end}"))
        })?;
        if text.begin < HEADER_LEN as u64 {
            return Err(FcsError::InvalidHeader(format!(
                "TEXT segment starts inside the header at {}",
                text.begin
            )));
        }

        let data = Segment::new(offset_field(bytes, 26)?, offset_field(bytes, 34)?);
        let analysis = Segment::new(offset_field(bytes, 42)?, offset_field(bytes, 50)?);

        Ok(Self {
            version,
            text,
            data,
            analysis,
        })
    }
}

/// One 8-byte offset field; blank means zero
fn offset_field(bytes: &[u8], start: usize) -> Result<u64, FcsError> {
    let raw = &bytes[start..start + 8];
    let text = std::str::from_utf8(raw)
        .map_err(|_| FcsError::InvalidHeader(format!("non-ASCII offset at byte {start}")))?
        .trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| FcsError::InvalidHeader(format!("bad offset {text:?} at byte {start}")))
}

/// Header-only validity check on an in-memory prefix
pub fn probe(bytes: &[u8]) -> bool {
    FcsHeader::parse(bytes).is_ok()
}

/// Header-only validity check reading at most [`PROBE_LEN`] bytes
pub fn probe_path<P: AsRef<Path>>(path: P) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut prefix = Vec::with_capacity(PROBE_LEN);
    if file.take(PROBE_LEN as u64).read_to_end(&mut prefix).is_err() {
        return false;
    }
    probe(&prefix)
}

/// Render the 58-byte header for the given segments
pub fn format_header(
    version: FcsVersion,
    text: Segment,
    data: Option<Segment>,
    analysis: Option<Segment>,
) -> Vec<u8> {
    let pair = |segment: Option<Segment>| match segment {
        Some(s) if s.end <= MAX_HEADER_OFFSET => format!("{:>8}{:>8}", s.begin, s.end),
        _ => format!("{:>8}{:>8}", 0, 0),
    };
    format!(
        "{}    {}{}{}",
        version.as_str(),
        pair(Some(text)),
        pair(data),
        pair(analysis)
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(version: &str, offsets: &[u64]) -> Vec<u8> {
        let mut text = format!("{version}    ");
        for offset in offsets {
            text.push_str(&format!("{offset:>8}"));
        }
        let mut bytes = text.into_bytes();
        bytes.resize(HEADER_LEN, b' ');
        bytes
    }

    #[test]
    fn test_parse_header() {
        let bytes = header("FCS3.1", &[58, 300, 301, 1000, 0, 0]);
        let parsed = FcsHeader::parse(&bytes).unwrap();
        assert_eq!(parsed.version, FcsVersion::Fcs3_1);
        assert_eq!(parsed.text, Segment { begin: 58, end: 300 });
        assert_eq!(parsed.data, Some(Segment { begin: 301, end: 1000 }));
        assert_eq!(parsed.analysis, None);
        assert_eq!(parsed.data.unwrap().byte_count(), 700);
    }

    #[test]
    fn test_byte_count_saturates() {
        let whole = Segment::new(0, u64::MAX).unwrap();
        assert_eq!(whole.byte_count(), u64::MAX);
        assert_eq!(Segment::new(10, 10).unwrap().byte_count(), 1);
    }

    #[test]
    fn test_zero_data_offsets_defer_to_text() {
        let parsed = FcsHeader::parse(&header("FCS3.0", &[58, 300])).unwrap();
        assert_eq!(parsed.version, FcsVersion::Fcs3_0);
        assert_eq!(parsed.data, None);
    }

    #[test]
    fn test_rejects_bad_headers() {
        assert!(matches!(
            FcsHeader::parse(b"FCS3.1"),
            Err(FcsError::InvalidHeader(_))
        ));
        assert!(matches!(
            FcsHeader::parse(&header("XYZ3.1", &[58, 300])),
            Err(FcsError::InvalidHeader(_))
        ));
        let mut garbled = header("FCS3.1", &[58, 300]);
        garbled[17] = b'x';
        assert!(matches!(
            FcsHeader::parse(&garbled),
            Err(FcsError::InvalidHeader(_))
        ));
        assert!(matches!(
            FcsHeader::parse(&header("FCS3.1", &[20, 300])),
            Err(FcsError::InvalidHeader(_))
        ));
        assert!(!probe(b"not an fcs file"));
    }

    #[test]
    fn test_format_header_round_trip() {
        let text = Segment { begin: 58, end: 511 };
        let data = Segment::new(512, 150_000_000);
        let bytes = format_header(FcsVersion::Fcs3_1, text, data, None);
        assert_eq!(bytes.len(), HEADER_LEN);
        let parsed = FcsHeader::parse(&bytes).unwrap();
        assert_eq!(parsed.text, text);
        // too wide for the header, deferred to $BEGINDATA/$ENDDATA
        assert_eq!(parsed.data, None);
    }
}
