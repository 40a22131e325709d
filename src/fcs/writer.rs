//! FCS 3.1 export.
//!
//! Frames are written as list-mode little-endian doubles. Structural
//! keywords (`$PAR`, `$TOT`, offsets, `$Pn*`) are regenerated from the frame;
//! every other keyword is carried over unchanged.

use std::io::Write;
use std::path::Path;

use log::{debug, warn};

use super::data::{encode_doubles, DataType, Endianness};
use super::header::{format_header, FcsVersion, Segment, HEADER_LEN};
use super::keywords;
use super::text::format_text;
use super::FcsError;
use crate::frame::{Dimension, Frame};

const STRUCTURAL: [&str; 12] = [
    keywords::PAR,
    keywords::TOT,
    keywords::DATATYPE,
    keywords::BYTEORD,
    keywords::MODE,
    keywords::BEGINDATA,
    keywords::ENDDATA,
    keywords::BEGINANALYSIS,
    keywords::ENDANALYSIS,
    keywords::BEGINSTEXT,
    keywords::ENDSTEXT,
    keywords::NEXTDATA,
];

/// Writes frames as FCS 3.1 files
#[derive(Debug, Clone)]
pub struct FcsWriter {
    delimiter: u8,
}

impl Default for FcsWriter {
    fn default() -> Self {
        Self { delimiter: b'/' }
    }
}

impl FcsWriter {
    /// Writer using `/` as TEXT delimiter
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another TEXT delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write `frame` to a file
    pub fn write_path<P: AsRef<Path>>(&self, frame: &Frame, path: P) -> Result<(), FcsError> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut out = std::io::BufWriter::new(file);
        self.write(frame, &mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Write `frame` to any sink
    pub fn write<W: Write>(&self, frame: &Frame, out: &mut W) -> Result<(), FcsError> {
        out.write_all(&self.to_bytes(frame))?;
        Ok(())
    }

    /// Render `frame` as a complete file
    pub fn to_bytes(&self, frame: &Frame) -> Vec<u8> {
        let events = frame.row_count();
        let columns: Vec<&[f64]> = frame.dimensions().iter().map(Dimension::values).collect();
        let data = encode_doubles(&columns, events);
        let pairs = self.keyword_pairs(frame);

        let text_begin = HEADER_LEN as u64;
        let mut data_segment = (0u64, 0u64);
        // offsets live inside TEXT, so iterate until their digits stop changing
        let (text, text_end) = loop {
            let mut all = pairs.clone();
            all.push((keywords::BEGINDATA.to_string(), data_segment.0.to_string()));
            all.push((keywords::ENDDATA.to_string(), data_segment.1.to_string()));
            let text = format_text(
                all.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                self.delimiter,
            );
            let text_end = text_begin + text.len() as u64 - 1;
            let next = if data.is_empty() {
                (0, 0)
            } else {
                (text_end + 1, text_end + data.len() as u64)
            };
            if next == data_segment {
                break (text, text_end);
            }
            data_segment = next;
        };

        let header = format_header(
            FcsVersion::Fcs3_1,
            Segment {
                begin: text_begin,
                end: text_end,
            },
            Segment::new(data_segment.0, data_segment.1),
            None,
        );
        debug!(
            "Writing {} events x {} parameters, TEXT {} bytes, DATA {} bytes",
            events,
            columns.len(),
            text.len(),
            data.len()
        );

        let mut bytes = Vec::with_capacity(header.len() + text.len() + data.len());
        bytes.extend_from_slice(&header);
        bytes.extend_from_slice(&text);
        bytes.extend_from_slice(&data);
        bytes
    }

    fn keyword_pairs(&self, frame: &Frame) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = vec![
            (keywords::MODE.to_string(), "L".to_string()),
            (keywords::DATATYPE.to_string(), DataType::Double.as_str().to_string()),
            (keywords::BYTEORD.to_string(), Endianness::Little.as_str().to_string()),
            (keywords::PAR.to_string(), frame.column_count().to_string()),
            (keywords::TOT.to_string(), frame.row_count().to_string()),
            (keywords::NEXTDATA.to_string(), "0".to_string()),
            (keywords::BEGINANALYSIS.to_string(), "0".to_string()),
            (keywords::ENDANALYSIS.to_string(), "0".to_string()),
            (keywords::BEGINSTEXT.to_string(), "0".to_string()),
            (keywords::ENDSTEXT.to_string(), "0".to_string()),
        ];

        for (i, dim) in frame.dimensions().iter().enumerate() {
            let n = i + 1;
            pairs.push((keywords::short_name(n), dim.short_name().to_string()));
            if let Some(stain) = dim.stain_name() {
                pairs.push((keywords::stain_name(n), stain.to_string()));
            }
            pairs.push((keywords::bits(n), "64".to_string()));
            let amp = dim.amplification_fields();
            pairs.push((
                keywords::amplification(n),
                format!("{},{}", amp.decades, amp.offset),
            ));
            pairs.push((keywords::range(n), format_range(dim)));
        }

        for (key, value) in frame.keywords() {
            let upper = key.to_ascii_uppercase();
            if STRUCTURAL.contains(&upper.as_str()) || is_parameter_keyword(&upper) {
                continue;
            }
            if value.is_empty() {
                warn!("Dropping keyword {} with empty value", key);
                continue;
            }
            pairs.push((upper, value.clone()));
        }
        pairs
    }
}

fn format_range(dim: &Dimension) -> String {
    let range = dim.range_hint().unwrap_or_else(|| {
        dim.values()
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(1.0, f64::max)
            .ceil()
    });
    format!("{range}")
}

/// True for `$Pn<suffix>` keys such as `$P12N`
fn is_parameter_keyword(key: &str) -> bool {
    let Some(rest) = key.strip_prefix("$P") else {
        return false;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && digits < rest.len() && rest[digits..].bytes().all(|b| b.is_ascii_alphabetic())
}
