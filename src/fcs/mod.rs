//! # FCS Reader
//!
//! Turns the bytes of a Flow Cytometry Standard file into a [`Frame`].
//!
//! ## Reading pipeline
//!
//! 1. [`FcsHeader`]: version and segment offsets
//! 2. TEXT segment: delimited keyword/value pairs, optionally merged with the
//!    supplemental TEXT segment
//! 3. DATA location: header offsets, or `$BEGINDATA`/`$ENDDATA` when the
//!    header fields are zero (files past 99,999,999 bytes)
//! 4. [`DataLayout`] from `$DATATYPE`, `$BYTEORD` and `$PnB`
//! 5. One [`Dimension`] per parameter, in parameter order
//!
//! ## Example
//!
//! ```rust,no_run
//! use fcsframe::fcs::FcsReader;
//!
//! let frame = FcsReader::default().read_path("sample.fcs")?;
//! println!("{} events x {} parameters", frame.row_count(), frame.column_count());
//! # Ok::<(), fcsframe::fcs::FcsError>(())
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info, warn};

use crate::frame::{default_transform, Amplification, Dimension, Frame};
use crate::transform::LogicleParams;

mod batch;
mod data;
mod error;
mod header;
pub mod keywords;
mod text;
mod writer;


pub use batch::{read_batch, scan_directory};
pub use data::{encode_doubles, DataLayout, DataType, Endianness};
pub use error::FcsError;
pub use header::{
    format_header, probe, probe_path, FcsHeader, FcsVersion, Segment, HEADER_LEN,
    MAX_HEADER_OFFSET, PROBE_LEN,
};
pub use text::{format_text, parse_text};
pub use writer::FcsWriter;

/// Configuration for reading FCS files
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Give each dimension a display transform chosen from its name and
    /// amplification
    pub assign_default_transforms: bool,
    /// Merge keywords from the supplemental TEXT segment
    pub merge_supplemental_text: bool,
    /// Logicle parameters used for fluorescence channels (T is replaced by
    /// the channel range when known)
    pub default_logicle: LogicleParams,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            assign_default_transforms: true,
            merge_supplemental_text: true,
            default_logicle: LogicleParams::default(),
        }
    }
}

/// Header and keywords of a file, without its event data
#[derive(Debug, Clone)]
pub struct FcsMetadata {
    /// Parsed header
    pub header: FcsHeader,
    /// Upper-cased keywords from TEXT (and supplemental TEXT)
    pub keywords: BTreeMap<String, String>,
    /// Resolved DATA segment; `None` when the file declares no data
    pub data: Option<Segment>,
}

impl FcsMetadata {
    /// Keyword value, trimmed
    pub fn keyword(&self, key: &str) -> Option<&str> {
        self.keywords.get(key).map(|v| v.trim())
    }

    /// Required keyword value, trimmed
    pub fn require(&self, key: &str) -> Result<&str, FcsError> {
        self.keyword(key)
            .ok_or_else(|| FcsError::MissingKeyword(key.to_string()))
    }

    /// Required non-negative integer keyword
    pub fn require_count(&self, key: &str) -> Result<usize, FcsError> {
        let value = self.require(key)?;
        value.parse().map_err(|_| FcsError::InvalidKeyword {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Number of parameters (`$PAR`)
    pub fn parameter_count(&self) -> Result<usize, FcsError> {
        self.require_count(keywords::PAR)
    }

    /// Data layout from `$DATATYPE`, `$BYTEORD` and `$PnB`
    pub fn layout(&self) -> Result<DataLayout, FcsError> {
        if let Some(mode) = self.keyword(keywords::MODE) {
            if !mode.eq_ignore_ascii_case("L") {
                return Err(FcsError::UnsupportedMode(mode.to_string()));
            }
        }
        let data_type = DataType::parse(self.require(keywords::DATATYPE)?)?;
        let endianness = Endianness::parse(self.require(keywords::BYTEORD)?)?;
        let bits = (1..=self.parameter_count()?)
            .map(|n| {
                let key = keywords::bits(n);
                let value = self.require(&key)?;
                value.parse::<u32>().map_err(|_| {
                    FcsError::InconsistentLayout(format!("{key} is {value:?}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        DataLayout::new(data_type, endianness, bits)
    }

    /// Declared DATA segment length in bytes
    pub fn data_len(&self) -> usize {
        self.data
            .map_or(0, |d| usize::try_from(d.byte_count()).unwrap_or(usize::MAX))
    }

    /// Number of events (`$TOT`), inferred from the DATA size when absent
    pub fn event_count(&self, layout: &DataLayout) -> Result<usize, FcsError> {
        if self.keyword(keywords::TOT).is_some() {
            return self.require_count(keywords::TOT);
        }
        let row = layout.row_bytes();
        if row == 0 {
            return Err(FcsError::MissingKeyword(keywords::TOT.to_string()));
        }
        let inferred = self.data_len() / row;
        warn!("{} missing, inferred {} events from DATA size", keywords::TOT, inferred);
        Ok(inferred)
    }
}

/// Parses FCS bytes into frames
#[derive(Debug, Clone, Default)]
pub struct FcsReader {
    config: ReaderConfig,
}

impl FcsReader {
    /// Reader with custom configuration
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read and parse a file
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Frame, FcsError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        self.parse(&bytes)
    }

    /// Parse header and keywords only
    pub fn metadata(&self, bytes: &[u8]) -> Result<FcsMetadata, FcsError> {
        let header = FcsHeader::parse(bytes)?;
        debug!(
            "{} header: TEXT {:?}, DATA {:?}",
            header.version, header.text, header.data
        );

        let text = header.text.slice(bytes).ok_or_else(|| {
            FcsError::InvalidHeader(format!(
                "TEXT segment {}..={} lies past end of file ({} bytes)",
                header.text.begin,
                header.text.end,
                bytes.len()
            ))
        })?;
        let mut found = parse_text(text)?;

        if self.config.merge_supplemental_text {
            merge_supplemental(bytes, &header, &mut found);
        }

        let data = match header.data {
            Some(segment) => Some(segment),
            None => {
                let begin = offset_keyword(&found, keywords::BEGINDATA)?;
                let end = offset_keyword(&found, keywords::ENDDATA)?;
                info!(
                    "DATA offsets taken from {}/{}: {}..={}",
                    keywords::BEGINDATA,
                    keywords::ENDDATA,
                    begin,
                    end
                );
                let segment = Segment::new(begin, end);
                if segment.is_none() && (begin, end) != (0, 0) {
                    return Err(FcsError::InvalidKeyword {
                        key: keywords::ENDDATA.to_string(),
                        value: end.to_string(),
                    });
                }
                // DATA must follow the header and TEXT
                if segment.is_some() && begin <= header.text.end {
                    return Err(FcsError::InvalidKeyword {
                        key: keywords::BEGINDATA.to_string(),
                        value: begin.to_string(),
                    });
                }
                segment
            }
        };

        Ok(FcsMetadata {
            header,
            keywords: found,
            data,
        })
    }

    /// Parse a complete file held in memory
    pub fn parse(&self, bytes: &[u8]) -> Result<Frame, FcsError> {
        let meta = self.metadata(bytes)?;
        let layout = meta.layout()?;
        let events = meta.event_count(&layout)?;
        let parameters = layout.bits.len();

        let expected = events.saturating_mul(layout.row_bytes());
        let declared = meta.data_len();
        if declared < expected {
            return Err(FcsError::TruncatedData {
                expected,
                actual: declared,
            });
        }
        let start = meta
            .data
            .map_or(0, |d| usize::try_from(d.begin).unwrap_or(usize::MAX));
        let available = bytes.get(start..).unwrap_or(&[]);
        let columns = layout.decode(available, events)?;
        info!(
            "Decoded {} events x {} parameters ({} {:?})",
            events,
            parameters,
            layout.data_type.as_str(),
            layout.endianness
        );

        let mut frame = Frame::new(meta.keywords.clone(), events);
        for (i, values) in columns.into_iter().enumerate() {
            frame.add_dimension(self.build_dimension(&meta, i + 1, values)?)?;
        }
        Ok(frame)
    }

    fn build_dimension(
        &self,
        meta: &FcsMetadata,
        n: usize,
        values: Vec<f64>,
    ) -> Result<Dimension, FcsError> {
        let short = meta.require(&keywords::short_name(n))?.to_string();
        let range = meta
            .keyword(&keywords::range(n))
            .and_then(|r| r.parse::<f64>().ok());
        let amplification = meta
            .keyword(&keywords::amplification(n))
            .and_then(Amplification::parse)
            .unwrap_or_default();

        let mut dimension = Dimension::new(n, short.as_str(), values)
            .amplification(amplification)
            .range(range);
        if let Some(stain) = meta.keyword(&keywords::stain_name(n)).filter(|s| !s.is_empty()) {
            dimension = dimension.stain(stain);
        }
        if self.config.assign_default_transforms {
            dimension = dimension.transform(default_transform(
                &short,
                range,
                amplification,
                self.config.default_logicle,
            ));
        }
        Ok(dimension)
    }
}

/// Parse a complete file with the default configuration
pub fn parse(bytes: &[u8]) -> Result<Frame, FcsError> {
    FcsReader::default().parse(bytes)
}

/// Read a file from disk with the default configuration
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<Frame, FcsError> {
    FcsReader::default().read_path(path)
}

fn offset_keyword(map: &BTreeMap<String, String>, key: &str) -> Result<u64, FcsError> {
    let value = map
        .get(key)
        .map(|v| v.trim())
        .ok_or_else(|| FcsError::MissingKeyword(key.to_string()))?;
    value.parse().map_err(|_| FcsError::InvalidKeyword {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Add supplemental TEXT keywords that the primary TEXT does not define
fn merge_supplemental(bytes: &[u8], header: &FcsHeader, map: &mut BTreeMap<String, String>) {
    let (Ok(begin), Ok(end)) = (
        offset_keyword(map, keywords::BEGINSTEXT),
        offset_keyword(map, keywords::ENDSTEXT),
    ) else {
        return;
    };
    let Some(segment) = Segment::new(begin, end) else {
        return;
    };
    if segment == header.text {
        return;
    }
    let parsed = segment
        .slice(bytes)
        .ok_or_else(|| FcsError::InvalidText("supplemental TEXT past end of file".to_string()))
        .and_then(parse_text);
    match parsed {
        Ok(extra) => {
            let mut added = 0;
            for (key, value) in extra {
                if let Entry::Vacant(slot) = map.entry(key) {
                    slot.insert(value);
                    added += 1;
                }
            }
            debug!("Merged {} supplemental TEXT keywords", added);
        }
        Err(e) => warn!("Ignoring supplemental TEXT segment: {}", e),
    }
}
