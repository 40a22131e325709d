//! # Frame Persistence
//!
//! Compact binary message for saving a [`Frame`] and loading it back with
//! identical identities, keywords, dimension order, raw values (bit for bit)
//! and transform parameters. Subsets are not part of the message.
//!
//! ## Layout
//!
//! All integers and floats are little-endian. Strings are a `u32` byte
//! length followed by UTF-8; optional fields are a `u8` presence flag
//! followed by the value.
//!
//! ```text
//! magic "FCSF" | version u16 | frame id [16] | events u64
//! compensation ref opt<id>
//! names: u32 count, str...
//! keywords: u32 count, (str key, str value)...
//! dimensions: u32 count, record...
//!
//! record: id [16] | index u32 | short str | stain opt<str>
//!         decades f64 | offset f64 | range opt<f64> | compensation ref opt<id>
//!         values: u64 count, f64...
//!         transform opt<(tag u8, u8 count, f64...)>
//! ```

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::frame::{Amplification, Dimension, Frame};
use crate::ident::Id;
use crate::transform::{Transform, TransformKind};

mod error;


pub use error::PersistError;

/// Leading bytes of every message
pub const MAGIC: [u8; 4] = *b"FCSF";

/// Format version written by [`save`]
pub const FORMAT_VERSION: u16 = 1;

/// Serialize a frame into a new buffer
pub fn save(frame: &Frame) -> Result<Vec<u8>, PersistError> {
    let mut buf = Vec::new();
    write_frame(frame, &mut buf)?;
    Ok(buf)
}

/// Serialize a frame into any sink
pub fn write_frame<W: Write>(frame: &Frame, out: &mut W) -> Result<(), PersistError> {
    out.write_all(&MAGIC)?;
    out.write_u16::<LittleEndian>(FORMAT_VERSION)?;
    out.write_all(frame.id().as_bytes())?;
    out.write_u64::<LittleEndian>(frame.row_count() as u64)?;
    write_opt_id(out, frame.compensation_id())?;

    write_len(out, frame.column_count())?;
    for name in frame.dimension_names() {
        write_str(out, name)?;
    }

    write_len(out, frame.keywords().len())?;
    for (key, value) in frame.keywords() {
        write_str(out, key)?;
        write_str(out, value)?;
    }

    write_len(out, frame.column_count())?;
    for dim in frame.dimensions() {
        write_dimension(out, dim)?;
    }
    Ok(())
}

/// Save a frame to a file
pub fn save_to_path<P: AsRef<Path>>(frame: &Frame, path: P) -> Result<(), PersistError> {
    let file = std::fs::File::create(path.as_ref())?;
    let mut out = std::io::BufWriter::new(file);
    write_frame(frame, &mut out)?;
    out.flush()?;
    debug!("Saved frame {} to {}", frame.id(), path.as_ref().display());
    Ok(())
}

/// Rebuild a frame from a message produced by [`save`]
pub fn load(bytes: &[u8]) -> Result<Frame, PersistError> {
    let mut r = Decoder::new(bytes);

    let mut magic = [0u8; 4];
    r.fill(&mut magic, "magic")?;
    if magic != MAGIC {
        return Err(PersistError::BadMagic);
    }
    let version = r.u16("version")?;
    if version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion(version));
    }
    let id = r.id("frame id")?;
    let events = usize::try_from(r.u64("event count")?)
        .map_err(|_| PersistError::Inconsistent("event count exceeds address space".into()))?;
    let compensation = r.opt_id("frame compensation ref")?;

    let name_count = r.len("dimension names")?;
    let names = (0..name_count)
        .map(|_| r.string("dimension name"))
        .collect::<Result<Vec<_>, _>>()?;

    let keyword_count = r.len("keywords")?;
    let mut keywords = BTreeMap::new();
    for _ in 0..keyword_count {
        let key = r.string("keyword")?;
        let value = r.string("keyword value")?;
        keywords.insert(key, value);
    }

    let mut frame = Frame::with_id(id, keywords, events);
    let dimension_count = r.len("dimensions")?;
    if dimension_count != names.len() {
        return Err(PersistError::Inconsistent(format!(
            "{} names for {} dimensions",
            names.len(),
            dimension_count
        )));
    }
    for name in &names {
        let dim = read_dimension(&mut r)?;
        if dim.short_name() != name {
            return Err(PersistError::Inconsistent(format!(
                "dimension {} stored where {} was listed",
                dim.short_name(),
                name
            )));
        }
        frame.add_dimension(dim)?;
    }
    frame.set_compensation_id(compensation);

    debug!(
        "Loaded frame {} ({} events x {} dimensions)",
        frame.id(),
        frame.row_count(),
        frame.column_count()
    );
    Ok(frame)
}

/// Load a frame from a file
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Frame, PersistError> {
    let bytes = std::fs::read(path)?;
    load(&bytes)
}

fn write_dimension<W: Write>(out: &mut W, dim: &Dimension) -> Result<(), PersistError> {
    out.write_all(dim.id().as_bytes())?;
    let index = u32::try_from(dim.index())
        .map_err(|_| PersistError::Inconsistent(format!("index {} too large", dim.index())))?;
    out.write_u32::<LittleEndian>(index)?;
    write_str(out, dim.short_name())?;
    match dim.stain_name() {
        Some(stain) => {
            out.write_u8(1)?;
            write_str(out, stain)?;
        }
        None => out.write_u8(0)?,
    }
    let amp = dim.amplification_fields();
    out.write_f64::<LittleEndian>(amp.decades)?;
    out.write_f64::<LittleEndian>(amp.offset)?;
    match dim.range_hint() {
        Some(range) => {
            out.write_u8(1)?;
            out.write_f64::<LittleEndian>(range)?;
        }
        None => out.write_u8(0)?,
    }
    write_opt_id(out, dim.compensation_id())?;

    out.write_u64::<LittleEndian>(dim.len() as u64)?;
    for &v in dim.values() {
        out.write_f64::<LittleEndian>(v)?;
    }

    match dim.preferred_transform() {
        Some(transform) => {
            out.write_u8(1)?;
            out.write_u8(transform.kind().tag())?;
            let params = transform.parameters();
            out.write_u8(params.len() as u8)?;
            for p in params {
                out.write_f64::<LittleEndian>(p)?;
            }
        }
        None => out.write_u8(0)?,
    }
    Ok(())
}

fn read_dimension(r: &mut Decoder<'_>) -> Result<Dimension, PersistError> {
    let id = r.id("dimension id")?;
    let index = r.u32("dimension index")? as usize;
    let short = r.string("short name")?;
    let stain = if r.flag("stain flag")? {
        Some(r.string("stain name")?)
    } else {
        None
    };
    let amplification = Amplification {
        decades: r.f64("amplification")?,
        offset: r.f64("amplification")?,
    };
    let range = if r.flag("range flag")? {
        Some(r.f64("range")?)
    } else {
        None
    };
    let compensation = r.opt_id("dimension compensation ref")?;

    let count = usize::try_from(r.u64("value count")?)
        .map_err(|_| PersistError::Truncated("values"))?;
    if count > r.remaining() / 8 {
        return Err(PersistError::Truncated("values"));
    }
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(r.f64("values")?);
    }

    let transform = if r.flag("transform flag")? {
        let tag = r.u8("transform tag")?;
        let kind = TransformKind::from_tag(tag).ok_or(PersistError::InvalidTransformTag(tag))?;
        let n = r.u8("transform parameter count")?;
        let params = (0..n)
            .map(|_| r.f64("transform parameter"))
            .collect::<Result<Vec<_>, _>>()?;
        Some(Transform::from_parameters(kind, &params)?)
    } else {
        None
    };

    let mut dim = Dimension::with_id(id, index, short, values)
        .amplification(amplification)
        .range(range)
        .compensation_ref(compensation)
        .transform(transform);
    if let Some(stain) = stain {
        dim = dim.stain(stain);
    }
    Ok(dim)
}

fn write_len<W: Write>(out: &mut W, len: usize) -> Result<(), PersistError> {
    let len = u32::try_from(len)
        .map_err(|_| PersistError::Inconsistent(format!("length {len} exceeds u32")))?;
    out.write_u32::<LittleEndian>(len)?;
    Ok(())
}

fn write_str<W: Write>(out: &mut W, s: &str) -> Result<(), PersistError> {
    write_len(out, s.len())?;
    out.write_all(s.as_bytes())?;
    Ok(())
}

fn write_opt_id<W: Write>(out: &mut W, id: Option<Id>) -> Result<(), PersistError> {
    match id {
        Some(id) => {
            out.write_u8(1)?;
            out.write_all(id.as_bytes())?;
        }
        None => out.write_u8(0)?,
    }
    Ok(())
}

/// Bounds-checked reads that report which field ran out
struct Decoder<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Decoder<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    fn fill(&mut self, buf: &mut [u8], field: &'static str) -> Result<(), PersistError> {
        self.cursor
            .read_exact(buf)
            .map_err(|_| PersistError::Truncated(field))
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, PersistError> {
        self.cursor.read_u8().map_err(|_| PersistError::Truncated(field))
    }

    fn flag(&mut self, field: &'static str) -> Result<bool, PersistError> {
        match self.u8(field)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(PersistError::Inconsistent(format!(
                "{field} has value {other}"
            ))),
        }
    }

    fn u16(&mut self, field: &'static str) -> Result<u16, PersistError> {
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| PersistError::Truncated(field))
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, PersistError> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| PersistError::Truncated(field))
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, PersistError> {
        self.cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| PersistError::Truncated(field))
    }

    fn f64(&mut self, field: &'static str) -> Result<f64, PersistError> {
        self.cursor
            .read_f64::<LittleEndian>()
            .map_err(|_| PersistError::Truncated(field))
    }

    fn len(&mut self, field: &'static str) -> Result<usize, PersistError> {
        Ok(self.u32(field)? as usize)
    }

    fn id(&mut self, field: &'static str) -> Result<Id, PersistError> {
        let mut bytes = [0u8; 16];
        self.fill(&mut bytes, field)?;
        Ok(Id::from_bytes(bytes))
    }

    fn opt_id(&mut self, field: &'static str) -> Result<Option<Id>, PersistError> {
        if self.flag(field)? {
            Ok(Some(self.id(field)?))
        } else {
            Ok(None)
        }
    }

    fn string(&mut self, field: &'static str) -> Result<String, PersistError> {
        let len = self.len(field)?;
        if len > self.remaining() {
            return Err(PersistError::Truncated(field));
        }
        let mut bytes = vec![0u8; len];
        self.fill(&mut bytes, field)?;
        String::from_utf8(bytes).map_err(|_| PersistError::InvalidUtf8(field))
    }
}
