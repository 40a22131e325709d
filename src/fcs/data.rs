//! DATA segment layout and decoding.
//!
//! List-mode data is event-interleaved: each event stores one value per
//! parameter, in parameter order, with the widths declared by `$PnB`.
//! Integer values are returned as read; no `$PnR` bit masking is applied.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use serde::Serialize;

use super::FcsError;

/// Numeric encoding declared by `$DATATYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataType {
    /// Unsigned integers (`I`)
    Integer,
    /// IEEE single precision (`F`)
    Float,
    /// IEEE double precision (`D`)
    Double,
}

impl DataType {
    /// Parse a `$DATATYPE` value
    pub fn parse(value: &str) -> Result<Self, FcsError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "I" => Ok(Self::Integer),
            "F" => Ok(Self::Float),
            "D" => Ok(Self::Double),
            other => Err(FcsError::UnsupportedDataType(other.to_string())),
        }
    }

    /// Keyword value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "I",
            Self::Float => "F",
            Self::Double => "D",
        }
    }
}

/// Byte order declared by `$BYTEORD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Endianness {
    /// `1,2,3,4`
    Little,
    /// `4,3,2,1`
    Big,
}

impl Endianness {
    /// Parse a `$BYTEORD` value; only strictly ascending or descending
    /// byte sequences are supported
    pub fn parse(value: &str) -> Result<Self, FcsError> {
        let unsupported = || FcsError::UnsupportedByteOrder(value.trim().to_string());
        let order = value
            .split(',')
            .map(|t| t.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| unsupported())?;
        let n = order.len();
        if n < 2 {
            return Err(unsupported());
        }
        if order.iter().copied().eq(1..=n) {
            Ok(Self::Little)
        } else if order.iter().copied().eq((1..=n).rev()) {
            Ok(Self::Big)
        } else {
            Err(unsupported())
        }
    }

    /// Keyword value for 4-byte words
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Little => "1,2,3,4",
            Self::Big => "4,3,2,1",
        }
    }
}

/// Width and encoding of every parameter in one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataLayout {
    /// Encoding shared by all parameters
    pub data_type: DataType,
    /// Byte order shared by all parameters
    pub endianness: Endianness,
    /// Bits per value, one entry per parameter
    pub bits: Vec<u32>,
}

impl DataLayout {
    /// Check that every width agrees with the data type
    pub fn new(data_type: DataType, endianness: Endianness, bits: Vec<u32>) -> Result<Self, FcsError> {
        for (i, &b) in bits.iter().enumerate() {
            let ok = match data_type {
                DataType::Integer => matches!(b, 8 | 16 | 32 | 64),
                DataType::Float => b == 32,
                DataType::Double => b == 64,
            };
            if !ok {
                return Err(FcsError::InconsistentLayout(format!(
                    "parameter {} declares {} bits for data type {}",
                    i + 1,
                    b,
                    data_type.as_str()
                )));
            }
        }
        Ok(Self {
            data_type,
            endianness,
            bits,
        })
    }

    /// Bytes per event
    pub fn row_bytes(&self) -> usize {
        self.bits.iter().map(|&b| b as usize / 8).sum()
    }

    /// Decode `events` rows into one column per parameter
    pub fn decode(&self, data: &[u8], events: usize) -> Result<Vec<Vec<f64>>, FcsError> {
        let expected = events.checked_mul(self.row_bytes()).ok_or_else(|| {
            FcsError::InconsistentLayout(format!("{events} events overflow the address space"))
        })?;
        if data.len() < expected {
            return Err(FcsError::TruncatedData {
                expected,
                actual: data.len(),
            });
        }
        Ok(match self.endianness {
            Endianness::Little => self.decode_rows::<LittleEndian>(&data[..expected], events),
            Endianness::Big => self.decode_rows::<BigEndian>(&data[..expected], events),
        })
    }

    fn decode_rows<B: byteorder::ByteOrder>(&self, data: &[u8], events: usize) -> Vec<Vec<f64>> {
        let mut columns: Vec<Vec<f64>> = self
            .bits
            .iter()
            .map(|_| Vec::with_capacity(events))
            .collect();
        let widths: Vec<usize> = self.bits.iter().map(|&b| b as usize / 8).collect();

        let mut offset = 0;
        for _ in 0..events {
            for (column, &width) in columns.iter_mut().zip(&widths) {
                let word = &data[offset..offset + width];
                column.push(self.read_value::<B>(word));
                offset += width;
            }
        }
        columns
    }

    fn read_value<B: byteorder::ByteOrder>(&self, word: &[u8]) -> f64 {
        match (self.data_type, word.len()) {
            (DataType::Float, _) => B::read_f32(word) as f64,
            (DataType::Double, _) => B::read_f64(word),
            (DataType::Integer, 1) => word[0] as f64,
            (DataType::Integer, 2) => B::read_u16(word) as f64,
            (DataType::Integer, 4) => B::read_u32(word) as f64,
            (DataType::Integer, _) => B::read_u64(word) as f64,
        }
    }
}

/// Encode columns as little-endian doubles, event-interleaved
pub fn encode_doubles(columns: &[&[f64]], events: usize) -> Vec<u8> {
    let mut out = vec![0u8; events * columns.len() * 8];
    let mut offset = 0;
    for event in 0..events {
        for column in columns {
            LittleEndian::write_f64(&mut out[offset..offset + 8], column[event]);
            offset += 8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_order_parsing() {
        assert_eq!(Endianness::parse("1,2,3,4").unwrap(), Endianness::Little);
        assert_eq!(Endianness::parse("1,2").unwrap(), Endianness::Little);
        assert_eq!(Endianness::parse("4, 3, 2, 1").unwrap(), Endianness::Big);
        assert_eq!(Endianness::parse("2,1").unwrap(), Endianness::Big);
        assert!(matches!(
            Endianness::parse("3,4,1,2"),
            Err(FcsError::UnsupportedByteOrder(_))
        ));
    }

    #[test]
    fn test_data_type_parsing() {
        assert_eq!(DataType::parse("i").unwrap(), DataType::Integer);
        assert!(matches!(
            DataType::parse("A"),
            Err(FcsError::UnsupportedDataType(_))
        ));
    }

    #[test]
    fn test_inconsistent_widths() {
        assert!(matches!(
            DataLayout::new(DataType::Float, Endianness::Little, vec![32, 16]),
            Err(FcsError::InconsistentLayout(_))
        ));
        assert!(matches!(
            DataLayout::new(DataType::Integer, Endianness::Little, vec![12]),
            Err(FcsError::InconsistentLayout(_))
        ));
        assert!(DataLayout::new(DataType::Integer, Endianness::Big, vec![8, 16, 32]).is_ok());
    }

    #[test]
    fn test_decode_mixed_integer_widths_big_endian() {
        let layout = DataLayout::new(DataType::Integer, Endianness::Big, vec![8, 16, 32]).unwrap();
        assert_eq!(layout.row_bytes(), 7);
        let data = [
            7, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, // 7, 256, 65536
            255, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // 255, 65535, u32::MAX
        ];
        let columns = layout.decode(&data, 2).unwrap();
        assert_eq!(columns[0], vec![7.0, 255.0]);
        assert_eq!(columns[1], vec![256.0, 65535.0]);
        assert_eq!(columns[2], vec![65536.0, u32::MAX as f64]);
    }

    #[test]
    fn test_decode_floats_little_endian() {
        let layout = DataLayout::new(DataType::Float, Endianness::Little, vec![32, 32]).unwrap();
        let mut data = Vec::new();
        for v in [1.5f32, -2.25, 1e6, 0.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let columns = layout.decode(&data, 2).unwrap();
        assert_eq!(columns[0], vec![1.5, 1e6]);
        assert_eq!(columns[1], vec![-2.25, 0.0]);
    }

    #[test]
    fn test_truncated_data() {
        let layout = DataLayout::new(DataType::Double, Endianness::Little, vec![64]).unwrap();
        let err = layout.decode(&[0u8; 12], 2).unwrap_err();
        assert!(matches!(
            err,
            FcsError::TruncatedData {
                expected: 16,
                actual: 12
            }
        ));
    }

    #[test]
    fn test_encode_doubles_is_interleaved() {
        let a = [1.0, 2.0];
        let b = [10.0, 20.0];
        let bytes = encode_doubles(&[&a, &b], 2);
        let layout = DataLayout::new(DataType::Double, Endianness::Little, vec![64, 64]).unwrap();
        let columns = layout.decode(&bytes, 2).unwrap();
        assert_eq!(columns, vec![a.to_vec(), b.to_vec()]);
    }
}
