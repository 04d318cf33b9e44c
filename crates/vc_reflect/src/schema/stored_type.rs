use core::fmt;

use serde::{Serialize, Serializer};
use vc_io::{Limits, ReadExt, Reader, SerialError, SerialResult, WriteExt, Writer};

const TAG_STR: u8 = 0x10;
const TAG_SEQ: u8 = 0x20;
const TAG_CLASS: u8 = 0x30;
const TAG_POLY: u8 = 0x31;

// -----------------------------------------------------------------------------
// ScalarType

/// Fixed-width primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ScalarType {
    /// The descriptor tag of this type.
    pub const fn tag(self) -> u8 {
        match self {
            Self::Bool => 0x01,
            Self::U8 => 0x02,
            Self::I8 => 0x03,
            Self::U16 => 0x04,
            Self::I16 => 0x05,
            Self::U32 => 0x06,
            Self::I32 => 0x07,
            Self::U64 => 0x08,
            Self::I64 => 0x09,
            Self::F32 => 0x0A,
            Self::F64 => 0x0B,
        }
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0x01 => Self::Bool,
            0x02 => Self::U8,
            0x03 => Self::I8,
            0x04 => Self::U16,
            0x05 => Self::I16,
            0x06 => Self::U32,
            0x07 => Self::I32,
            0x08 => Self::U64,
            0x09 => Self::I64,
            0x0A => Self::F32,
            0x0B => Self::F64,
            _ => return None,
        })
    }

    /// Encoded size in bytes.
    pub const fn width(self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// StoredType

/// Descriptor of a persisted type, enough to decode or skip a value without
/// knowing the live type.
///
/// Encoded as a tag byte: scalars use `0x01..=0x0B`, `0x10` is a string,
/// `0x20` a sequence followed by its element descriptor, `0x30` a class and
/// `0x31` a polymorphic value of a base class, both followed by the class
/// name.
///
/// ```
/// use vc_reflect::StoredType;
/// use vc_reflect::schema::ScalarType;
/// use vc_reflect::io::{Limits, SliceReader};
///
/// let ty = StoredType::Seq(Box::new(StoredType::Class("Vec2".into())));
/// assert_eq!(ty.to_string(), "seq<class Vec2>");
///
/// let mut bytes = Vec::new();
/// ty.encode(&mut bytes).unwrap();
/// assert_eq!(bytes[..2], [0x20, 0x30]);
///
/// let decoded = StoredType::decode(&mut SliceReader::new(&bytes), Limits::new()).unwrap();
/// assert_eq!(decoded, ty);
/// assert_eq!(StoredType::Scalar(ScalarType::U16).fixed_width(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoredType {
    Scalar(ScalarType),
    Str,
    Seq(Box<StoredType>),
    /// A class value of exactly this class.
    Class(String),
    /// A value of this base class or of any class derived from it.
    Poly(String),
}

impl StoredType {
    /// Encoded size of a value in bytes, if it does not depend on the value.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::Scalar(scalar) => Some(scalar.width()),
            _ => None,
        }
    }

    pub fn encode<W: Writer + ?Sized>(&self, writer: &mut W) -> SerialResult<()> {
        match self {
            Self::Scalar(scalar) => writer.write_u8(scalar.tag()),
            Self::Str => writer.write_u8(TAG_STR),
            Self::Seq(element) => {
                writer.write_u8(TAG_SEQ)?;
                element.encode(writer)
            }
            Self::Class(name) => {
                writer.write_u8(TAG_CLASS)?;
                writer.write_str(name)
            }
            Self::Poly(base) => {
                writer.write_u8(TAG_POLY)?;
                writer.write_str(base)
            }
        }
    }

    /// Decodes a descriptor, nesting at most `limits.max_depth` sequences.
    pub fn decode<R: Reader + ?Sized>(reader: &mut R, limits: Limits) -> SerialResult<Self> {
        let mut depth = 0;
        let mut tag = reader.read_u8()?;
        while tag == TAG_SEQ {
            depth += 1;
            limits.check_depth(depth)?;
            tag = reader.read_u8()?;
        }

        let mut ty = match tag {
            TAG_STR => Self::Str,
            TAG_CLASS => Self::Class(reader.read_string(limits.max_len)?),
            TAG_POLY => Self::Poly(reader.read_string(limits.max_len)?),
            other => match ScalarType::from_tag(other) {
                Some(scalar) => Self::Scalar(scalar),
                None => {
                    return Err(SerialError::invalid_data(format!(
                        "unknown stored type tag {other:#04x}"
                    )));
                }
            },
        };
        for _ in 0..depth {
            ty = Self::Seq(Box::new(ty));
        }
        Ok(ty)
    }
}

impl fmt::Display for StoredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => f.write_str(scalar.as_str()),
            Self::Str => f.write_str("str"),
            Self::Seq(element) => write!(f, "seq<{element}>"),
            Self::Class(name) => write!(f, "class {name}"),
            Self::Poly(base) => write!(f, "poly {base}"),
        }
    }
}

impl Serialize for StoredType {
    /// Serialized as its display form, e.g. `"seq<class Vec2>"`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ScalarType, StoredType};
    use crate::io::{ErrorKind, Limits, SliceReader};

    #[test]
    fn every_scalar_tag_is_distinct() {
        let all = [
            ScalarType::Bool,
            ScalarType::U8,
            ScalarType::I8,
            ScalarType::U16,
            ScalarType::I16,
            ScalarType::U32,
            ScalarType::I32,
            ScalarType::U64,
            ScalarType::I64,
            ScalarType::F32,
            ScalarType::F64,
        ];
        for scalar in all {
            assert_eq!(ScalarType::from_tag(scalar.tag()), Some(scalar));
        }
        assert_eq!(ScalarType::from_tag(0x0C), None);
    }

    #[test]
    fn deep_sequences_are_limited() {
        let bytes = [0x20; 8];
        let err = StoredType::decode(&mut SliceReader::new(&bytes), Limits::new().with_max_depth(4))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn unknown_tags_are_invalid() {
        let err = StoredType::decode(&mut SliceReader::new(&[0x7F]), Limits::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn serializes_as_text() {
        let ty = StoredType::Poly("Shape".into());
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"poly Shape\"");
    }
}
