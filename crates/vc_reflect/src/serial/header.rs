use std::borrow::Cow;

use vc_io::{Limits, ReadExt, Reader, SerialError, SerialResult, WriteExt, Writer};

use crate::class::ClassInfo;

// -----------------------------------------------------------------------------
// RootTag

/// The first byte of a top-level stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RootTag {
    /// A class instance follows.
    Class = b'C',
    /// A [`ClassSchema`](crate::ClassSchema) follows.
    ClassSchema = b'S',
}

impl RootTag {
    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'C' => Some(Self::Class),
            b'S' => Some(Self::ClassSchema),
            _ => None,
        }
    }

    /// Reads a tag byte.
    pub fn read<R: Reader + ?Sized>(reader: &mut R) -> SerialResult<Self> {
        let byte = reader.read_u8()?;
        Self::from_byte(byte)
            .ok_or_else(|| SerialError::invalid_data(format!("unknown root tag {byte:#04x}")))
    }

    /// Reads a tag byte and checks that it is `expected`.
    pub fn expect<R: Reader + ?Sized>(reader: &mut R, expected: Self) -> SerialResult<()> {
        let found = Self::read(reader)?;
        if found == expected {
            Ok(())
        } else {
            Err(SerialError::invalid_data(format!(
                "expected root tag {expected:?}, found {found:?}"
            )))
        }
    }

    #[inline]
    pub fn write<W: Writer + ?Sized>(self, writer: &mut W) -> SerialResult<()> {
        writer.write_u8(self.byte())
    }
}

// -----------------------------------------------------------------------------
// ClassHeader

/// The class name and version preceding every stored class value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub name: Cow<'static, str>,
    pub version: u32,
}

impl ClassHeader {
    pub fn new(name: impl Into<Cow<'static, str>>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// The header of the current layout of `class`.
    #[inline]
    pub fn of(class: &ClassInfo) -> Self {
        Self::new(class.name(), class.version())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn write<W: Writer + ?Sized>(&self, writer: &mut W) -> SerialResult<()> {
        writer.write_str(&self.name)?;
        writer.write_u32(self.version)
    }

    pub fn read<R: Reader + ?Sized>(reader: &mut R, limits: Limits) -> SerialResult<Self> {
        let name = reader.read_string(limits.max_len)?;
        let version = reader.read_u32()?;
        log::trace!("read header of class `{name}` version {version}");
        Ok(Self::new(name, version))
    }
}
