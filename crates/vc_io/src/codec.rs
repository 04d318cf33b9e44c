//! Encoding of scalars, booleans, lengths and strings.
//!
//! All integers are little-endian and fixed width, floats are stored as their
//! IEEE-754 bits, booleans take one byte and lengths are `u32`.

use crate::{Reader, SerialError, SerialResult, Writer};

macro_rules! read_scalar {
    ($($name:ident -> $ty:ty),* $(,)?) => {
        $(
            #[inline]
            fn $name(&mut self) -> SerialResult<$ty> {
                self.read_array().map(<$ty>::from_le_bytes)
            }
        )*
    };
}

macro_rules! write_scalar {
    ($($name:ident($ty:ty)),* $(,)?) => {
        $(
            #[inline]
            fn $name(&mut self, value: $ty) -> SerialResult<()> {
                self.write_all(&value.to_le_bytes())
            }
        )*
    };
}

// -----------------------------------------------------------------------------
// ReadExt

/// Decoding helpers, available on every [`Reader`].
///
/// ```
/// use vc_io::{ReadExt, SliceReader};
///
/// let mut reader = SliceReader::new(&[0x2A, 0, 0, 0, 1]);
/// assert_eq!(reader.read_u32().unwrap(), 42);
/// assert!(reader.read_bool().unwrap());
/// ```
pub trait ReadExt: Reader {
    #[inline]
    fn read_array<const N: usize>(&mut self) -> SerialResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    read_scalar! {
        read_u8 -> u8,
        read_i8 -> i8,
        read_u16 -> u16,
        read_i16 -> i16,
        read_u32 -> u32,
        read_i32 -> i32,
        read_u64 -> u64,
        read_i64 -> i64,
        read_f32 -> f32,
        read_f64 -> f64,
    }

    /// Reads one byte, `0` or `1`.
    fn read_bool(&mut self) -> SerialResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SerialError::invalid_data(format!(
                "invalid bool encoding {other:#04x}"
            ))),
        }
    }

    /// Reads a `u32` length prefix and checks it against `limit`.
    fn read_len(&mut self, what: &'static str, limit: usize) -> SerialResult<usize> {
        let len = self.read_u32()? as usize;
        if len > limit {
            return Err(SerialError::LimitExceeded { what, len, limit });
        }
        Ok(len)
    }

    /// Reads a length-prefixed UTF-8 string of at most `limit` bytes.
    fn read_string(&mut self, limit: usize) -> SerialResult<String> {
        let len = self.read_len("string length", limit)?;
        let mut bytes = vec![0u8; len];
        self.read_exact(&mut bytes)?;
        String::from_utf8(bytes)
            .map_err(|err| SerialError::invalid_data(format!("invalid utf-8 string: {err}")))
    }
}

impl<R: Reader + ?Sized> ReadExt for R {}

// -----------------------------------------------------------------------------
// WriteExt

/// Encoding helpers, available on every [`Writer`].
pub trait WriteExt: Writer {
    write_scalar! {
        write_u8(u8),
        write_i8(i8),
        write_u16(u16),
        write_i16(i16),
        write_u32(u32),
        write_i32(i32),
        write_u64(u64),
        write_i64(i64),
        write_f32(f32),
        write_f64(f64),
    }

    #[inline]
    fn write_bool(&mut self, value: bool) -> SerialResult<()> {
        self.write_u8(u8::from(value))
    }

    /// Writes a `u32` length prefix.
    fn write_len(&mut self, what: &'static str, len: usize) -> SerialResult<()> {
        let Ok(len32) = u32::try_from(len) else {
            return Err(SerialError::LimitExceeded {
                what,
                len,
                limit: u32::MAX as usize,
            });
        };
        self.write_u32(len32)
    }

    /// Writes a length-prefixed UTF-8 string.
    fn write_str(&mut self, value: &str) -> SerialResult<()> {
        self.write_len("string length", value.len())?;
        self.write_all(value.as_bytes())
    }
}

impl<W: Writer + ?Sized> WriteExt for W {}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ReadExt, WriteExt};
    use crate::{ErrorKind, SliceReader};

    #[test]
    fn scalars_are_little_endian() {
        let mut out = Vec::new();
        out.write_u16(0x0102).unwrap();
        out.write_i32(-2).unwrap();
        out.write_f32(1.5).unwrap();
        assert_eq!(
            out,
            [0x02, 0x01, 0xFE, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0xC0, 0x3F]
        );

        let mut reader = SliceReader::new(&out);
        assert_eq!(reader.read_u16().unwrap(), 0x0102);
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert!(reader.is_empty());
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut out = Vec::new();
        out.write_str("hé").unwrap();
        assert_eq!(out, [3, 0, 0, 0, b'h', 0xC3, 0xA9]);

        let mut reader = SliceReader::new(&out);
        assert_eq!(reader.read_string(16).unwrap(), "hé");
    }

    #[test]
    fn invalid_bytes_are_rejected() {
        let mut reader = SliceReader::new(&[2]);
        assert_eq!(reader.read_bool().unwrap_err().kind(), ErrorKind::InvalidData);

        let mut reader = SliceReader::new(&[2, 0, 0, 0, 0xFF, 0xFE]);
        assert_eq!(reader.read_string(16).unwrap_err().kind(), ErrorKind::InvalidData);

        let mut reader = SliceReader::new(&[0xFF, 0xFF, 0, 0]);
        let err = reader.read_string(1024).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }
}
