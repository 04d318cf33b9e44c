use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::reader::seek_back_too_far;
use crate::{MAX_SEEK_BACK, Reader, SeekBack, SerialError, SerialResult, Writer};

// -----------------------------------------------------------------------------
// IoReader

/// [`Reader`] and [`SeekBack`] over any [`std::io`] stream.
///
/// Typically wraps a `BufReader<File>`.
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
}

impl<R> IoReader<R> {
    #[inline]
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    #[inline]
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    #[inline]
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Reader for IoReader<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> SerialResult<()> {
        self.inner.read_exact(buf).map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => SerialError::UnexpectedEof { needed: buf.len() },
            _ => SerialError::Io(err),
        })
    }
}

impl<R: Seek> SeekBack for IoReader<R> {
    fn seek_back(&mut self, n: usize) -> SerialResult<()> {
        if n > MAX_SEEK_BACK {
            return Err(seek_back_too_far(n));
        }
        // `n` is bounded above, the cast cannot wrap.
        let offset = -(n as i64);
        let pos = self.inner.stream_position()?;
        if pos < n as u64 {
            return Err(seek_back_too_far(n));
        }
        self.inner.seek(SeekFrom::Current(offset))?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// IoWriter

/// [`Writer`] over any [`std::io::Write`].
#[derive(Debug)]
pub struct IoWriter<W> {
    inner: W,
}

impl<W> IoWriter<W> {
    #[inline]
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> IoWriter<W> {
    /// Flushes the underlying stream.
    pub fn flush(&mut self) -> SerialResult<()> {
        self.inner.flush().map_err(SerialError::Io)
    }
}

impl<W: Write> Writer for IoWriter<W> {
    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> SerialResult<()> {
        self.inner.write_all(buf).map_err(SerialError::Io)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{IoReader, IoWriter};
    use crate::{ErrorKind, Reader, SeekBack, Writer};

    #[test]
    fn reads_and_seeks_back() {
        let mut reader = IoReader::new(Cursor::new(vec![1u8, 2, 3, 4]));
        let mut buf = [0u8; 3];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);

        reader.seek_back(2).unwrap();
        let mut two = [0u8; 2];
        reader.read_exact(&mut two).unwrap();
        assert_eq!(two, [2, 3]);

        let err = reader.read_exact(&mut two).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn seek_back_before_start_fails() {
        let mut reader = IoReader::new(Cursor::new(vec![1u8, 2]));
        reader.skip(1).unwrap();
        assert_eq!(reader.seek_back(2).unwrap_err().kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn writes_through() {
        let mut writer = IoWriter::new(Vec::new());
        writer.write_all(b"vc").unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.into_inner(), b"vc");
    }
}
