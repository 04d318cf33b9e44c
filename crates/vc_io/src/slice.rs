use crate::reader::seek_back_too_far;
use crate::{MAX_SEEK_BACK, Reader, SeekBack, SerialError, SerialResult};

/// In-memory [`Reader`] over a byte slice.
///
/// ```
/// use vc_io::{Reader, SeekBack, SliceReader};
///
/// let mut reader = SliceReader::new(b"abc");
/// let mut buf = [0u8; 2];
/// reader.read_exact(&mut buf).unwrap();
/// reader.seek_back(1).unwrap();
/// assert_eq!(reader.position(), 1);
/// assert_eq!(reader.remaining(), b"bc");
/// ```
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    #[inline]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Returns the number of bytes consumed so far.
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the bytes not consumed yet.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn take(&mut self, n: usize) -> SerialResult<&'a [u8]> {
        let rest = self.remaining();
        if rest.len() < n {
            return Err(SerialError::UnexpectedEof { needed: n });
        }
        self.pos += n;
        Ok(&rest[..n])
    }
}

impl Reader for SliceReader<'_> {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> SerialResult<()> {
        let src = self.take(buf.len())?;
        buf.copy_from_slice(src);
        Ok(())
    }

    #[inline]
    fn skip(&mut self, n: usize) -> SerialResult<()> {
        self.take(n).map(|_| ())
    }
}

impl SeekBack for SliceReader<'_> {
    fn seek_back(&mut self, n: usize) -> SerialResult<()> {
        if n > MAX_SEEK_BACK || n > self.pos {
            return Err(seek_back_too_far(n));
        }
        self.pos -= n;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests
