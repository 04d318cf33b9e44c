use crate::{SerialError, SerialResult};

/// Upper bound on [`SeekBack::seek_back`] requests.
///
/// Enough to un-read a root tag or a length prefix, nothing more.
pub const MAX_SEEK_BACK: usize = 8;

// -----------------------------------------------------------------------------
// Reader

/// A source of bytes.
///
/// Implementations fail with [`SerialError::UnexpectedEof`] when the source
/// ends early and with [`SerialError::Io`] for other transport failures.
pub trait Reader {
    /// Fills `buf` completely, advancing the cursor by `buf.len()`.
    fn read_exact(&mut self, buf: &mut [u8]) -> SerialResult<()>;

    /// Advances the cursor by `n` bytes.
    fn skip(&mut self, mut n: usize) -> SerialResult<()> {
        let mut scratch = [0u8; 256];
        while n > 0 {
            let chunk = n.min(scratch.len());
            self.read_exact(&mut scratch[..chunk])?;
            n -= chunk;
        }
        Ok(())
    }
}

impl<R: Reader + ?Sized> Reader for &mut R {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> SerialResult<()> {
        (**self).read_exact(buf)
    }

    #[inline]
    fn skip(&mut self, n: usize) -> SerialResult<()> {
        (**self).skip(n)
    }
}

impl<R: Reader + ?Sized> Reader for Box<R> {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> SerialResult<()> {
        (**self).read_exact(buf)
    }

    #[inline]
    fn skip(&mut self, n: usize) -> SerialResult<()> {
        (**self).skip(n)
    }
}

// -----------------------------------------------------------------------------
// SeekBack

/// Moves a reader's cursor backwards by a few bytes.
///
/// This is a narrow "unread" capability used to peek a discriminator, not
/// general seeking. Requests larger than [`MAX_SEEK_BACK`] or reaching before
/// the start of the stream fail with [`SerialError::InvalidData`].
pub trait SeekBack {
    fn seek_back(&mut self, n: usize) -> SerialResult<()>;
}

impl<R: SeekBack + ?Sized> SeekBack for &mut R {
    #[inline]
    fn seek_back(&mut self, n: usize) -> SerialResult<()> {
        (**self).seek_back(n)
    }
}

#[cold]
pub(crate) fn seek_back_too_far(n: usize) -> SerialError {
    SerialError::invalid_data(format!(
        "cannot seek back {n} bytes (at most {MAX_SEEK_BACK})"
    ))
}
