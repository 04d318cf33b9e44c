use crate::SerialResult;

/// A sink for bytes.
pub trait Writer {
    /// Writes all of `buf`.
    fn write_all(&mut self, buf: &[u8]) -> SerialResult<()>;
}

impl<W: Writer + ?Sized> Writer for &mut W {
    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> SerialResult<()> {
        (**self).write_all(buf)
    }
}

impl<W: Writer + ?Sized> Writer for Box<W> {
    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> SerialResult<()> {
        (**self).write_all(buf)
    }
}

impl Writer for Vec<u8> {
    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> SerialResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
}
