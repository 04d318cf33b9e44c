use crate::{SerialError, SerialResult};

/// Default cap on any length prefix, 4 MiB.
const DEFAULT_MAX_LEN: usize = 4 << 20;

/// Default cap on nested class values.
const DEFAULT_MAX_DEPTH: usize = 64;

/// Caps applied while decoding untrusted input.
///
/// Every length prefix (string bytes, sequence elements, schema field counts)
/// is checked against `max_len` before anything is allocated, and nested class
/// values deeper than `max_depth` are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_len: usize,
    pub max_depth: usize,
}

impl Default for Limits {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Limits {
    /// Returns the default limits: 4 MiB length prefixes, depth 64.
    #[inline]
    pub const fn new() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Returns limits that accept everything.
    #[inline]
    pub const fn unlimited() -> Self {
        Self {
            max_len: usize::MAX,
            max_depth: usize::MAX,
        }
    }

    #[inline]
    pub const fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    #[inline]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Fails with [`SerialError::LimitExceeded`] if `len > max_len`.
    #[inline]
    pub fn check_len(&self, what: &'static str, len: usize) -> SerialResult<usize> {
        if len > self.max_len {
            Err(SerialError::LimitExceeded {
                what,
                len,
                limit: self.max_len,
            })
        } else {
            Ok(len)
        }
    }

    /// Fails with [`SerialError::LimitExceeded`] if `depth > max_depth`.
    #[inline]
    pub fn check_depth(&self, depth: usize) -> SerialResult<()> {
        if depth > self.max_depth {
            Err(SerialError::LimitExceeded {
                what: "nesting depth",
                len: depth,
                limit: self.max_depth,
            })
        } else {
            Ok(())
        }
    }
}
