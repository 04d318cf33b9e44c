use std::borrow::Cow;
use std::rc::Rc;

use vc_io::{Limits, ReadExt, Reader, SerialError, SerialResult, Writer};

use crate::registry::TypeRegistry;
use crate::schema::{ClassSchema, SchemaCache, SchemaProvider};
use crate::serial::ClassHeader;

// -----------------------------------------------------------------------------
// Frames

// Nesting depth and, in debug builds, the chain of classes being processed.
struct Frames {
    depth: usize,
    #[cfg(all(debug_assertions, feature = "debug"))]
    path: Vec<Cow<'static, str>>,
}

impl Frames {
    const fn new() -> Self {
        Self {
            depth: 0,
            #[cfg(all(debug_assertions, feature = "debug"))]
            path: Vec::new(),
        }
    }

    fn enter(&mut self, limits: &Limits, class: impl FnOnce() -> Cow<'static, str>) -> SerialResult<()> {
        let depth = self.depth + 1;
        limits.check_depth(depth)?;
        self.depth = depth;

        #[cfg(all(debug_assertions, feature = "debug"))]
        self.path.push(class());
        #[cfg(not(all(debug_assertions, feature = "debug")))]
        let _ = class;

        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
        #[cfg(all(debug_assertions, feature = "debug"))]
        self.path.pop();
    }

    #[cfg(all(debug_assertions, feature = "debug"))]
    fn annotate(&self, err: SerialError) -> SerialError {
        err.with_path(|| self.path.join(" -> "))
    }

    #[cfg(not(all(debug_assertions, feature = "debug")))]
    #[inline(always)]
    fn annotate(&self, err: SerialError) -> SerialError {
        err
    }
}

// -----------------------------------------------------------------------------
// WriteContext

/// State of one serialization: the output stream, limits and nesting.
///
/// Implements [`Writer`], so reflectors write through it directly.
pub struct WriteContext<'a> {
    writer: &'a mut dyn Writer,
    limits: Limits,
    frames: Frames,
}

impl<'a> WriteContext<'a> {
    pub fn new(writer: &'a mut dyn Writer) -> Self {
        Self {
            writer,
            limits: Limits::new(),
            frames: Frames::new(),
        }
    }

    #[inline]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[inline]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Runs `f` one class level deeper.
    ///
    /// Fails if the nesting exceeds the depth limit. In debug builds errors
    /// coming out of `f` are annotated with the chain of classes.
    pub fn scoped<T>(
        &mut self,
        class: impl FnOnce() -> Cow<'static, str>,
        f: impl FnOnce(&mut Self) -> SerialResult<T>,
    ) -> SerialResult<T> {
        self.frames.enter(&self.limits, class)?;
        let result = f(self).map_err(|err| self.frames.annotate(err));
        self.frames.leave();
        result
    }
}

impl Writer for WriteContext<'_> {
    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> SerialResult<()> {
        self.writer.write_all(bytes)
    }
}

// -----------------------------------------------------------------------------
// ReadContext

/// State of one deserialization: the input stream, the registry used to
/// resolve classes, the schema provider, limits and nesting.
///
/// Implements [`Reader`], so reflectors read through it directly.
pub struct ReadContext<'a> {
    reader: &'a mut dyn Reader,
    registry: &'a TypeRegistry,
    schemas: Option<&'a dyn SchemaProvider>,
    loaded: SchemaCache,
    limits: Limits,
    frames: Frames,
}

impl<'a> ReadContext<'a> {
    pub fn new(reader: &'a mut dyn Reader, registry: &'a TypeRegistry) -> Self {
        Self {
            reader,
            registry,
            schemas: None,
            loaded: SchemaCache::new(),
            limits: Limits::new(),
            frames: Frames::new(),
        }
    }

    #[inline]
    pub fn with_schemas(mut self, schemas: Option<&'a dyn SchemaProvider>) -> Self {
        self.schemas = schemas;
        self
    }

    #[inline]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline]
    pub fn schemas(&self) -> Option<&'a dyn SchemaProvider> {
        self.schemas
    }

    #[inline]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Reads a `u32` length prefix bounded by the configured limit.
    pub fn read_limited_len(&mut self, what: &'static str) -> SerialResult<usize> {
        let limit = self.limits.max_len;
        self.read_len(what, limit)
    }

    /// Reads a string bounded by the configured limit.
    pub fn read_limited_string(&mut self) -> SerialResult<String> {
        let limit = self.limits.max_len;
        self.read_string(limit)
    }

    #[inline]
    pub fn read_header(&mut self) -> SerialResult<ClassHeader> {
        let limits = self.limits;
        ClassHeader::read(self, limits)
    }

    /// Loads the stored schema of `class_name` from the schema provider.
    ///
    /// Returns `Ok(None)` if there is no provider or it has no such schema.
    /// Each class is loaded once per context, see [`SchemaCache`].
    pub fn load_schema(&mut self, class_name: &str) -> SerialResult<Option<Rc<ClassSchema>>> {
        match self.schemas {
            Some(provider) => self.loaded.load(provider, class_name, self.limits),
            None => Ok(None),
        }
    }

    /// Runs `f` one class level deeper, see [`WriteContext::scoped`].
    pub fn scoped<T>(
        &mut self,
        class: impl FnOnce() -> Cow<'static, str>,
        f: impl FnOnce(&mut Self) -> SerialResult<T>,
    ) -> SerialResult<T> {
        self.frames.enter(&self.limits, class)?;
        let result = f(self).map_err(|err| self.frames.annotate(err));
        self.frames.leave();
        result
    }
}

impl Reader for ReadContext<'_> {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> SerialResult<()> {
        self.reader.read_exact(buf)
    }

    #[inline]
    fn skip(&mut self, len: usize) -> SerialResult<()> {
        self.reader.skip(len)
    }
}
