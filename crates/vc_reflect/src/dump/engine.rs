use core::fmt;
use std::rc::Rc;

use vc_io::{ErrorHandler, Limits, LogErrorHandler, ReadExt, Reader, SeekBack, SerialError, SerialResult};

use crate::dump::{ClassValue, Value};
use crate::schema::{ClassSchema, ScalarType, SchemaCache, SchemaProvider, StoredType};
use crate::serial::{ClassHeader, RootTag};

/// Caps the capacity reserved up front for a decoded sequence.
const PREALLOCATION_LIMIT: usize = 1024;

// -----------------------------------------------------------------------------
// Dump

/// The outcome of a dump: everything decoded, and the error that stopped it.
#[derive(Debug)]
pub struct Dump {
    pub value: Value,
    pub error: Option<SerialError>,
}

impl Dump {
    /// Whether the whole stream was decoded.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the value, or the error if decoding stopped early.
    pub fn into_result(self) -> SerialResult<Value> {
        match self.error {
            None => Ok(self.value),
            Some(err) => Err(err),
        }
    }
}

impl fmt::Display for Dump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.value.is_missing() {
            self.value.write_tree(f, 0)?;
            if self.error.is_some() {
                f.write_str("\n")?;
            }
        }
        match &self.error {
            Some(err) => write!(f, "error: {err}"),
            None => Ok(()),
        }
    }
}

// -----------------------------------------------------------------------------
// DumpEngine

/// Decodes top-level streams using only stored schemas.
///
/// Class instances are laid out by the schema of their stored class and
/// version, which must be available from the provider. Schema streams
/// describe themselves.
///
/// Failures are reported once to the error handler ([`LogErrorHandler`]
/// unless one is configured).
///
/// # Example
///
/// ```
/// use vc_reflect::{impl_class, Archive, DumpEngine, MemorySchemaProvider, StaticClass, TypeRegistry};
/// use vc_reflect::io::SliceReader;
///
/// #[derive(Default)]
/// struct Note { text: String, pinned: bool }
/// impl_class! {
///     Note as "Note" version 1 {}
///     fields { text: String [STATE], pinned: bool [STATE] }
/// }
///
/// let note = Note { text: "hello".into(), pinned: true };
/// let mut bytes = Vec::new();
/// Archive::new(&TypeRegistry::new()).write_root(&note, &mut bytes).unwrap();
///
/// let mut schemas = MemorySchemaProvider::new();
/// schemas.insert(&vc_reflect::ClassSchema::of(Note::static_class_info())).unwrap();
///
/// let dump = DumpEngine::new(&schemas).dump(&mut SliceReader::new(&bytes));
/// assert_eq!(dump.to_string(), "Note (version 1)\n  text = \"hello\"\n  pinned = true");
/// ```
pub struct DumpEngine<'a> {
    schemas: &'a dyn SchemaProvider,
    errors: Option<&'a mut dyn ErrorHandler>,
    limits: Limits,
}

impl<'a> DumpEngine<'a> {
    pub fn new(schemas: &'a dyn SchemaProvider) -> Self {
        Self {
            schemas,
            errors: None,
            limits: Limits::new(),
        }
    }

    #[inline]
    pub fn with_error_handler(mut self, errors: &'a mut dyn ErrorHandler) -> Self {
        self.errors = Some(errors);
        self
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

    /// Peeks the root tag of the stream and decodes what follows.
    pub fn dump<R: Reader + SeekBack + ?Sized>(&mut self, reader: &mut R) -> Dump {
        match peek_tag(reader) {
            Ok(tag) => self.dump_tagged(tag, reader),
            Err(err) => self.finish(Value::Missing, Err(err)),
        }
    }

    /// Reads the root tag, which must be `tag`, and decodes what follows.
    pub fn dump_tagged<R: Reader + ?Sized>(&mut self, tag: RootTag, reader: &mut R) -> Dump {
        let mut value = Value::Missing;
        let result = self.decode(tag, reader, &mut value);
        self.finish(value, result)
    }

    fn decode<R: Reader + ?Sized>(
        &self,
        tag: RootTag,
        reader: &mut R,
        value: &mut Value,
    ) -> SerialResult<()> {
        RootTag::expect(reader, tag)?;
        match tag {
            RootTag::Class => {
                let mut decoder = Decoder {
                    reader,
                    schemas: self.schemas,
                    loaded: SchemaCache::new(),
                    limits: self.limits,
                    depth: 0,
                };
                let header = ClassHeader::read(decoder.reader, self.limits)?;
                decoder.class_body(header, None, value)
            }
            RootTag::ClassSchema => {
                *value = Value::Schema(ClassSchema::decode_body(reader, self.limits)?);
                Ok(())
            }
        }
    }

    fn finish(&mut self, value: Value, result: SerialResult<()>) -> Dump {
        let error = result.err();
        if let Some(err) = &error {
            match self.errors.as_deref_mut() {
                Some(handler) => handler.report(err),
                None => LogErrorHandler.report(err),
            }
        }
        Dump { value, error }
    }
}

fn peek_tag<R: Reader + SeekBack + ?Sized>(reader: &mut R) -> SerialResult<RootTag> {
    let byte = reader.read_u8()?;
    reader.seek_back(1)?;
    RootTag::from_byte(byte)
        .ok_or_else(|| SerialError::invalid_data(format!("unknown root tag {byte:#04x}")))
}

// -----------------------------------------------------------------------------
// Decoder

// Values are written into their slot as soon as they exist, so a failure
// leaves everything decoded so far in the tree.
struct Decoder<'d, R: ?Sized> {
    reader: &'d mut R,
    schemas: &'d dyn SchemaProvider,
    loaded: SchemaCache,
    limits: Limits,
    depth: usize,
}

impl<R: Reader + ?Sized> Decoder<'_, R> {
    fn value(&mut self, ty: &StoredType, slot: &mut Value) -> SerialResult<()> {
        match ty {
            StoredType::Scalar(scalar) => {
                *slot = self.scalar(*scalar)?;
                Ok(())
            }
            StoredType::Str => {
                *slot = Value::Str(self.reader.read_string(self.limits.max_len)?);
                Ok(())
            }
            StoredType::Seq(element) => self.seq(element, slot),
            StoredType::Class(name) => {
                let header = self.header()?;
                if header.name() != name {
                    return Err(SerialError::type_mismatch(name.clone(), header.name));
                }
                self.class_body(header, None, slot)
            }
            StoredType::Poly(base) => {
                let declared = self.header()?;
                if declared.name() != base {
                    return Err(SerialError::type_mismatch(base.clone(), declared.name));
                }
                let header = self.header()?;
                self.class_body(header, Some(base.clone()), slot)
            }
        }
    }

    fn scalar(&mut self, scalar: ScalarType) -> SerialResult<Value> {
        let reader = &mut *self.reader;
        Ok(match scalar {
            ScalarType::Bool => Value::Bool(reader.read_bool()?),
            ScalarType::U8 => Value::UInt(reader.read_u8()?.into()),
            ScalarType::U16 => Value::UInt(reader.read_u16()?.into()),
            ScalarType::U32 => Value::UInt(reader.read_u32()?.into()),
            ScalarType::U64 => Value::UInt(reader.read_u64()?),
            ScalarType::I8 => Value::Int(reader.read_i8()?.into()),
            ScalarType::I16 => Value::Int(reader.read_i16()?.into()),
            ScalarType::I32 => Value::Int(reader.read_i32()?.into()),
            ScalarType::I64 => Value::Int(reader.read_i64()?),
            ScalarType::F32 => Value::F32(reader.read_f32()?),
            ScalarType::F64 => Value::F64(reader.read_f64()?),
        })
    }

    fn seq(&mut self, element: &StoredType, slot: &mut Value) -> SerialResult<()> {
        let count = self.reader.read_len("sequence length", self.limits.max_len)?;
        let mut items = Vec::with_capacity(count.min(PREALLOCATION_LIMIT));
        let mut result = Ok(());
        for _ in 0..count {
            let mut item = Value::Missing;
            result = self.value(element, &mut item);
            if !item.is_missing() {
                items.push(item);
            }
            if result.is_err() {
                break;
            }
        }
        *slot = Value::Seq(items);
        result
    }

    fn header(&mut self) -> SerialResult<ClassHeader> {
        ClassHeader::read(self.reader, self.limits)
    }

    fn class_body(
        &mut self,
        header: ClassHeader,
        declared: Option<String>,
        slot: &mut Value,
    ) -> SerialResult<()> {
        let depth = self.depth + 1;
        self.limits.check_depth(depth)?;

        let mut class = ClassValue::new(header.name(), header.version);
        class.declared = declared;

        self.depth = depth;
        let result = self.fields(&header, &mut class);
        self.depth -= 1;

        *slot = Value::Class(class);
        result
    }

    fn fields(&mut self, header: &ClassHeader, class: &mut ClassValue) -> SerialResult<()> {
        let schema = self.schema_of(header)?;
        for field in schema.fields() {
            let mut value = Value::Missing;
            let result = self.value(field.ty(), &mut value);
            if !value.is_missing() {
                class.push(field.name(), value);
            }
            result?;
        }
        Ok(())
    }

    fn schema_of(&mut self, header: &ClassHeader) -> SerialResult<Rc<ClassSchema>> {
        match self.loaded.load(self.schemas, header.name(), self.limits)? {
            Some(schema) if schema.version() == header.version => Ok(schema),
            Some(schema) => Err(SerialError::VersionMismatch {
                class: header.name().to_owned(),
                expected: schema.version(),
                found: header.version,
            }),
            None => Err(SerialError::SchemaNotFound {
                class: header.name().to_owned(),
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
