use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use foldhash::fast::FixedState;
use hashbrown::HashMap;
use vc_io::{IoReader, IoWriter, Limits, Reader, SerialError, SerialResult, SliceReader};

use crate::schema::ClassSchema;

/// File extension of schema files kept by [`DirSchemaProvider`].
pub const SCHEMA_EXTENSION: &str = "class_schema";

// -----------------------------------------------------------------------------
// SchemaProvider

/// A source of [`ClassSchema`] streams, looked up by class name.
///
/// Every stream returned by [`open_class_schema`](Self::open_class_schema)
/// is handed back to [`close_class_schema`](Self::close_class_schema) exactly
/// once, on success and on failure alike, when it is read through
/// [`load_class_schema`].
pub trait SchemaProvider {
    /// Opens the stored schema of `class_name`, or returns `None` if there
    /// is none.
    fn open_class_schema(&self, class_name: &str) -> SerialResult<Option<Box<dyn Reader + '_>>>;

    /// Releases a stream returned by [`open_class_schema`](Self::open_class_schema).
    fn close_class_schema<'s>(&'s self, reader: Box<dyn Reader + 's>) {
        drop(reader);
    }
}

impl<P: SchemaProvider + ?Sized> SchemaProvider for &P {
    #[inline]
    fn open_class_schema(&self, class_name: &str) -> SerialResult<Option<Box<dyn Reader + '_>>> {
        (**self).open_class_schema(class_name)
    }

    #[inline]
    fn close_class_schema<'s>(&'s self, reader: Box<dyn Reader + 's>) {
        (**self).close_class_schema(reader);
    }
}

// Closes the stream when dropped.
struct OpenSchema<'s> {
    provider: &'s dyn SchemaProvider,
    reader: Option<Box<dyn Reader + 's>>,
}

impl OpenSchema<'_> {
    fn decode(&mut self, limits: Limits) -> SerialResult<ClassSchema> {
        match self.reader.as_deref_mut() {
            Some(reader) => ClassSchema::decode(reader, limits),
            None => Err(SerialError::invalid_data("class schema stream already closed")),
        }
    }
}

impl Drop for OpenSchema<'_> {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            self.provider.close_class_schema(reader);
        }
    }
}

/// Opens, decodes and closes the schema of `class_name`.
///
/// Returns `Ok(None)` if the provider has no schema for the class. Fails with
/// [`SerialError::TypeMismatch`] if the stream describes another class.
pub fn load_class_schema(
    provider: &dyn SchemaProvider,
    class_name: &str,
    limits: Limits,
) -> SerialResult<Option<ClassSchema>> {
    let Some(reader) = provider.open_class_schema(class_name)? else {
        log::debug!("no stored schema for class `{class_name}`");
        return Ok(None);
    };
    let mut open = OpenSchema {
        provider,
        reader: Some(reader),
    };

    let schema = open.decode(limits)?;
    if schema.class_name() != class_name {
        return Err(SerialError::type_mismatch(
            format!("schema of class `{class_name}`"),
            format!("schema of class `{}`", schema.class_name()),
        ));
    }
    log::debug!(
        "loaded schema of class `{class_name}` version {}",
        schema.version()
    );
    Ok(Some(schema))
}

// -----------------------------------------------------------------------------
// SchemaCache

/// Schemas loaded during one read, by class name.
///
/// The provider is asked about each class at most once, also when it has no
/// schema for it. Failed loads are not remembered.
///
/// ```
/// use vc_reflect::{ClassSchema, MemorySchemaProvider, StoredType};
/// use vc_reflect::schema::SchemaCache;
/// use vc_reflect::io::Limits;
///
/// let mut provider = MemorySchemaProvider::new();
/// provider.insert(&ClassSchema::new("Note", 1).with_field("text", StoredType::Str, 1)).unwrap();
///
/// let mut cache = SchemaCache::new();
/// for _ in 0..3 {
///     assert!(cache.load(&provider, "Note", Limits::new()).unwrap().is_some());
///     assert!(cache.load(&provider, "Ghost", Limits::new()).unwrap().is_none());
/// }
/// assert_eq!(provider.open_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SchemaCache {
    loaded: HashMap<String, Option<Rc<ClassSchema>>, FixedState>,
}

impl SchemaCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the schema of `class_name`, loading it through
    /// [`load_class_schema`] on first use.
    pub fn load(
        &mut self,
        provider: &dyn SchemaProvider,
        class_name: &str,
        limits: Limits,
    ) -> SerialResult<Option<Rc<ClassSchema>>> {
        if let Some(schema) = self.loaded.get(class_name) {
            return Ok(schema.clone());
        }
        let schema = load_class_schema(provider, class_name, limits)?.map(Rc::new);
        self.loaded.insert(class_name.to_owned(), schema.clone());
        Ok(schema)
    }
}

// -----------------------------------------------------------------------------
// DirSchemaProvider

/// Keeps one `<ClassName>.class_schema` file per class in a directory.
///
/// ```
/// use vc_reflect::{ClassSchema, DirSchemaProvider, StoredType};
/// use vc_reflect::schema::load_class_schema;
/// use vc_reflect::io::Limits;
///
/// let dir = tempfile::tempdir().unwrap();
/// let provider = DirSchemaProvider::new(dir.path());
///
/// let schema = ClassSchema::new("Note", 1).with_field("text", StoredType::Str, 1);
/// let path = provider.store(&schema).unwrap();
/// assert!(path.ends_with("Note.class_schema"));
///
/// let loaded = load_class_schema(&provider, "Note", Limits::new()).unwrap();
/// assert_eq!(loaded, Some(schema));
/// assert_eq!(load_class_schema(&provider, "Missing", Limits::new()).unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct DirSchemaProvider {
    dir: PathBuf,
}

impl DirSchemaProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file holding the schema of `class_name`.
    ///
    /// Fails with [`SerialError::InvalidData`] for names that are not a
    /// single plain path component.
    pub fn path_of(&self, class_name: &str) -> SerialResult<PathBuf> {
        let plain = !class_name.is_empty()
            && class_name != "."
            && class_name != ".."
            && !class_name.contains(['/', '\\', '\0']);
        if !plain {
            return Err(SerialError::invalid_data(format!(
                "class name `{class_name}` cannot name a schema file"
            )));
        }
        Ok(self.dir.join(format!("{class_name}.{SCHEMA_EXTENSION}")))
    }

    /// Writes `schema` to its file, creating the directory if needed.
    pub fn store(&self, schema: &ClassSchema) -> SerialResult<PathBuf> {
        let path = self.path_of(schema.class_name())?;
        fs::create_dir_all(&self.dir)?;
        let mut writer = IoWriter::new(BufWriter::new(File::create(&path)?));
        schema.encode(&mut writer)?;
        writer.flush()?;
        log::debug!(
            "stored schema of class `{}` version {} at {}",
            schema.class_name(),
            schema.version(),
            path.display()
        );
        Ok(path)
    }
}

impl SchemaProvider for DirSchemaProvider {
    fn open_class_schema(&self, class_name: &str) -> SerialResult<Option<Box<dyn Reader + '_>>> {
        let path = self.path_of(class_name)?;
        match File::open(&path) {
            Ok(file) => Ok(Some(Box::new(IoReader::new(BufReader::new(file))))),
            Err(err) if err.kind() == IoErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

// -----------------------------------------------------------------------------
// MemorySchemaProvider

/// Keeps encoded schemas in memory and counts opened and closed streams.
///
/// ```
/// use vc_reflect::{ClassSchema, MemorySchemaProvider};
/// use vc_reflect::schema::load_class_schema;
/// use vc_reflect::io::Limits;
///
/// let mut provider = MemorySchemaProvider::new();
/// provider.insert(&ClassSchema::new("Empty", 3)).unwrap();
///
/// let schema = load_class_schema(&provider, "Empty", Limits::new()).unwrap().unwrap();
/// assert_eq!(schema.version(), 3);
/// assert_eq!(provider.open_count(), 1);
/// assert_eq!(provider.close_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemorySchemaProvider {
    schemas: HashMap<String, Vec<u8>, FixedState>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl MemorySchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes and stores `schema`, replacing any schema of the same class.
    pub fn insert(&mut self, schema: &ClassSchema) -> SerialResult<()> {
        let mut bytes = Vec::new();
        schema.encode(&mut bytes)?;
        self.schemas.insert(schema.class_name().to_owned(), bytes);
        Ok(())
    }

    /// Stores raw bytes as the schema of `class_name`.
    pub fn insert_bytes(&mut self, class_name: impl Into<String>, bytes: Vec<u8>) {
        self.schemas.insert(class_name.into(), bytes);
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.schemas.contains_key(class_name)
    }

    /// Number of streams opened so far.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }

    /// Number of streams closed so far.
    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::Relaxed)
    }
}

impl SchemaProvider for MemorySchemaProvider {
    fn open_class_schema(&self, class_name: &str) -> SerialResult<Option<Box<dyn Reader + '_>>> {
        let Some(bytes) = self.schemas.get(class_name) else {
            return Ok(None);
        };
        self.opened.fetch_add(1, Ordering::Relaxed);
        Ok(Some(Box::new(SliceReader::new(bytes))))
    }

    fn close_class_schema<'s>(&'s self, reader: Box<dyn Reader + 's>) {
        self.closed.fetch_add(1, Ordering::Relaxed);
        drop(reader);
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DirSchemaProvider, MemorySchemaProvider, load_class_schema};
    use crate::io::{ErrorKind, Limits};
    use crate::schema::{ClassSchema, StoredType};

    #[test]
    fn closes_after_a_failed_decode() {
        let mut provider = MemorySchemaProvider::new();
        let mut bytes = Vec::new();
        ClassSchema::new("Broken", 1)
            .with_field("a", StoredType::Str, 1)
            .encode(&mut bytes)
            .unwrap();
        bytes.truncate(bytes.len() - 3);
        provider.insert_bytes("Broken", bytes);

        let err = load_class_schema(&provider, "Broken", Limits::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
        assert_eq!(provider.open_count(), 1);
        assert_eq!(provider.close_count(), 1);
    }

    #[test]
    fn rejects_a_schema_of_another_class() {
        let mut provider = MemorySchemaProvider::new();
        let mut bytes = Vec::new();
        ClassSchema::new("Other", 1).encode(&mut bytes).unwrap();
        provider.insert_bytes("Wanted", bytes);

        let err = load_class_schema(&provider, "Wanted", Limits::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(provider.close_count(), 1);
    }

    #[test]
    fn missing_schema_is_not_opened() {
        let provider = MemorySchemaProvider::new();
        assert_eq!(load_class_schema(&provider, "Ghost", Limits::new()).unwrap(), None);
        assert_eq!(provider.open_count(), 0);
        assert_eq!(provider.close_count(), 0);
    }

    #[test]
    fn directory_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let provider = DirSchemaProvider::new(dir.path().join("schemas"));

        let schema = ClassSchema::new("Player", 2).with_field("name", StoredType::Str, 1);
        let path = provider.store(&schema).unwrap();
        assert_eq!(path, dir.path().join("schemas").join("Player.class_schema"));

        let loaded = load_class_schema(&provider, "Player", Limits::new()).unwrap();
        assert_eq!(loaded, Some(schema));
    }

    #[test]
    fn directory_rejects_path_like_names() {
        let provider = DirSchemaProvider::new("schemas");
        for name in ["", "..", "a/b", "a\\b"] {
            assert_eq!(provider.path_of(name).unwrap_err().kind(), ErrorKind::InvalidData);
        }
    }
}
