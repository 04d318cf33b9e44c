use core::any::Any;

use vc_io::{ErrorHandler, Limits, LogErrorHandler, Reader, SerialResult, Writer};

use crate::class::StaticClass;
use crate::field::FieldFlags;
use crate::reflector::Reflected;
use crate::registry::TypeRegistry;
use crate::schema::{ClassSchema, SchemaProvider};
use crate::serial::{ReadContext, RootTag, WriteContext};

/// Entry point for writing and reading reflected values.
///
/// Every operation stops at the first failure, reports it once to the error
/// handler ([`LogErrorHandler`] unless one is configured), and returns it.
///
/// # Example
///
/// ```
/// use vc_reflect::{impl_class, Archive, TypeRegistry};
/// use vc_reflect::io::SliceReader;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Note { text: String, pinned: bool }
/// impl_class! {
///     Note as "Note" version 1 {}
///     fields { text: String [STATE], pinned: bool [STATE] }
/// }
///
/// let registry = TypeRegistry::new();
/// let mut archive = Archive::new(&registry);
///
/// let note = Note { text: "hello".into(), pinned: true };
/// let mut bytes = Vec::new();
/// archive.write_root(&note, &mut bytes).unwrap();
///
/// let mut restored = Note::default();
/// archive.read_root(&mut restored, &mut SliceReader::new(&bytes)).unwrap();
/// assert_eq!(restored, note);
/// ```
pub struct Archive<'a> {
    registry: &'a TypeRegistry,
    schemas: Option<&'a dyn SchemaProvider>,
    errors: Option<&'a mut dyn ErrorHandler>,
    limits: Limits,
}

impl<'a> Archive<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            schemas: None,
            errors: None,
            limits: Limits::new(),
        }
    }

    /// Sets the provider of stored schemas, used when a stored class version
    /// differs from the live one.
    #[inline]
    pub fn with_schemas(mut self, schemas: &'a dyn SchemaProvider) -> Self {
        self.schemas = Some(schemas);
        self
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
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    fn write_context<'w>(&self, writer: &'w mut dyn Writer) -> WriteContext<'w> {
        WriteContext::new(writer).with_limits(self.limits)
    }

    fn read_context<'r>(&self, reader: &'r mut dyn Reader) -> ReadContext<'r>
    where
        'a: 'r,
    {
        ReadContext::new(reader, self.registry)
            .with_schemas(self.schemas)
            .with_limits(self.limits)
    }

    fn finish<T>(&mut self, result: SerialResult<T>) -> SerialResult<T> {
        if let Err(err) = &result {
            match self.errors.as_deref_mut() {
                Some(handler) => handler.report(err),
                None => LogErrorHandler.report(err),
            }
        }
        result
    }

    // -------------------------------------------------------------------------
    // Values

    /// Writes the binary form of `value`.
    pub fn serialize<T: Reflected, W: Writer>(&mut self, value: &T, writer: &mut W) -> SerialResult<()> {
        let result = T::reflector().serialize(&mut self.write_context(writer), value);
        self.finish(result)
    }

    /// Reads the binary form of a `T` into `value`.
    pub fn deserialize<T: Reflected, R: Reader>(&mut self, value: &mut T, reader: &mut R) -> SerialResult<()> {
        let result = T::reflector().deserialize(&mut self.read_context(reader), value);
        self.finish(result)
    }

    /// Writes a top-level stream: the [`RootTag::Class`] byte and the instance.
    pub fn write_root<C: StaticClass, W: Writer>(&mut self, value: &C, writer: &mut W) -> SerialResult<()> {
        let mut cx = self.write_context(writer);
        let result = RootTag::Class
            .write(&mut cx)
            .and_then(|()| C::reflector().serialize(&mut cx, value));
        self.finish(result)
    }

    /// Reads a top-level stream written by [`write_root`](Self::write_root).
    pub fn read_root<C: StaticClass, R: Reader>(&mut self, value: &mut C, reader: &mut R) -> SerialResult<()> {
        let mut cx = self.read_context(reader);
        let result = RootTag::expect(&mut cx, RootTag::Class)
            .and_then(|()| C::reflector().deserialize(&mut cx, value));
        self.finish(result)
    }

    /// Writes the current schema of `C` as a top-level stream.
    pub fn write_schema<C: StaticClass, W: Writer>(&mut self, writer: &mut W) -> SerialResult<()> {
        let result = ClassSchema::of(C::static_class_info()).encode(writer);
        self.finish(result)
    }

    // -------------------------------------------------------------------------
    // Type info

    /// Writes a compact identification of `T`, see
    /// [`TypeReflector::serialize_type_info`](crate::TypeReflector::serialize_type_info).
    pub fn serialize_type_info<T: Reflected, W: Writer>(
        &mut self,
        value: Option<&T>,
        writer: &mut W,
    ) -> SerialResult<()> {
        let value = value.map(|value| value as &dyn Any);
        let result = T::reflector().serialize_type_info(&mut self.write_context(writer), value);
        self.finish(result)
    }

    /// Reads a type identification and checks it against `T`.
    pub fn verify_type_info<T: Reflected, R: Reader>(&mut self, reader: &mut R) -> SerialResult<()> {
        let result = T::reflector().verify_type_info(&mut self.read_context(reader));
        self.finish(result)
    }

    // -------------------------------------------------------------------------
    // Text

    /// Renders `value`, nested class fields filtered by `mask`.
    pub fn to_string<T: Reflected>(&mut self, value: &T, mask: FieldFlags) -> SerialResult<String> {
        let result = T::reflector().to_string(value, mask);
        self.finish(result)
    }

    /// Parses `text` into `value`.
    pub fn set_from_string<T: Reflected>(&mut self, value: &mut T, text: &str) -> SerialResult<()> {
        let result = T::reflector().set_from_string(text, value);
        self.finish(result)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Archive;
    use crate::fixtures::{
        Circle, Entity, Grid, GridV1, Layer, Player, RecordV1, RecordV2, RecordV3, Scene, Shape,
        Square, StackV1, StackV2, Vec2, grid, player, registry, scene, schema, schemas_of,
    };
    use crate::io::{ErrorKind, ErrorLog, Limits, SerialError, SliceReader, WriteExt};
    use crate::{FieldFlags, MemorySchemaProvider, StaticClass, TypeRegistry};

    fn write<C: StaticClass>(registry: &TypeRegistry, value: &C) -> Vec<u8> {
        let mut bytes = Vec::new();
        Archive::new(registry).write_root(value, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn round_trip_restores_persisted_fields() {
        let registry = registry();
        let original = player();
        let bytes = write(&registry, &original);

        let mut restored = Player::default();
        restored.base.scratch = 5;
        Archive::new(&registry)
            .read_root(&mut restored, &mut SliceReader::new(&bytes))
            .unwrap();

        assert_eq!(restored.base.id, 42);
        assert_eq!(restored.base.name, "alice");
        assert_eq!(restored.score, -7);
        assert!(restored.alive);
        assert_eq!(restored.position, Vec2 { x: 1.5, y: -2.0 });
        assert_eq!(restored.tags, ["red", "fast"]);
        assert_eq!(restored.history, original.history);
        // Not a STATE field, left alone.
        assert_eq!(restored.base.scratch, 5);
    }

    #[test]
    fn layout_is_header_then_derived_fields_then_base_fields() {
        let registry = registry();
        let entity = Entity {
            id: 1,
            name: "e".into(),
            scratch: 3,
        };
        let bytes = write(&registry, &entity);

        let mut expected = vec![b'C'];
        expected.write_str("Entity").unwrap();
        expected.write_u32(1).unwrap();
        expected.write_u64(1).unwrap();
        expected.write_str("e").unwrap();
        assert_eq!(bytes, expected);

        let shape = Circle {
            base: Shape { label: "c".into() },
            radius: 2.0,
        };
        let bytes = write(&registry, &shape);
        let mut expected = vec![b'C'];
        expected.write_str("Circle").unwrap();
        expected.write_u32(1).unwrap();
        expected.write_f64(2.0).unwrap();
        expected.write_str("c").unwrap();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn polymorphic_fields_keep_their_dynamic_class() {
        let registry = registry();
        let bytes = write(&registry, &scene());

        let mut restored = Scene::default();
        Archive::new(&registry)
            .read_root(&mut restored, &mut SliceReader::new(&bytes))
            .unwrap();

        assert_eq!(restored.title, "demo");
        let focus = restored.focus.downcast_ref::<Circle>().unwrap();
        assert_eq!(focus.radius, 3.5);
        assert_eq!(focus.base.label, "sun");

        assert_eq!(restored.shapes.len(), 2);
        assert_eq!(restored.shapes[0].downcast_ref::<Square>().unwrap().side, 4);
        assert_eq!(restored.shapes[1].class_info().name(), "Circle");
    }

    #[test]
    fn unknown_dynamic_class_is_reported_once() {
        let mut registry = TypeRegistry::new();
        registry.register_class::<Shape>();
        registry.register_class::<Scene>();
        let bytes = write(&registry, &scene());

        let mut log = ErrorLog::default();
        let err = Archive::new(&registry)
            .with_error_handler(&mut log)
            .read_root(&mut Scene::default(), &mut SliceReader::new(&bytes))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnknownClassIdentifier);
        assert!(matches!(err.root(), SerialError::UnknownClassIdentifier(name) if name == "Circle"));
        assert_eq!(log.kinds(), [ErrorKind::UnknownClassIdentifier]);
    }

    #[test]
    fn other_version_without_schema_is_a_mismatch() {
        let registry = TypeRegistry::new();
        let bytes = write(&registry, &RecordV2::default());

        let mut target = RecordV1 { a: 5, b: "kept".into() };
        let err = Archive::new(&registry)
            .read_root(&mut target, &mut SliceReader::new(&bytes))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionMismatch);
        assert_eq!(target, RecordV1 { a: 5, b: "kept".into() });
        assert!(matches!(
            err.root(),
            SerialError::VersionMismatch { expected: 1, found: 2, .. }
        ));
    }

    #[test]
    fn newer_layout_reads_into_older_class() {
        let registry = registry();
        let newer = RecordV2 {
            a: 7,
            b: "seven".into(),
            c: vec![Vec2 { x: 1.0, y: 2.0 }, Vec2 { x: 3.0, y: 4.0 }],
        };
        let bytes = write(&registry, &newer);

        let mut provider = MemorySchemaProvider::new();
        provider.insert(&schema::<RecordV2>()).unwrap();

        let mut older = RecordV1::default();
        let mut reader = SliceReader::new(&bytes);
        Archive::new(&registry)
            .with_schemas(&provider)
            .read_root(&mut older, &mut reader)
            .unwrap();

        assert_eq!(older, RecordV1 { a: 7, b: "seven".into() });
        assert!(reader.is_empty());
        assert_eq!(provider.open_count(), provider.close_count());
    }

    #[test]
    fn older_layout_reads_into_newer_class() {
        let registry = registry();
        let bytes = write(&registry, &RecordV1 { a: 3, b: "x".into() });

        let mut provider = MemorySchemaProvider::new();
        provider.insert(&schema::<RecordV1>()).unwrap();

        let mut newer = RecordV2 {
            c: vec![Vec2::default()],
            ..RecordV2::default()
        };
        Archive::new(&registry)
            .with_schemas(&provider)
            .read_root(&mut newer, &mut SliceReader::new(&bytes))
            .unwrap();

        assert_eq!(newer.a, 3);
        assert_eq!(newer.b, "x");
        assert_eq!(newer.c, [Vec2::default()]);
    }

    #[test]
    fn stored_fields_are_matched_by_name_and_type() {
        let registry = registry();
        let bytes = write(&registry, &RecordV1 { a: 3, b: "x".into() });

        let mut provider = MemorySchemaProvider::new();
        provider.insert(&schema::<RecordV1>()).unwrap();

        // `b` is stored as a string but is a `u64` now.
        let err = Archive::new(&registry)
            .with_schemas(&provider)
            .read_root(&mut RecordV3::default(), &mut SliceReader::new(&bytes))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn mandatory_fields_must_be_stored() {
        let registry = registry();
        let bytes = write(&registry, &RecordV2::default());

        // A stored layout of version 2 without `a`.
        let mut stripped = crate::ClassSchema::new("Record", 2);
        for field in schema::<RecordV2>().fields().iter().filter(|f| f.name() != "a") {
            stripped = stripped.with_field(field.name(), field.ty().clone(), field.version());
        }
        let mut provider = MemorySchemaProvider::new();
        provider.insert(&stripped).unwrap();

        let err = Archive::new(&registry)
            .with_schemas(&provider)
            .read_root(&mut RecordV3::default(), &mut SliceReader::new(&bytes))
            .unwrap_err();
        assert!(matches!(
            err.root(),
            SerialError::MissingMandatoryField { field, .. } if field == "a"
        ));
        assert_eq!(err.kind(), ErrorKind::VersionMismatch);
    }

    #[test]
    fn skipping_unknown_class_values_needs_their_layout() {
        // `c` holds `Vec2` values; without `Vec2` in the registry or the
        // provider they cannot be skipped.
        let bytes = write(&registry(), &RecordV2 {
            c: vec![Vec2::default()],
            ..RecordV2::default()
        });

        let registry = TypeRegistry::new();
        let provider = schemas_of(&[RecordV2::static_class_info()]);
        let err = Archive::new(&registry)
            .with_schemas(&provider)
            .read_root(&mut RecordV1::default(), &mut SliceReader::new(&bytes))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaNotFound);

        let provider = schemas_of(&[RecordV2::static_class_info(), Vec2::static_class_info()]);
        let mut older = RecordV1::default();
        Archive::new(&registry)
            .with_schemas(&provider)
            .read_root(&mut older, &mut SliceReader::new(&bytes))
            .unwrap();
        assert_eq!(older, RecordV1::default());
    }

    #[test]
    fn fields_sharing_a_name_across_levels_are_matched_in_order() {
        let registry = registry();
        let older = StackV1 {
            base: Layer { v: 2 },
            v: 1,
        };
        let bytes = write(&registry, &older);
        let provider = schemas_of(&[StackV1::static_class_info()]);

        let mut newer = StackV2 {
            w: 9,
            ..StackV2::default()
        };
        let mut reader = SliceReader::new(&bytes);
        Archive::new(&registry)
            .with_schemas(&provider)
            .read_root(&mut newer, &mut reader)
            .unwrap();

        assert_eq!((newer.v, newer.base.v), (1, 2));
        assert_eq!(newer.w, 9);
        assert!(reader.is_empty());
    }

    #[test]
    fn mandatory_base_field_is_not_satisfied_by_a_derived_one() {
        let registry = registry();
        let bytes = write(&registry, &StackV1::default());

        // Only the first `v`, the one declared by `Stack`.
        let full = schema::<StackV1>();
        let first = &full.fields()[0];
        let stripped = crate::ClassSchema::new("Stack", 1).with_field(first.name(), first.ty().clone(), first.version());
        let mut provider = MemorySchemaProvider::new();
        provider.insert(&stripped).unwrap();

        let err = Archive::new(&registry)
            .with_schemas(&provider)
            .read_root(&mut StackV2::default(), &mut SliceReader::new(&bytes))
            .unwrap_err();
        assert!(matches!(
            err.root(),
            SerialError::MissingMandatoryField { class, field } if class == "Stack" && field == "v"
        ));
    }

    #[test]
    fn nested_sequences_round_trip() {
        let registry = registry();
        let original = grid();
        let bytes = write(&registry, &original);

        let mut restored = Grid {
            heights: vec![vec![7]],
            ..Grid::default()
        };
        let mut reader = SliceReader::new(&bytes);
        Archive::new(&registry)
            .read_root(&mut restored, &mut reader)
            .unwrap();

        assert_eq!(restored, original);
        assert!(reader.is_empty());
        assert_eq!(
            Archive::new(&registry)
                .to_string(&original.heights, FieldFlags::STATE)
                .unwrap(),
            "[[1, 2], [], [3]]"
        );
    }

    #[test]
    fn nested_sequences_are_skipped_with_one_load_per_class() {
        let bytes = write(&registry(), &grid());

        // `Vec2` is only known through the provider, each element needs its layout.
        let registry = TypeRegistry::new();
        let provider = schemas_of(&[Grid::static_class_info(), Vec2::static_class_info()]);
        let mut older = GridV1::default();
        let mut reader = SliceReader::new(&bytes);
        Archive::new(&registry)
            .with_schemas(&provider)
            .read_root(&mut older, &mut reader)
            .unwrap();

        assert_eq!(older.name, "map");
        assert!(reader.is_empty());
        assert_eq!(provider.open_count(), 2);
        assert_eq!(provider.close_count(), 2);
    }

    #[test]
    fn truncated_stream_is_unexpected_eof() {
        let registry = registry();
        let bytes = write(&registry, &player());

        for len in [0, 1, 5, bytes.len() / 2, bytes.len() - 1] {
            let err = Archive::new(&registry)
                .read_root(&mut Player::default(), &mut SliceReader::new(&bytes[..len]))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnexpectedEof, "truncated to {len} bytes");
        }
    }

    #[test]
    fn wrong_class_header_is_a_type_mismatch() {
        let registry = registry();
        let bytes = write(&registry, &Vec2::default());

        let err = Archive::new(&registry)
            .read_root(&mut Entity::default(), &mut SliceReader::new(&bytes))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn oversized_lengths_are_rejected() {
        let registry = registry();
        let original = Player {
            tags: vec!["x".repeat(64)],
            ..Player::default()
        };
        let bytes = write(&registry, &original);

        let err = Archive::new(&registry)
            .with_limits(Limits::new().with_max_len(16))
            .read_root(&mut Player::default(), &mut SliceReader::new(&bytes))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn nesting_depth_is_limited() {
        let registry = registry();
        let bytes = write(&registry, &player());

        // Player -> Vec2 is two levels deep.
        let err = Archive::new(&registry)
            .with_limits(Limits::new().with_max_depth(1))
            .read_root(&mut Player::default(), &mut SliceReader::new(&bytes))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);

        Archive::new(&registry)
            .with_limits(Limits::new().with_max_depth(2))
            .read_root(&mut Player::default(), &mut SliceReader::new(&bytes))
            .unwrap();
    }

    #[cfg(all(debug_assertions, feature = "debug"))]
    #[test]
    fn errors_carry_the_class_path() {
        let registry = registry();
        let mut bytes = write(&registry, &player());
        // Tag, `Player` header, score and alive, `Vec2` header, half of x.
        bytes.truncate(1 + 10 + 4 + 4 + 1 + 8 + 4 + 2);

        let err = Archive::new(&registry)
            .read_root(&mut Player::default(), &mut SliceReader::new(&bytes))
            .unwrap_err();
        match err {
            SerialError::Context { path, .. } => assert_eq!(path, "Player -> Vec2"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn type_info_round_trip() {
        let registry = registry();
        let mut archive = Archive::new(&registry);

        let mut bytes = Vec::new();
        archive.serialize_type_info::<Vec<u32>, _>(None, &mut bytes).unwrap();
        archive.verify_type_info::<Vec<u32>, _>(&mut SliceReader::new(&bytes)).unwrap();
        let err = archive
            .verify_type_info::<Vec<i32>, _>(&mut SliceReader::new(&bytes))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let mut bytes = Vec::new();
        archive.serialize_type_info(Some(&player()), &mut bytes).unwrap();
        archive.verify_type_info::<Player, _>(&mut SliceReader::new(&bytes)).unwrap();
        let err = archive
            .verify_type_info::<Entity, _>(&mut SliceReader::new(&bytes))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let mut bytes = Vec::new();
        let focus = scene().focus;
        archive.serialize_type_info(Some(&focus), &mut bytes).unwrap();
        archive
            .verify_type_info::<crate::Poly<Shape>, _>(&mut SliceReader::new(&bytes))
            .unwrap();
    }

    #[test]
    fn text_forms() {
        let registry = registry();
        let mut log = ErrorLog::default();
        let mut archive = Archive::new(&registry).with_error_handler(&mut log);

        let value = player();
        assert_eq!(
            archive.to_string(&value, FieldFlags::STATE).unwrap(),
            "{score=\"-7\", alive=\"true\", position=\"{x=\"1.5\", y=\"-2\"}\", \
             tags=\"[red, fast]\", history=\"[{x=\"0\", y=\"0\"}, {x=\"1\", y=\"0.5\"}]\", \
             id=\"42\", name=\"alice\"}"
        );
        assert_eq!(
            archive.to_string(&value, FieldFlags::CONFIG).unwrap(),
            "{score=\"-7\", alive=\"true\", name=\"alice\", scratch=\"9\"}"
        );

        let mut score = 0i32;
        archive.set_from_string(&mut score, "12").unwrap();
        assert_eq!(score, 12);

        let mut target = Player::default();
        let err = archive.set_from_string(&mut target, "{}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
        drop(archive);
        assert_eq!(log.kinds(), [ErrorKind::NotImplemented]);
    }

    #[test]
    fn schema_stream_is_tagged() {
        let registry = registry();
        let mut bytes = Vec::new();
        Archive::new(&registry).write_schema::<Player, _>(&mut bytes).unwrap();
        assert_eq!(bytes[0], b'S');

        let decoded = crate::ClassSchema::decode(&mut SliceReader::new(&bytes), Limits::new()).unwrap();
        assert_eq!(decoded, schema::<Player>());
    }
}
