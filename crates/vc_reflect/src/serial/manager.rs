use core::any::Any;

use foldhash::fast::FixedState;
use hashbrown::HashMap;
use vc_io::{SerialError, SerialResult};

use crate::class::{Class, ClassInfo};
use crate::field::{FieldFlags, ReflectedFields, ReflectedFieldsMut};
use crate::schema::ClassSchema;
use crate::serial::skip::skip_value;
use crate::serial::{ClassHeader, ReadContext, WriteContext};

/// Writes and reads class instances field by field.
///
/// This is what [`ClassReflector`](crate::reflector::ClassReflector) and
/// [`PolyReflector`](crate::reflector::PolyReflector) delegate to. Fields
/// are visited most derived level first, and only
/// [`STATE`](FieldFlags::STATE) fields are persisted.
pub struct SerializationManager;

impl SerializationManager {
    // -------------------------------------------------------------------------
    // Writing

    /// Writes the header of `class` and the persisted fields of `instance`.
    pub fn serialize_instance(
        cx: &mut WriteContext<'_>,
        class: &'static ClassInfo,
        instance: &dyn Any,
    ) -> SerialResult<()> {
        cx.scoped(
            || class.name().into(),
            |cx| {
                ClassHeader::of(class).write(cx)?;
                Self::write_fields(cx, class, instance)
            },
        )
    }

    /// Writes a polymorphic value: the header of `declared`, the header of
    /// the object's class, and the object's persisted fields.
    pub fn serialize_polymorphic(
        cx: &mut WriteContext<'_>,
        declared: &'static ClassInfo,
        object: &dyn Class,
    ) -> SerialResult<()> {
        let dynamic = object.class_info();
        if !dynamic.derives_from(declared) {
            return Err(not_derived(declared, dynamic.name()));
        }
        cx.scoped(
            || dynamic.name().into(),
            |cx| {
                ClassHeader::of(declared).write(cx)?;
                ClassHeader::of(dynamic).write(cx)?;
                Self::write_fields(cx, dynamic, object)
            },
        )
    }

    fn write_fields(
        cx: &mut WriteContext<'_>,
        class: &'static ClassInfo,
        instance: &dyn Any,
    ) -> SerialResult<()> {
        for field in &ReflectedFields::new(class, instance) {
            let field = field?;
            if field.is_persisted() {
                field.reflector().serialize(cx, field.value())?;
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reading

    /// Reads a value of `class` into `instance`.
    ///
    /// The stored class name must be `class`. If the stored version differs
    /// from the live one, the stored layout is loaded from the schema
    /// provider, see [`ReadContext::load_schema`].
    pub fn deserialize_instance(
        cx: &mut ReadContext<'_>,
        class: &'static ClassInfo,
        instance: &mut dyn Any,
    ) -> SerialResult<()> {
        cx.scoped(
            || class.name().into(),
            |cx| {
                let header = cx.read_header()?;
                if header.name() != class.name() {
                    return Err(SerialError::type_mismatch(class.name(), header.name));
                }
                Self::read_body(cx, class, header.version, instance)
            },
        )
    }

    /// Reads a polymorphic value of base class `declared`.
    ///
    /// The dynamic class is resolved by name through the registry, must
    /// derive from `declared`, and is default-constructed before its fields
    /// are read.
    pub fn deserialize_polymorphic(
        cx: &mut ReadContext<'_>,
        declared: &'static ClassInfo,
    ) -> SerialResult<Box<dyn Class>> {
        cx.scoped(
            || declared.name().into(),
            |cx| {
                let base = cx.read_header()?;
                if base.name() != declared.name() {
                    return Err(SerialError::type_mismatch(declared.name(), base.name));
                }

                let header = cx.read_header()?;
                let meta = cx.registry().resolve_class(header.name())?;
                let class = meta.info();
                if !class.derives_from(declared) {
                    return Err(not_derived(declared, class.name()));
                }

                let mut object = meta.construct();
                cx.scoped(
                    || class.name().into(),
                    |cx| Self::read_body(cx, class, header.version, &mut *object),
                )?;
                Ok(object)
            },
        )
    }

    fn read_body(
        cx: &mut ReadContext<'_>,
        class: &'static ClassInfo,
        stored_version: u32,
        instance: &mut dyn Any,
    ) -> SerialResult<()> {
        if stored_version == class.version() {
            return Self::read_fields(cx, class, instance);
        }

        let mismatch = || SerialError::VersionMismatch {
            class: class.name().to_owned(),
            expected: class.version(),
            found: stored_version,
        };
        let Some(schema) = cx.load_schema(class.name())? else {
            return Err(mismatch());
        };
        if schema.version() != stored_version {
            log::debug!(
                "stored schema of class `{}` has version {}, the stream has version {stored_version}",
                class.name(),
                schema.version(),
            );
            return Err(mismatch());
        }

        log::debug!(
            "reading class `{}` version {stored_version} into version {} through its stored schema",
            class.name(),
            class.version(),
        );
        Self::read_fields_with_schema(cx, class, &schema, instance)
    }

    fn read_fields(
        cx: &mut ReadContext<'_>,
        class: &'static ClassInfo,
        instance: &mut dyn Any,
    ) -> SerialResult<()> {
        let mut fields = ReflectedFieldsMut::new(class, instance);
        for index in 0..fields.count() {
            let mut field = fields.field_mut(index)?;
            if field.is_persisted() {
                field.reflector().deserialize(cx, field.value_mut())?;
            }
        }
        Ok(())
    }

    fn read_fields_with_schema(
        cx: &mut ReadContext<'_>,
        class: &'static ClassInfo,
        schema: &ClassSchema,
        instance: &mut dyn Any,
    ) -> SerialResult<()> {
        // A name shared by several levels is matched by occurrence: the n-th
        // stored field of that name goes to the n-th live one.
        let mut live_seen: HashMap<&str, usize, FixedState> = HashMap::with_hasher(FixedState::with_seed(0));
        for level in class.chain() {
            for field in level.own_fields() {
                let nth = live_seen.entry(field.name()).or_default();
                let mandatory = field.is_persisted() && field.flags().contains(FieldFlags::MANDATORY);
                if mandatory && stored_occurrences(schema, field.name()) <= *nth {
                    return Err(SerialError::MissingMandatoryField {
                        class: class.name().to_owned(),
                        field: field.name().to_owned(),
                    });
                }
                *nth += 1;
            }
        }

        let mut stored_seen: HashMap<&str, usize, FixedState> = HashMap::with_hasher(FixedState::with_seed(0));
        let mut fields = ReflectedFieldsMut::new(class, instance);
        for stored in schema.fields() {
            let nth = stored_seen.entry(stored.name()).or_default();
            let index = fields.nth_index_of(stored.name(), *nth);
            *nth += 1;
            let Some(index) = index else {
                log::debug!(
                    "skipping stored field `{}` of class `{}`, the live class has no such field",
                    stored.name(),
                    class.name(),
                );
                skip_value(cx, stored.ty())?;
                continue;
            };

            let mut field = fields.field_mut(index)?;
            if !field.is_persisted() {
                log::debug!(
                    "skipping stored field `{}` of class `{}`, it is no longer persisted",
                    stored.name(),
                    class.name(),
                );
                skip_value(cx, stored.ty())?;
                continue;
            }

            let live = field.reflector().stored_type();
            if live != *stored.ty() {
                return Err(SerialError::type_mismatch(
                    format!("{live} for field `{}::{}`", class.name(), stored.name()),
                    stored.ty().to_string(),
                ));
            }
            field.reflector().deserialize(cx, field.value_mut())?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Type info

    /// Reads a class header and checks it against `class`.
    ///
    /// A different version is accepted if the schema provider describes it.
    pub fn verify_header(cx: &mut ReadContext<'_>, class: &'static ClassInfo) -> SerialResult<()> {
        let header = cx.read_header()?;
        if header.name() != class.name() {
            return Err(SerialError::type_mismatch(class.name(), header.name));
        }
        Self::verify_version(cx, class, header.version)
    }

    /// Reads the two headers of a polymorphic value and checks them against
    /// `declared` and the registry.
    pub fn verify_polymorphic(
        cx: &mut ReadContext<'_>,
        declared: &'static ClassInfo,
    ) -> SerialResult<()> {
        Self::verify_header(cx, declared)?;
        let header = cx.read_header()?;
        let class = cx.registry().resolve_class(header.name())?.info();
        if !class.derives_from(declared) {
            return Err(not_derived(declared, class.name()));
        }
        Self::verify_version(cx, class, header.version)
    }

    fn verify_version(
        cx: &mut ReadContext<'_>,
        class: &'static ClassInfo,
        stored_version: u32,
    ) -> SerialResult<()> {
        if stored_version == class.version() {
            return Ok(());
        }
        match cx.load_schema(class.name())? {
            Some(schema) if schema.version() == stored_version => Ok(()),
            _ => Err(SerialError::VersionMismatch {
                class: class.name().to_owned(),
                expected: class.version(),
                found: stored_version,
            }),
        }
    }
}

fn stored_occurrences(schema: &ClassSchema, name: &str) -> usize {
    schema.fields().iter().filter(|field| field.name() == name).count()
}

#[cold]
fn not_derived(declared: &ClassInfo, found: &str) -> SerialError {
    SerialError::type_mismatch(
        format!("a class derived from `{}`", declared.name()),
        found.to_owned(),
    )
}
