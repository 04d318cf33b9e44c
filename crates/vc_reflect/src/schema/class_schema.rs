use core::fmt;

use serde::Serialize;
use vc_io::{Limits, ReadExt, Reader, SerialError, SerialResult, WriteExt, Writer};

use crate::class::ClassInfo;
use crate::schema::StoredType;
use crate::serial::RootTag;

// -----------------------------------------------------------------------------
// SchemaField

/// One persisted field of a [`ClassSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    name: String,
    ty: StoredType,
    version: u32,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, ty: StoredType, version: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            version,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &StoredType {
        &self.ty
    }

    /// The version of the class level declaring the field.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }
}

// -----------------------------------------------------------------------------
// ClassSchema

/// The persisted layout of one version of a class.
///
/// Fields are listed in stream order, base class fields included.
///
/// Encoded as the [`RootTag::ClassSchema`] byte, the class name, the version,
/// a `u32` field count, then per field its name, its [`StoredType`] and the
/// version of its declaring class level.
///
/// ```
/// use vc_reflect::{ClassSchema, StoredType};
/// use vc_reflect::io::{Limits, SliceReader};
///
/// let schema = ClassSchema::new("Record", 2)
///     .with_field("a", StoredType::Str, 1)
///     .with_field("b", StoredType::Seq(Box::new(StoredType::Str)), 2);
///
/// let mut bytes = Vec::new();
/// schema.encode(&mut bytes).unwrap();
/// assert_eq!(bytes[0], b'S');
///
/// let decoded = ClassSchema::decode(&mut SliceReader::new(&bytes), Limits::new()).unwrap();
/// assert_eq!(decoded, schema);
/// assert_eq!(decoded.field("b").unwrap().version(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSchema {
    class_name: String,
    version: u32,
    fields: Vec<SchemaField>,
}

impl ClassSchema {
    pub fn new(class_name: impl Into<String>, version: u32) -> Self {
        Self {
            class_name: class_name.into(),
            version,
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn with_field(mut self, name: impl Into<String>, ty: StoredType, version: u32) -> Self {
        self.fields.push(SchemaField::new(name, ty, version));
        self
    }

    /// Describes the current layout of a live class.
    pub fn of(class: &'static ClassInfo) -> Self {
        let mut schema = Self::new(class.name(), class.version());
        for level in class.chain() {
            for field in level.own_fields() {
                if field.is_persisted() {
                    schema.fields.push(SchemaField::new(
                        field.name(),
                        field.reflector().stored_type(),
                        level.version(),
                    ));
                }
            }
        }
        schema
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Returns the first field named `name`.
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Writes the schema, root tag included.
    pub fn encode<W: Writer + ?Sized>(&self, writer: &mut W) -> SerialResult<()> {
        writer.write_u8(RootTag::ClassSchema.byte())?;
        writer.write_str(&self.class_name)?;
        writer.write_u32(self.version)?;
        writer.write_len("schema field count", self.fields.len())?;
        for field in &self.fields {
            writer.write_str(&field.name)?;
            field.ty.encode(writer)?;
            writer.write_u32(field.version)?;
        }
        Ok(())
    }

    /// Reads a schema, root tag included.
    pub fn decode<R: Reader + ?Sized>(reader: &mut R, limits: Limits) -> SerialResult<Self> {
        RootTag::expect(reader, RootTag::ClassSchema)?;
        Self::decode_body(reader, limits)
    }

    /// Reads a schema whose root tag has already been consumed.
    pub fn decode_body<R: Reader + ?Sized>(reader: &mut R, limits: Limits) -> SerialResult<Self> {
        let class_name = reader.read_string(limits.max_len)?;
        let version = reader.read_u32()?;
        let count = reader.read_len("schema field count", limits.max_len)?;

        let mut fields = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let name = reader.read_string(limits.max_len)?;
            let ty = StoredType::decode(reader, limits)?;
            let version = reader.read_u32()?;
            fields.push(SchemaField { name, ty, version });
        }

        if class_name.is_empty() {
            return Err(SerialError::invalid_data("class schema without class name"));
        }
        Ok(Self {
            class_name,
            version,
            fields,
        })
    }
}

impl fmt::Display for ClassSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema {} (version {})", self.class_name, self.version)?;
        for field in &self.fields {
            write!(f, "\n  {}: {} (since version {})", field.name, field.ty, field.version)?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ClassSchema;
    use crate::fixtures::{Entity, Player};
    use crate::io::{ErrorKind, Limits, SliceReader};
    use crate::schema::{ScalarType, StoredType};
    use crate::StaticClass;

    #[test]
    fn live_layout_lists_persisted_fields_derived_first() {
        let schema = ClassSchema::of(Player::static_class_info());
        assert_eq!(schema.class_name(), "Player");
        assert_eq!(schema.version(), 2);

        let names: Vec<_> = schema.fields().iter().map(|field| field.name()).collect();
        assert_eq!(names, ["score", "alive", "position", "tags", "history", "id", "name"]);

        let id = schema.field("id").unwrap();
        assert_eq!(id.ty(), &StoredType::Scalar(ScalarType::U64));
        assert_eq!(id.version(), Entity::static_class_info().version());
        assert!(schema.field("scratch").is_none());
    }

    #[test]
    fn rejects_other_root_tags() {
        let err = ClassSchema::decode(&mut SliceReader::new(b"C"), Limits::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn display_lists_fields() {
        let schema = ClassSchema::new("Vec2", 1)
            .with_field("x", StoredType::Scalar(ScalarType::F32), 1)
            .with_field("y", StoredType::Scalar(ScalarType::F32), 1);
        assert_eq!(
            schema.to_string(),
            "schema Vec2 (version 1)\n  x: f32 (since version 1)\n  y: f32 (since version 1)"
        );
    }
}
