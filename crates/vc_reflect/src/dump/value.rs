use core::fmt;

use serde::Serialize;

use crate::schema::ClassSchema;

const INDENT: usize = 2;

// -----------------------------------------------------------------------------
// Value

/// A decoded value.
///
/// The serde form is untagged: scalars and strings map to plain values,
/// sequences to arrays and classes to objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Nothing has been decoded.
    Missing,
    Bool(bool),
    UInt(u64),
    Int(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Seq(Vec<Value>),
    Class(ClassValue),
    Schema(ClassSchema),
}

impl Value {
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[inline]
    pub fn as_class(&self) -> Option<&ClassValue> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }

    #[inline]
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Renders the value on one line, in the text form of the typed
    /// [`to_string`](crate::TypeReflector::to_string) with the
    /// [`STATE`](crate::FieldFlags::STATE) mask.
    ///
    /// ```
    /// use vc_reflect::dump::{ClassValue, Value};
    ///
    /// let mut point = ClassValue::new("Vec2", 1);
    /// point.push("x", Value::F32(1.5));
    /// point.push("y", Value::F32(-2.0));
    ///
    /// let path = Value::Seq(vec![Value::Class(point), Value::Str("end".into())]);
    /// assert_eq!(path.to_compact_string(), r#"[{x="1.5", y="-2"}, end]"#);
    /// ```
    pub fn to_compact_string(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }

    fn write_compact(&self, out: &mut String) {
        match self {
            Self::Missing => out.push('?'),
            Self::Bool(value) => out.push_str(&value.to_string()),
            Self::UInt(value) => out.push_str(&value.to_string()),
            Self::Int(value) => out.push_str(&value.to_string()),
            Self::F32(value) => out.push_str(&value.to_string()),
            Self::F64(value) => out.push_str(&value.to_string()),
            Self::Str(value) => out.push_str(value),
            Self::Seq(items) => {
                out.push('[');
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    item.write_compact(out);
                }
                out.push(']');
            }
            Self::Class(class) => {
                out.push('{');
                for (index, field) in class.fields.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&field.name);
                    out.push_str("=\"");
                    field.value.write_compact(out);
                    out.push('"');
                }
                out.push('}');
            }
            Self::Schema(schema) => out.push_str(&schema.to_string()),
        }
    }

    /// Writes the value as an indented tree, nested lines at `indent + 1`.
    pub(crate) fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = (indent + 1) * INDENT;
        match self {
            Self::Class(class) => {
                write!(f, "{} (version {})", class.class_name, class.version)?;
                if let Some(declared) = &class.declared {
                    write!(f, " as {declared}")?;
                }
                for field in &class.fields {
                    write!(f, "\n{:pad$}{} = ", "", field.name)?;
                    field.value.write_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Seq(items) if items.is_empty() => f.write_str("[]"),
            Self::Seq(items) => {
                write!(f, "[{}]", items.len())?;
                for (index, item) in items.iter().enumerate() {
                    write!(f, "\n{:pad$}[{index}] = ", "")?;
                    item.write_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Str(text) => write!(f, "{text:?}"),
            Self::Schema(schema) => {
                let text = schema.to_string();
                for (index, line) in text.lines().enumerate() {
                    if index > 0 {
                        write!(f, "\n{:width$}", "", width = indent * INDENT)?;
                    }
                    f.write_str(line)?;
                }
                Ok(())
            }
            scalar => f.write_str(&scalar.to_compact_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

// -----------------------------------------------------------------------------
// ClassValue

/// A decoded class instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassValue {
    pub class_name: String,
    pub version: u32,
    /// The declared base class, for polymorphic values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared: Option<String>,
    /// Decoded fields in stored order.
    pub fields: Vec<FieldValue>,
}

impl ClassValue {
    pub fn new(class_name: impl Into<String>, version: u32) -> Self {
        Self {
            class_name: class_name.into(),
            version,
            declared: None,
            fields: Vec::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push(FieldValue {
            name: name.into(),
            value,
        });
    }

    /// Returns the value of the field named `name`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }
}

/// One decoded field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ClassValue, Value};
    use crate::{ClassSchema, StoredType};

    fn shape() -> Value {
        let mut circle = ClassValue::new("Circle", 1);
        circle.declared = Some("Shape".into());
        circle.push("radius", Value::F64(0.5));
        circle.push("label", Value::Str("dot".into()));
        Value::Class(circle)
    }

    #[test]
    fn tree_form() {
        let mut scene = ClassValue::new("Scene", 1);
        scene.push("title", Value::Str("demo".into()));
        scene.push("focus", shape());
        scene.push("ids", Value::Seq(vec![Value::UInt(1), Value::Int(-2)]));
        scene.push("empty", Value::Seq(Vec::new()));

        assert_eq!(
            Value::Class(scene).to_string(),
            "Scene (version 1)\n\
             \x20 title = \"demo\"\n\
             \x20 focus = Circle (version 1) as Shape\n\
             \x20   radius = 0.5\n\
             \x20   label = \"dot\"\n\
             \x20 ids = [2]\n\
             \x20   [0] = 1\n\
             \x20   [1] = -2\n\
             \x20 empty = []"
        );
    }

    #[test]
    fn compact_form_ignores_the_declared_class() {
        assert_eq!(shape().to_compact_string(), "{radius=\"0.5\", label=\"dot\"}");
        assert_eq!(Value::Bool(false).to_compact_string(), "false");
        assert_eq!(Value::Missing.to_compact_string(), "?");
    }

    #[test]
    fn serde_form() {
        let json = serde_json::to_value(shape()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "class_name": "Circle",
                "version": 1,
                "declared": "Shape",
                "fields": [
                    { "name": "radius", "value": 0.5 },
                    { "name": "label", "value": "dot" },
                ],
            })
        );

        let schema = ClassSchema::new("Tag", 3).with_field("names", StoredType::Seq(Box::new(StoredType::Str)), 2);
        let json = serde_json::to_value(Value::Schema(schema)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "class_name": "Tag",
                "version": 3,
                "fields": [{ "name": "names", "ty": "seq<str>", "version": 2 }],
            })
        );
    }
}
