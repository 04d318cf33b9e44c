//! Persisted class layouts.
//!
//! A [`ClassSchema`] records, for one version of a class, the persisted
//! fields in stream order together with a [`StoredType`] descriptor of each.
//! Readers use schemas to map an older or newer stored layout onto the live
//! class, and to skip or dump values whose types they do not know.
//!
//! Schemas are obtained through a [`SchemaProvider`]. Two are provided:
//! [`DirSchemaProvider`] keeps one `<ClassName>.class_schema` file per class,
//! [`MemorySchemaProvider`] keeps encoded schemas in memory.

// -----------------------------------------------------------------------------
// Modules

mod class_schema;
mod provider;
mod stored_type;

// -----------------------------------------------------------------------------
// Exports

pub use class_schema::{ClassSchema, SchemaField};
pub use provider::{
    DirSchemaProvider, MemorySchemaProvider, SCHEMA_EXTENSION, SchemaCache, SchemaProvider,
    load_class_schema,
};
pub use stored_type::{ScalarType, StoredType};
