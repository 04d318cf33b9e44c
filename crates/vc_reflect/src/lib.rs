#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Macros expand to `$crate` paths, doctests name the crate directly.
extern crate self as vc_reflect;

// -----------------------------------------------------------------------------
// Modules

mod describe;

pub mod class;
pub mod dump;
pub mod field;
pub mod reflector;
pub mod registry;
pub mod schema;
pub mod serial;

#[cfg(test)]
mod fixtures;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use describe::{describe, reflect_from_string, reflect_to_string};

pub use class::{Class, ClassInfo, Poly, StaticClass};
pub use dump::{Dump, DumpEngine, Value};
pub use field::{FieldDescriptor, FieldFlags, ReflectedFields, ReflectedFieldsMut};
pub use reflector::{Reflected, TypeReflector};
pub use registry::{TypeRegistry, TypeRegistryArc};
pub use schema::{
    ClassSchema, DirSchemaProvider, MemorySchemaProvider, SchemaProvider, StoredType,
};
pub use serial::{Archive, RootTag};

/// The I/O layer this crate is built on.
pub use vc_io as io;
