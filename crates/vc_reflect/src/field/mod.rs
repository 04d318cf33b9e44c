//! Per-field metadata and reflected access to the fields of a live instance.
//!
//! A class declares its own fields as a static slice of [`FieldDescriptor`]s
//! plus an optional [`BaseLink`] to its base class. [`ReflectedFields`] walks
//! that chain for one instance: the class's own fields come first, followed by
//! the fields of its base, then the base's base, and so on.

// -----------------------------------------------------------------------------
// Modules

mod descriptor;
mod field_set;
mod flags;
mod reflected;

// -----------------------------------------------------------------------------
// Exports

pub use descriptor::{FieldAccessor, FieldAccessorMut, FieldDescriptor, ReflectorFn};
pub use field_set::{BaseLink, FieldSet};
pub use flags::FieldFlags;
pub use reflected::{
    ReflectedField, ReflectedFieldIter, ReflectedFieldMut, ReflectedFields, ReflectedFieldsMut,
};
