//! Writing and reading reflected values.
//!
//! [`Archive`] is the entry point. It binds a [`TypeRegistry`](crate::TypeRegistry),
//! an optional [`SchemaProvider`](crate::SchemaProvider), an error handler and
//! decoding [`Limits`](vc_io::Limits), and runs top-level operations over a
//! [`Writer`](vc_io::Writer) or [`Reader`](vc_io::Reader).
//!
//! # Wire format
//!
//! - A class instance is its header, the class name and a `u32` version,
//!   followed by the persisted fields of each class level, most derived
//!   level first.
//! - A [`Poly<B>`](crate::Poly) value is the header of `B`, the header of
//!   the dynamic class and the persisted fields of the dynamic class.
//! - A top-level stream starts with a [`RootTag`] byte: `C` for a class
//!   instance, `S` for a [`ClassSchema`](crate::ClassSchema).
//!
//! When the stored version of a class differs from the live one, the stored
//! layout is loaded from the schema provider and fields are matched by name:
//! stored fields unknown to the live class are skipped, live fields absent
//! from the stored layout keep their value unless they are
//! [`MANDATORY`](crate::FieldFlags::MANDATORY).

// -----------------------------------------------------------------------------
// Modules

mod archive;
mod context;
mod header;
mod manager;
mod skip;

// -----------------------------------------------------------------------------
// Exports

pub use archive::Archive;
pub use context::{ReadContext, WriteContext};
pub use header::{ClassHeader, RootTag};
pub use manager::SerializationManager;
