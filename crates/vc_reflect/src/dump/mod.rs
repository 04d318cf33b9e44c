//! Decoding stored data without compiled type knowledge.
//!
//! The [`DumpEngine`] walks a top-level stream using nothing but the schemas
//! of a [`SchemaProvider`](crate::SchemaProvider): each stored field's
//! [`StoredType`](crate::StoredType) decides how many bytes it takes and how
//! to decode them. The result is a [`Value`] tree, kept even when decoding
//! stops early.

// -----------------------------------------------------------------------------
// Modules

mod engine;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use engine::{Dump, DumpEngine};
pub use value::{ClassValue, FieldValue, Value};
