//! Name-based lookup of reflected classes.

// -----------------------------------------------------------------------------
// Modules

mod class_meta;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use class_meta::ClassMeta;
pub use type_registry::{TypeRegistry, TypeRegistryArc};

// -----------------------------------------------------------------------------
// Auto registration

/// A registration submitted by `impl_class!` with `auto_register: true`.
#[cfg(feature = "auto_register")]
#[doc(hidden)]
pub struct AutoRegister(pub fn(&mut TypeRegistry));

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegister);

// Tells `TypeRegistry::auto_register` whether submissions run on this platform.
#[cfg(feature = "auto_register")]
inventory::submit! {
    AutoRegister(TypeRegistry::mark_auto_registered)
}
