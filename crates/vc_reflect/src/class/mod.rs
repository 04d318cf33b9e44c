//! Reflected classes: static descriptions, the class traits and polymorphic
//! ownership.

// -----------------------------------------------------------------------------
// Modules

mod class_info;
mod macros;
mod poly;

// -----------------------------------------------------------------------------
// Exports

pub use class_info::{ClassChain, ClassInfo};
pub use poly::Poly;

use core::any::Any;
use core::fmt;

use crate::reflector::Reflected;

// -----------------------------------------------------------------------------
// Class

/// An object whose class is known at runtime.
///
/// Usually implemented through [`impl_class!`](crate::impl_class).
/// `dyn Class` upcasts to `dyn Any`, which is how reflectors and field
/// accessors reach the concrete type.
pub trait Class: Any + Send + Sync + 'static {
    /// Returns the class of the concrete object.
    fn class_info(&self) -> &'static ClassInfo;
}

impl fmt::Debug for dyn Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Class<{}>", self.class_info().name())
    }
}

// -----------------------------------------------------------------------------
// StaticClass

/// A [`Class`] whose [`ClassInfo`] is known at compile time and which can be
/// default-constructed by the registry.
pub trait StaticClass: Class + Reflected + Default {
    fn static_class_info() -> &'static ClassInfo;
}
