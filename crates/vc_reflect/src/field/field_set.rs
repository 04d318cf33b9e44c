use core::any::Any;
use core::fmt;

use vc_io::{SerialError, SerialResult};

use crate::class::ClassInfo;
use crate::field::{FieldAccessor, FieldAccessorMut, FieldDescriptor};

// -----------------------------------------------------------------------------
// BaseLink

/// Connects a derived class to the base class value it embeds.
///
/// The upcast functions project an instance of the derived class onto its
/// base part, so the base's fields can be reached through the same
/// accessors as for a plain base instance.
#[derive(Clone, Copy)]
pub struct BaseLink {
    class: fn() -> &'static ClassInfo,
    upcast: FieldAccessor,
    upcast_mut: FieldAccessorMut,
}

impl BaseLink {
    #[inline]
    pub const fn new(
        class: fn() -> &'static ClassInfo,
        upcast: FieldAccessor,
        upcast_mut: FieldAccessorMut,
    ) -> Self {
        Self {
            class,
            upcast,
            upcast_mut,
        }
    }

    /// Returns the base class.
    #[inline]
    pub fn class(&self) -> &'static ClassInfo {
        (self.class)()
    }

    /// Projects an instance of `derived` onto its base part.
    pub fn upcast<'a>(&self, derived: &ClassInfo, instance: &'a dyn Any) -> SerialResult<&'a dyn Any> {
        (self.upcast)(instance).ok_or_else(|| self.foreign_instance(derived))
    }

    /// Mutable counterpart of [`upcast`](Self::upcast).
    pub fn upcast_mut<'a>(
        &self,
        derived: &ClassInfo,
        instance: &'a mut dyn Any,
    ) -> SerialResult<&'a mut dyn Any> {
        match (self.upcast_mut)(instance) {
            Some(base) => Ok(base),
            None => Err(self.foreign_instance(derived)),
        }
    }

    #[cold]
    fn foreign_instance(&self, derived: &ClassInfo) -> SerialError {
        SerialError::type_mismatch(
            format!("an instance of `{}`", derived.name()),
            "an instance of another class",
        )
    }
}

impl fmt::Debug for BaseLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BaseLink").field(&self.class().name()).finish()
    }
}

// -----------------------------------------------------------------------------
// FieldSet

/// The fields one class level declares, plus the link to its base.
#[derive(Debug, Clone, Copy)]
pub struct FieldSet {
    own: &'static [FieldDescriptor],
    base: Option<BaseLink>,
}

impl FieldSet {
    #[inline]
    pub const fn new(own: &'static [FieldDescriptor]) -> Self {
        Self { own, base: None }
    }

    #[inline]
    pub const fn with_base(mut self, base: BaseLink) -> Self {
        self.base = Some(base);
        self
    }

    /// Returns the fields declared on this level only.
    #[inline]
    pub const fn own(&self) -> &'static [FieldDescriptor] {
        self.own
    }

    #[inline]
    pub const fn base(&self) -> Option<&BaseLink> {
        self.base.as_ref()
    }
}
