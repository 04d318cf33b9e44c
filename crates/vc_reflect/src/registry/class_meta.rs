use core::any::TypeId;
use core::fmt;

use crate::class::{Class, ClassInfo, StaticClass};
use crate::reflector::TypeReflector;

fn construct<C: StaticClass>() -> Box<dyn Class> {
    Box::new(C::default())
}

/// What the registry knows about one class.
#[derive(Clone, Copy)]
pub struct ClassMeta {
    info: &'static ClassInfo,
    type_id: TypeId,
    reflector: &'static dyn TypeReflector,
    construct: fn() -> Box<dyn Class>,
}

impl ClassMeta {
    pub fn of<C: StaticClass>() -> Self {
        Self {
            info: C::static_class_info(),
            type_id: TypeId::of::<C>(),
            reflector: C::reflector(),
            construct: construct::<C>,
        }
    }

    #[inline]
    pub fn info(&self) -> &'static ClassInfo {
        self.info
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn reflector(&self) -> &'static dyn TypeReflector {
        self.reflector
    }

    /// Creates a default instance of the class.
    #[inline]
    pub fn construct(&self) -> Box<dyn Class> {
        (self.construct)()
    }
}

impl fmt::Debug for ClassMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMeta")
            .field("name", &self.info.name())
            .field("version", &self.info.version())
            .field("type_id", &self.type_id)
            .finish()
    }
}
