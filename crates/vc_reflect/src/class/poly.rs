use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use crate::class::{Class, ClassInfo, StaticClass};

/// An owned object of class `B` or of any class derived from it.
///
/// Fields of type `Poly<B>` are persisted with both their declared and their
/// dynamic class, and restored by constructing the dynamic class through the
/// [`TypeRegistry`](crate::TypeRegistry).
///
/// ```
/// # use vc_reflect::{impl_class, Poly};
/// #[derive(Default)]
/// struct Shape { label: String }
/// impl_class! { Shape as "Shape" version 1 {} fields { label: String [STATE] } }
///
/// #[derive(Default)]
/// struct Circle { base: Shape, radius: f64 }
/// impl_class! {
///     Circle as "Circle" version 1 { base: Shape => base, }
///     fields { radius: f64 [STATE] }
/// }
///
/// let shape = Poly::<Shape>::new(Circle { radius: 2.0, ..Default::default() }).unwrap();
/// assert_eq!(shape.class_info().name(), "Circle");
/// assert_eq!(shape.downcast_ref::<Circle>().unwrap().radius, 2.0);
///
/// // A `Shape` is not a `Circle`.
/// assert!(Poly::<Circle>::new(Shape::default()).is_none());
/// ```
pub struct Poly<B: StaticClass> {
    value: Box<dyn Class>,
    _base: PhantomData<fn() -> B>,
}

impl<B: StaticClass> Poly<B> {
    /// Wraps `value`, or returns `None` if its class does not derive from `B`.
    #[inline]
    pub fn new<C: Class>(value: C) -> Option<Self> {
        Self::from_box(Box::new(value))
    }

    /// Wraps a boxed object, or returns `None` if its class does not derive
    /// from `B`.
    pub fn from_box(value: Box<dyn Class>) -> Option<Self> {
        if value.class_info().derives_from(B::static_class_info()) {
            Some(Self {
                value,
                _base: PhantomData,
            })
        } else {
            None
        }
    }

    /// The class of the held object.
    #[inline]
    pub fn class_info(&self) -> &'static ClassInfo {
        self.value.class_info()
    }

    #[inline]
    pub fn get(&self) -> &dyn Class {
        &*self.value
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut dyn Class {
        &mut *self.value
    }

    pub fn downcast_ref<C: Class>(&self) -> Option<&C> {
        let any: &dyn Any = &*self.value;
        any.downcast_ref()
    }

    pub fn downcast_mut<C: Class>(&mut self) -> Option<&mut C> {
        let any: &mut dyn Any = &mut *self.value;
        any.downcast_mut()
    }

    #[inline]
    pub fn into_box(self) -> Box<dyn Class> {
        self.value
    }
}

impl<B: StaticClass> Default for Poly<B> {
    /// Holds a default-constructed `B`.
    fn default() -> Self {
        Self {
            value: Box::new(B::default()),
            _base: PhantomData,
        }
    }
}

impl<B: StaticClass> fmt::Debug for Poly<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Poly").field(&self.class_info().name()).finish()
    }
}
