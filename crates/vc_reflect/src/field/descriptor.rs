use core::any::Any;
use core::fmt;

use vc_io::{SerialError, SerialResult};

use crate::field::FieldFlags;
use crate::reflector::TypeReflector;

/// Returns the reflector of a field's declared type.
pub type ReflectorFn = fn() -> &'static dyn TypeReflector;

/// Projects an instance of the owning class onto one of its fields.
///
/// Returns `None` if the instance is not of the owning class.
pub type FieldAccessor = fn(&dyn Any) -> Option<&dyn Any>;

/// Mutable counterpart of [`FieldAccessor`].
pub type FieldAccessorMut = fn(&mut dyn Any) -> Option<&mut dyn Any>;

// -----------------------------------------------------------------------------
// FieldDescriptor

/// Static metadata of one declared field.
///
/// Descriptors are built in `const` context, usually by
/// [`impl_class!`](crate::impl_class), and live in a `&'static` slice owned by
/// the class.
///
/// ```
/// use core::any::Any;
/// use vc_reflect::{FieldDescriptor, FieldFlags, Reflected};
///
/// struct Config { port: u16 }
///
/// const PORT: FieldDescriptor = FieldDescriptor::new(
///     "port",
///     <u16 as Reflected>::reflector,
///     |this: &dyn Any| this.downcast_ref::<Config>().map(|c| &c.port as &dyn Any),
///     |this: &mut dyn Any| this.downcast_mut::<Config>().map(|c| &mut c.port as &mut dyn Any),
/// )
/// .with_flags(FieldFlags::CONFIG)
/// .with_params("-p")
/// .with_description("Listening port");
///
/// let config = Config { port: 8080 };
/// let port = PORT.get(&config).unwrap();
/// assert_eq!(port.downcast_ref::<u16>(), Some(&8080));
/// assert_eq!(PORT.reflector().static_type_name(), "u16");
/// ```
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    name: &'static str,
    params: &'static str,
    description: &'static str,
    flags: FieldFlags,
    reflector: ReflectorFn,
    get: FieldAccessor,
    get_mut: FieldAccessorMut,
}

impl FieldDescriptor {
    /// Creates a [`STATE`](FieldFlags::STATE) field without params or description.
    #[inline]
    pub const fn new(
        name: &'static str,
        reflector: ReflectorFn,
        get: FieldAccessor,
        get_mut: FieldAccessorMut,
    ) -> Self {
        Self {
            name,
            params: "",
            description: "",
            flags: FieldFlags::STATE,
            reflector,
            get,
            get_mut,
        }
    }

    #[inline]
    pub const fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the free-form parameter string, e.g. a command-line switch.
    #[inline]
    pub const fn with_params(mut self, params: &'static str) -> Self {
        self.params = params;
        self
    }

    #[inline]
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn params(&self) -> &'static str {
        self.params
    }

    #[inline]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    #[inline]
    pub const fn flags(&self) -> FieldFlags {
        self.flags
    }

    /// Returns `true` for [`STATE`](FieldFlags::STATE) fields.
    #[inline]
    pub const fn is_persisted(&self) -> bool {
        self.flags.is_persisted()
    }

    /// Returns the reflector of the declared type.
    #[inline]
    pub fn reflector(&self) -> &'static dyn TypeReflector {
        (self.reflector)()
    }

    /// Projects `instance` onto this field.
    ///
    /// Fails with [`SerialError::TypeMismatch`] if `instance` is not of the
    /// class that declares the field.
    pub fn get<'a>(&self, instance: &'a dyn Any) -> SerialResult<&'a dyn Any> {
        (self.get)(instance).ok_or_else(|| self.foreign_instance())
    }

    /// Mutable counterpart of [`get`](Self::get).
    pub fn get_mut<'a>(&self, instance: &'a mut dyn Any) -> SerialResult<&'a mut dyn Any> {
        match (self.get_mut)(instance) {
            Some(value) => Ok(value),
            None => Err(self.foreign_instance()),
        }
    }

    #[cold]
    fn foreign_instance(&self) -> SerialError {
        SerialError::type_mismatch(
            format!("an instance declaring field `{}`", self.name),
            "an instance of another class",
        )
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("type", &self.reflector().static_type_name())
            .field("flags", &self.flags)
            .field("params", &self.params)
            .field("description", &self.description)
            .finish()
    }
}
