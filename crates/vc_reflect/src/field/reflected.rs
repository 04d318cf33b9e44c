use core::any::Any;

use vc_io::{SerialError, SerialResult};

use crate::class::ClassInfo;
use crate::field::{FieldDescriptor, FieldFlags};
use crate::reflector::TypeReflector;

#[cold]
fn out_of_range(class: &ClassInfo, index: usize) -> SerialError {
    SerialError::invalid_data(format!(
        "field index {index} out of range for class `{}` with {} fields",
        class.name(),
        class.field_count(),
    ))
}

// -----------------------------------------------------------------------------
// ReflectedField

/// One field of a live instance, together with its descriptor.
#[derive(Clone, Copy)]
pub struct ReflectedField<'a> {
    descriptor: &'static FieldDescriptor,
    owner: &'static ClassInfo,
    value: &'a dyn Any,
}

impl<'a> ReflectedField<'a> {
    #[inline]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    /// The class level declaring this field.
    #[inline]
    pub fn owner(&self) -> &'static ClassInfo {
        self.owner
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.descriptor.name()
    }

    #[inline]
    pub fn flags(&self) -> FieldFlags {
        self.descriptor.flags()
    }

    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.descriptor.is_persisted()
    }

    #[inline]
    pub fn reflector(&self) -> &'static dyn TypeReflector {
        self.descriptor.reflector()
    }

    #[inline]
    pub fn value(&self) -> &'a dyn Any {
        self.value
    }

    /// The declared type name of the field.
    #[inline]
    pub fn static_type_name(&self) -> &'static str {
        self.reflector().static_type_name()
    }

    /// The runtime type name, which differs from the declared one for
    /// polymorphic fields holding a derived class.
    #[inline]
    pub fn type_name(&self) -> &'a str {
        self.reflector().type_name(self.value)
    }

    #[inline]
    pub fn is_polymorphic(&self) -> bool {
        self.reflector().is_polymorphic()
    }

    /// Renders the value as text, nested classes filtered by `mask`.
    #[inline]
    pub fn to_string(&self, mask: FieldFlags) -> SerialResult<String> {
        self.reflector().to_string(self.value, mask)
    }
}

// -----------------------------------------------------------------------------
// ReflectedFields

/// Read access to all fields of one instance, base fields included.
///
/// Fields are indexed flat: the instance class's own fields come first, then
/// those of its base, and so on down the chain.
///
/// ```
/// # use vc_reflect::{impl_class, ReflectedFields, FieldFlags};
/// #[derive(Default)]
/// struct Entity { id: u64 }
/// impl_class! { Entity as "Entity" version 1 {} fields { id: u64 [STATE] } }
///
/// #[derive(Default)]
/// struct Player { base: Entity, score: i32 }
/// impl_class! {
///     Player as "Player" version 1 { base: Entity => base, }
///     fields { score: i32 [STATE] }
/// }
///
/// let player = Player { base: Entity { id: 7 }, score: 3 };
/// let fields = ReflectedFields::of(&player);
///
/// assert_eq!(fields.count(), 2);
/// let names: Vec<_> = fields.iter().map(|f| f.unwrap().name()).collect();
/// assert_eq!(names, ["score", "id"]);
///
/// let id = fields.field(1).unwrap();
/// assert_eq!(id.owner().name(), "Entity");
/// assert_eq!(id.to_string(FieldFlags::STATE).unwrap(), "7");
/// ```
#[derive(Clone, Copy)]
pub struct ReflectedFields<'a> {
    class: &'static ClassInfo,
    instance: &'a dyn Any,
}

impl<'a> ReflectedFields<'a> {
    /// Views `instance` as an instance of `class`.
    ///
    /// The instance is checked lazily, on field access.
    #[inline]
    pub fn new(class: &'static ClassInfo, instance: &'a dyn Any) -> Self {
        Self { class, instance }
    }

    /// Views a class instance through its own [`ClassInfo`].
    #[inline]
    pub fn of(instance: &'a dyn crate::Class) -> Self {
        Self::new(instance.class_info(), instance)
    }

    #[inline]
    pub fn class(&self) -> &'static ClassInfo {
        self.class
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.class.field_count()
    }

    /// Returns the field at flat `index`.
    ///
    /// Fails with [`SerialError::InvalidData`] if the index is out of range
    /// and with [`SerialError::TypeMismatch`] if the instance is not of the
    /// viewed class.
    pub fn field(&self, index: usize) -> SerialResult<ReflectedField<'a>> {
        let mut remaining = index;
        let mut instance = self.instance;
        for class in self.class.chain() {
            let own = class.own_fields();
            if let Some(descriptor) = own.get(remaining) {
                return Ok(ReflectedField {
                    descriptor,
                    owner: class,
                    value: descriptor.get(instance)?,
                });
            }
            remaining -= own.len();
            if let Some(base) = class.field_set().base() {
                instance = base.upcast(class, instance)?;
            }
        }
        Err(out_of_range(self.class, index))
    }

    /// Returns the first field named `name`, most derived level first.
    pub fn field_by_name(&self, name: &str) -> SerialResult<Option<ReflectedField<'a>>> {
        match self.class.field_index(name) {
            Some(index) => self.field(index).map(Some),
            None => Ok(None),
        }
    }

    /// Iterates over all fields in flat order.
    #[inline]
    pub fn iter(&self) -> ReflectedFieldIter<'a> {
        ReflectedFieldIter {
            level: Some(self.class),
            instance: self.instance,
            index: 0,
        }
    }
}

impl<'a> IntoIterator for &ReflectedFields<'a> {
    type Item = SerialResult<ReflectedField<'a>>;
    type IntoIter = ReflectedFieldIter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// -----------------------------------------------------------------------------
// ReflectedFieldIter

/// Iterator over the fields of an instance, see [`ReflectedFields::iter`].
///
/// Stops after the first error.
pub struct ReflectedFieldIter<'a> {
    level: Option<&'static ClassInfo>,
    instance: &'a dyn Any,
    index: usize,
}

impl<'a> Iterator for ReflectedFieldIter<'a> {
    type Item = SerialResult<ReflectedField<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let class = self.level?;
            if let Some(descriptor) = class.own_fields().get(self.index) {
                self.index += 1;
                let field = descriptor.get(self.instance).map(|value| ReflectedField {
                    descriptor,
                    owner: class,
                    value,
                });
                if field.is_err() {
                    self.level = None;
                }
                return Some(field);
            }

            self.index = 0;
            self.level = None;
            let base = class.field_set().base()?;
            match base.upcast(class, self.instance) {
                Ok(instance) => {
                    self.instance = instance;
                    self.level = Some(base.class());
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

// -----------------------------------------------------------------------------
// ReflectedFieldMut

/// Mutable counterpart of [`ReflectedField`].
pub struct ReflectedFieldMut<'a> {
    descriptor: &'static FieldDescriptor,
    owner: &'static ClassInfo,
    value: &'a mut dyn Any,
}

impl<'a> ReflectedFieldMut<'a> {
    #[inline]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    #[inline]
    pub fn owner(&self) -> &'static ClassInfo {
        self.owner
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.descriptor.name()
    }

    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.descriptor.is_persisted()
    }

    #[inline]
    pub fn reflector(&self) -> &'static dyn TypeReflector {
        self.descriptor.reflector()
    }

    #[inline]
    pub fn value(&self) -> &dyn Any {
        &*self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut dyn Any {
        &mut *self.value
    }

    #[inline]
    pub fn into_value(self) -> &'a mut dyn Any {
        self.value
    }

    /// Parses `text` into the field, see [`TypeReflector::set_from_string`].
    #[inline]
    pub fn set_from_string(&mut self, text: &str) -> SerialResult<()> {
        self.descriptor.reflector().set_from_string(text, &mut *self.value)
    }
}

// -----------------------------------------------------------------------------
// ReflectedFieldsMut

/// Mutable access to all fields of one instance, see [`ReflectedFields`].
pub struct ReflectedFieldsMut<'a> {
    class: &'static ClassInfo,
    instance: &'a mut dyn Any,
}

impl<'a> ReflectedFieldsMut<'a> {
    #[inline]
    pub fn new(class: &'static ClassInfo, instance: &'a mut dyn Any) -> Self {
        Self { class, instance }
    }

    #[inline]
    pub fn of(instance: &'a mut dyn crate::Class) -> Self {
        let class = instance.class_info();
        Self::new(class, instance)
    }

    #[inline]
    pub fn class(&self) -> &'static ClassInfo {
        self.class
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.class.field_count()
    }

    /// Flat index of the first field named `name`.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.class.field_index(name)
    }

    /// Flat index of the `nth` field named `name`, see
    /// [`ClassInfo::nth_field_index`].
    #[inline]
    pub fn nth_index_of(&self, name: &str, nth: usize) -> Option<usize> {
        self.class.nth_field_index(name, nth)
    }

    #[inline]
    pub fn as_fields(&self) -> ReflectedFields<'_> {
        ReflectedFields::new(self.class, &*self.instance)
    }

    /// Returns the field at flat `index`, see [`ReflectedFields::field`].
    pub fn field_mut(&mut self, index: usize) -> SerialResult<ReflectedFieldMut<'_>> {
        let mut remaining = index;
        let mut instance: &mut dyn Any = &mut *self.instance;
        for class in self.class.chain() {
            let own = class.own_fields();
            if let Some(descriptor) = own.get(remaining) {
                return Ok(ReflectedFieldMut {
                    descriptor,
                    owner: class,
                    value: descriptor.get_mut(instance)?,
                });
            }
            remaining -= own.len();
            if let Some(base) = class.field_set().base() {
                instance = base.upcast_mut(class, instance)?;
            }
        }
        Err(out_of_range(self.class, index))
    }

    /// Returns the first field named `name`, most derived level first.
    pub fn field_by_name_mut(&mut self, name: &str) -> SerialResult<Option<ReflectedFieldMut<'_>>> {
        match self.class.field_index(name) {
            Some(index) => self.field_mut(index).map(Some),
            None => Ok(None),
        }
    }
}
