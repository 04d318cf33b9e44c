use core::fmt;

use uuid::Uuid;

use crate::field::{BaseLink, FieldDescriptor, FieldSet};

// -----------------------------------------------------------------------------
// ClassInfo

/// Static description of a reflected class.
///
/// A class has a stable name, a version that must be bumped whenever its
/// persisted layout changes, an optional UUID and the fields it declares.
/// The fields of a derived class are looked up on its own level first and
/// then along the [`base`](ClassInfo::base) chain.
///
/// `ClassInfo` is built in `const` context and kept in a `static`, see
/// [`impl_class!`](crate::impl_class).
#[derive(Clone, Copy)]
pub struct ClassInfo {
    name: &'static str,
    version: u32,
    uuid: Option<Uuid>,
    fields: FieldSet,
}

impl ClassInfo {
    #[inline]
    pub const fn new(name: &'static str, version: u32, fields: FieldSet) -> Self {
        Self {
            name,
            version,
            uuid: None,
            fields,
        }
    }

    #[inline]
    pub const fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    #[inline]
    pub const fn with_base(mut self, base: BaseLink) -> Self {
        self.fields = self.fields.with_base(base);
        self
    }

    /// The stable class name written to archives.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub const fn uuid(&self) -> Option<Uuid> {
        self.uuid
    }

    #[inline]
    pub const fn field_set(&self) -> &FieldSet {
        &self.fields
    }

    /// Returns the fields declared on this level, without base fields.
    #[inline]
    pub const fn own_fields(&self) -> &'static [FieldDescriptor] {
        self.fields.own()
    }

    /// Returns the direct base class, if any.
    #[inline]
    pub fn base(&self) -> Option<&'static ClassInfo> {
        self.fields.base().map(BaseLink::class)
    }

    /// Iterates over this class and all its bases, most derived first.
    #[inline]
    pub fn chain(&'static self) -> ClassChain {
        ClassChain { next: Some(self) }
    }

    /// Returns `true` if `self` is `other` or has `other` somewhere along its
    /// base chain. Classes are compared by name.
    ///
    /// ```
    /// # use vc_reflect::{impl_class, StaticClass};
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
    /// let circle = Circle::static_class_info();
    /// let shape = Shape::static_class_info();
    /// assert!(circle.derives_from(shape));
    /// assert!(!shape.derives_from(circle));
    /// ```
    pub fn derives_from(&self, other: &ClassInfo) -> bool {
        if self.name == other.name {
            return true;
        }
        let mut level = self.base();
        while let Some(class) = level {
            if class.name == other.name {
                return true;
            }
            level = class.base();
        }
        false
    }

    /// Number of fields across the whole base chain.
    pub fn field_count(&self) -> usize {
        let mut count = self.fields.own().len();
        let mut level = self.base();
        while let Some(class) = level {
            count += class.fields.own().len();
            level = class.base();
        }
        count
    }

    /// Flat index of the first field named `name`, most derived level first.
    #[inline]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.nth_field_index(name, 0)
    }

    /// Flat index of the `nth` field named `name`, counting from zero in
    /// traversal order.
    ///
    /// A base class may declare a field with the name of a derived one, so
    /// the same name can appear once per level.
    pub fn nth_field_index(&self, name: &str, nth: usize) -> Option<usize> {
        let mut offset = 0;
        let mut remaining = nth;
        let mut level = Some(self);
        while let Some(class) = level {
            let own = class.fields.own();
            for (index, field) in own.iter().enumerate() {
                if field.name() != name {
                    continue;
                }
                if remaining == 0 {
                    return Some(offset + index);
                }
                remaining -= 1;
            }
            offset += own.len();
            level = class.base();
        }
        None
    }

    /// Returns the field at flat `index` and the class level declaring it.
    pub fn field(&'static self, index: usize) -> Option<(&'static ClassInfo, &'static FieldDescriptor)> {
        let mut index = index;
        for class in self.chain() {
            let own = class.fields.own();
            if let Some(field) = own.get(index) {
                return Some((class, field));
            }
            index -= own.len();
        }
        None
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("uuid", &self.uuid)
            .field("fields", &self.fields.own())
            .field("base", &self.base().map(ClassInfo::name))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ClassChain

/// Iterator over a class and its bases, see [`ClassInfo::chain`].
#[derive(Debug, Clone)]
pub struct ClassChain {
    next: Option<&'static ClassInfo>,
}

impl Iterator for ClassChain {
    type Item = &'static ClassInfo;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.base();
        Some(current)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::StaticClass;
    use crate::fixtures::StackV2;

    #[test]
    fn shared_field_names_are_indexed_per_occurrence() {
        let class = StackV2::static_class_info();
        assert_eq!(class.field_index("v"), Some(0));
        assert_eq!(class.nth_field_index("v", 1), Some(2));
        assert_eq!(class.nth_field_index("v", 2), None);
        assert_eq!(class.nth_field_index("w", 0), Some(1));
    }
}
