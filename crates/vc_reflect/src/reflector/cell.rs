use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use foldhash::fast::FixedState;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::reflector::TypeReflector;

// -----------------------------------------------------------------------------
// ReflectorCell

/// Lazily initialized reflector singleton for a non-generic type.
///
/// ```
/// use core::any::Any;
/// use vc_reflect::{FieldFlags, Reflected, StoredType, TypeReflector};
/// use vc_reflect::io::{SerialError, SerialResult};
/// use vc_reflect::reflector::ReflectorCell;
/// use vc_reflect::serial::{ReadContext, WriteContext};
///
/// struct Unit;
/// struct UnitReflector;
///
/// impl TypeReflector for UnitReflector {
///     fn static_type_name(&self) -> &str { "Unit" }
///     fn stored_type(&self) -> StoredType { StoredType::Class("Unit".into()) }
///     fn serialize(&self, _: &mut WriteContext<'_>, _: &dyn Any) -> SerialResult<()> { Ok(()) }
///     fn deserialize(&self, _: &mut ReadContext<'_>, _: &mut dyn Any) -> SerialResult<()> { Ok(()) }
///     fn set_from_string(&self, _: &str, _: &mut dyn Any) -> SerialResult<()> {
///         Err(SerialError::not_implemented("UnitReflector::set_from_string"))
///     }
///     fn to_string(&self, _: &dyn Any, _: FieldFlags) -> SerialResult<String> { Ok("()".into()) }
/// }
///
/// impl Reflected for Unit {
///     fn reflector() -> &'static dyn TypeReflector {
///         static CELL: ReflectorCell<UnitReflector> = ReflectorCell::new();
///         CELL.get_or_init(|| UnitReflector)
///     }
/// }
///
/// assert!(core::ptr::addr_eq(Unit::reflector(), Unit::reflector()));
/// ```
pub struct ReflectorCell<R: TypeReflector>(OnceLock<R>);

impl<R: TypeReflector> ReflectorCell<R> {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the reflector, initializing it with `f` on first access.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> R) -> &R {
        self.0.get_or_init(f)
    }
}

// -----------------------------------------------------------------------------
// GenericReflectorCell

/// Reflector singletons for the instantiations of a generic type.
///
/// A `static` inside a generic function is shared by all instantiations, so
/// the cell keys the reflectors by [`TypeId`]. Each reflector is leaked once
/// and lives for the rest of the program.
///
/// ```
/// # use vc_reflect::{Reflected, TypeReflector};
/// // `Vec<T>` is implemented this way.
/// let a = <Vec<u32>>::reflector();
/// let b = <Vec<u32>>::reflector();
/// assert!(core::ptr::addr_eq(a, b));
/// assert_eq!(a.static_type_name(), "Vec<u32>");
/// assert_eq!(<Vec<bool>>::reflector().static_type_name(), "Vec<bool>");
/// ```
pub struct GenericReflectorCell(RwLock<HashMap<TypeId, &'static dyn TypeReflector, FixedState>>);

impl GenericReflectorCell {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(HashMap::with_hasher(FixedState::with_seed(0))))
    }

    /// Returns the reflector for `G`, creating it with `f` on first access.
    ///
    /// `f` runs without the lock held, so it may look up other reflectors of
    /// this cell. If two threads race, the first insertion wins and the other
    /// reflector is dropped.
    pub fn get_or_insert<G: Any>(
        &self,
        f: impl FnOnce() -> Box<dyn TypeReflector>,
    ) -> &'static dyn TypeReflector {
        let type_id = TypeId::of::<G>();
        match self.get_by_type_id(type_id) {
            Some(reflector) => reflector,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&'static dyn TypeReflector> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(
        &self,
        type_id: TypeId,
        reflector: Box<dyn TypeReflector>,
    ) -> &'static dyn TypeReflector {
        let mut map = self.0.write().unwrap_or_else(PoisonError::into_inner);
        match map.entry(type_id) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => *entry.insert(Box::leak(reflector)),
        }
    }
}

impl Default for GenericReflectorCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::Reflected;

    #[test]
    fn nested_generic_reflectors_initialize_from_many_threads() {
        let names: Vec<String> = (0..8)
            .map(|index| {
                thread::spawn(move || {
                    let reflector = if index % 2 == 0 {
                        <Vec<Vec<Vec<i16>>>>::reflector()
                    } else {
                        <Vec<Vec<i16>>>::reflector()
                    };
                    reflector.static_type_name().to_owned()
                })
            })
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        for (index, name) in names.iter().enumerate() {
            let expected = if index % 2 == 0 { "Vec<Vec<Vec<i16>>>" } else { "Vec<Vec<i16>>" };
            assert_eq!(name, expected);
        }
        assert!(core::ptr::addr_eq(
            <Vec<Vec<i16>>>::reflector(),
            <Vec<Vec<i16>>>::reflector()
        ));
    }
}
