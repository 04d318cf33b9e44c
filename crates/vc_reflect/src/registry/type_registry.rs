use core::any::TypeId;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use foldhash::fast::FixedState;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use vc_io::{SerialError, SerialResult};

use crate::class::{Class, StaticClass};
use crate::reflector::{Reflected, TypeReflector};
use crate::registry::ClassMeta;

type Map<K, V> = HashMap<K, V, FixedState>;

#[inline]
const fn new_map<K, V>() -> Map<K, V> {
    HashMap::with_hasher(FixedState::with_seed(0))
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// The registry of reflected types and classes.
///
/// Deserialization resolves the stored name of a polymorphic value's class
/// here, and constructs the instance through the registered [`ClassMeta`].
/// Class names are unique: registering a second type under a taken name
/// is refused.
///
/// # Example
///
/// ```
/// use vc_reflect::{impl_class, TypeRegistry};
///
/// #[derive(Default)]
/// struct Note { text: String }
/// impl_class! { Note as "Note" version 1 {} fields { text: String [STATE] } }
///
/// let mut registry = TypeRegistry::new();
/// assert!(registry.register_class::<Note>());
/// assert!(!registry.register_class::<Note>());
///
/// let note = registry.construct("Note").unwrap();
/// assert_eq!(note.class_info().name(), "Note");
/// assert!(registry.construct("Ghost").is_err());
/// ```
pub struct TypeRegistry {
    reflectors: Map<TypeId, &'static dyn TypeReflector>,
    classes: Map<&'static str, ClassMeta>,
    #[cfg(feature = "auto_register")]
    auto_registered: bool,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            reflectors: new_map(),
            classes: new_map(),
            #[cfg(feature = "auto_register")]
            auto_registered: false,
        }
    }

    /// Creates a registry with the primitive types registered.
    ///
    /// - `bool`
    /// - `u8 - u64`, `i8 - i64`
    /// - `f32`, `f64`
    /// - `String`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<bool>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<String>();
        registry
    }

    /// Registers the reflector of `T`.
    ///
    /// Returns `false` if `T` was already registered.
    pub fn register<T: Reflected>(&mut self) -> bool {
        match self.reflectors.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(T::reflector());
                true
            }
        }
    }

    /// Registers the class `C` under its class name.
    ///
    /// Returns `false` if `C` was already registered, or if another type
    /// holds the name, which is also logged as a warning.
    pub fn register_class<C: StaticClass>(&mut self) -> bool {
        let meta = ClassMeta::of::<C>();
        match self.classes.entry(meta.info().name()) {
            Entry::Occupied(entry) => {
                if entry.get().type_id() != meta.type_id() {
                    log::warn!(
                        "class name `{}` is already registered for another type, ignoring `{}`",
                        meta.info().name(),
                        core::any::type_name::<C>(),
                    );
                }
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(meta);
                self.register::<C>();
                true
            }
        }
    }

    /// Registers every class declared with `auto_register: true`.
    ///
    /// Repeated calls are cheap and insert nothing twice.
    ///
    /// ## Return Value
    ///
    /// Returns `true` if automatic registration is supported on this
    /// platform, `false` otherwise.
    ///
    /// ## Feature Dependency
    ///
    /// Requires the `auto_register` feature. Without it this does nothing
    /// and returns `false`.
    ///
    /// ## Platform Support
    ///
    /// Linux, macOS, Windows, iOS, Android and Web, through the `inventory`
    /// crate.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            if self.auto_registered {
                return true;
            }
            for entry in inventory::iter::<crate::registry::AutoRegister> {
                (entry.0)(self);
            }
            self.auto_registered
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    #[cfg(feature = "auto_register")]
    pub(crate) fn mark_auto_registered(&mut self) {
        self.auto_registered = true;
    }

    /// Whether the type with the given [`TypeId`] has been registered.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.reflectors.contains_key(&type_id)
    }

    /// Whether a class named `name` has been registered.
    #[inline]
    pub fn contains_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Returns the reflector registered for the given [`TypeId`].
    #[inline]
    pub fn reflector(&self, type_id: TypeId) -> Option<&'static dyn TypeReflector> {
        self.reflectors.get(&type_id).copied()
    }

    /// Returns the class registered under `name`.
    #[inline]
    pub fn class(&self, name: &str) -> Option<&ClassMeta> {
        self.classes.get(name)
    }

    /// Returns the class registered under `name`, failing with
    /// [`SerialError::UnknownClassIdentifier`] if there is none.
    pub fn resolve_class(&self, name: &str) -> SerialResult<&ClassMeta> {
        self.classes
            .get(name)
            .ok_or_else(|| SerialError::UnknownClassIdentifier(name.to_owned()))
    }

    /// Creates a default instance of the class registered under `name`.
    pub fn construct(&self, name: &str) -> SerialResult<Box<dyn Class>> {
        self.resolve_class(name).map(ClassMeta::construct)
    }

    /// Iterates over all registered classes in arbitrary order.
    #[inline]
    pub fn classes(&self) -> impl Iterator<Item = &ClassMeta> {
        self.classes.values()
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.reflectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reflectors.is_empty()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

/// A shared [`TypeRegistry`] behind a read-write lock.
///
/// Poisoning is ignored, the registry stays usable after a panic.
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the registry.
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the registry.
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use super::{TypeRegistry, TypeRegistryArc};
    use crate::fixtures::{Circle, RecordV1, RecordV2, Shape};
    use crate::io::ErrorKind;

    #[test]
    fn primitives_are_preregistered() {
        let registry = TypeRegistry::new();
        assert!(registry.contains(TypeId::of::<u32>()));
        assert!(registry.contains(TypeId::of::<String>()));
        assert!(!registry.contains(TypeId::of::<Vec<u32>>()));
        assert_eq!(registry.reflector(TypeId::of::<f64>()).unwrap().static_type_name(), "f64");
        assert!(TypeRegistry::empty().is_empty());
    }

    #[test]
    fn classes_resolve_by_name() {
        let mut registry = TypeRegistry::new();
        registry.register_class::<Shape>();
        registry.register_class::<Circle>();

        let meta = registry.resolve_class("Circle").unwrap();
        assert_eq!(meta.type_id(), TypeId::of::<Circle>());
        assert!(registry.contains(TypeId::of::<Circle>()));

        let err = registry.resolve_class("Hexagon").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownClassIdentifier);
    }

    #[test]
    fn names_are_unique() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register_class::<RecordV1>());
        assert!(!registry.register_class::<RecordV2>());

        let meta = registry.class("Record").unwrap();
        assert_eq!(meta.type_id(), TypeId::of::<RecordV1>());
        assert!(!registry.contains(TypeId::of::<RecordV2>()));
    }

    #[cfg(feature = "auto_register")]
    #[test]
    fn auto_registration() {
        let mut registry = TypeRegistry::empty();
        assert!(registry.auto_register());
        assert!(registry.contains_class("Vec2"));
        assert!(registry.auto_register());
    }

    #[test]
    fn shared_registry() {
        let shared = TypeRegistryArc::default();
        shared.write().register_class::<Shape>();
        assert!(shared.clone().read().contains_class("Shape"));
    }
}
