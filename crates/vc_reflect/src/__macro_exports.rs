//! Items referenced by the expansion of [`impl_class!`](crate::impl_class).

pub use uuid::Uuid;

#[cfg(feature = "auto_register")]
pub use inventory;

#[cfg(feature = "auto_register")]
pub use crate::registry::AutoRegister;

#[cfg(feature = "auto_register")]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register {
    ($ty:ty, true) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::__macro_exports::AutoRegister({
                fn register(registry: &mut $crate::registry::TypeRegistry) {
                    registry.register_class::<$ty>();
                }
                register
            })
        }
    };
    ($ty:ty, false) => {};
}

#[cfg(not(feature = "auto_register"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register {
    ($ty:ty, $flag:literal) => {};
}
