//! Per-type behaviour: how a value is written, read, described and rendered.
//!
//! Every reflected type has exactly one [`TypeReflector`], a stateless
//! `'static` singleton reached through [`Reflected::reflector`]. Reflectors
//! operate on type-erased values (`&dyn Any`) and fail with
//! [`SerialError::TypeMismatch`] if handed a value of another type.
//!
//! Provided reflectors:
//!
//! | Type | Reflector | Text form |
//! |------|-----------|-----------|
//! | `bool`, integers, `f32`, `f64` | [`ScalarReflector`] | `Display` |
//! | `String` | [`StringReflector`] | the string itself |
//! | `Vec<T>` | [`SeqReflector`] | `[a, b, c]` |
//! | classes | [`ClassReflector`] | `{a="1", b="x"}` |
//! | [`Poly<B>`](crate::Poly) | [`PolyReflector`] | as the dynamic class |

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod class;
mod poly;
mod scalar;
mod seq;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericReflectorCell, ReflectorCell};
pub use class::ClassReflector;
pub use poly::PolyReflector;
pub use scalar::{Scalar, ScalarReflector, StringReflector};
pub use seq::SeqReflector;

use core::any::{Any, type_name};

use uuid::Uuid;
use vc_io::{SerialError, SerialResult};

use crate::field::FieldFlags;
use crate::schema::StoredType;
use crate::serial::{ReadContext, WriteContext};

// -----------------------------------------------------------------------------
// TypeReflector

/// Type-erased behaviour of one reflected type.
pub trait TypeReflector: Send + Sync + 'static {
    /// The declared name of the type, e.g. `u32`, `Vec<String>` or a class name.
    fn static_type_name(&self) -> &str;

    /// The name of the value's runtime type.
    ///
    /// Differs from [`static_type_name`](Self::static_type_name) only for
    /// polymorphic values.
    fn type_name<'a>(&'a self, value: &'a dyn Any) -> &'a str {
        let _ = value;
        self.static_type_name()
    }

    /// Returns `true` if values may hold a class derived from the declared one.
    fn is_polymorphic(&self) -> bool {
        false
    }

    /// The UUID of the value's class, if it has one.
    fn uuid(&self, value: &dyn Any) -> Option<Uuid> {
        let _ = value;
        None
    }

    /// The descriptor persisted in class schemas for this type.
    fn stored_type(&self) -> StoredType;

    /// Writes the value's binary form.
    fn serialize(&self, cx: &mut WriteContext<'_>, value: &dyn Any) -> SerialResult<()>;

    /// Reads the binary form into `value`, in place.
    fn deserialize(&self, cx: &mut ReadContext<'_>, value: &mut dyn Any) -> SerialResult<()>;

    /// Writes a compact identification of the type.
    ///
    /// The default writes the [`stored_type`](Self::stored_type) descriptor.
    /// Classes write their header instead, polymorphic values the headers
    /// of both the declared and the dynamic class.
    fn serialize_type_info(
        &self,
        cx: &mut WriteContext<'_>,
        value: Option<&dyn Any>,
    ) -> SerialResult<()> {
        let _ = value;
        self.stored_type().encode(cx)
    }

    /// Reads what [`serialize_type_info`](Self::serialize_type_info) wrote and
    /// checks it against this type.
    fn verify_type_info(&self, cx: &mut ReadContext<'_>) -> SerialResult<()> {
        let limits = cx.limits();
        let stored = StoredType::decode(cx, limits)?;
        let live = self.stored_type();
        if stored == live {
            Ok(())
        } else {
            Err(SerialError::type_mismatch(live.to_string(), stored.to_string()))
        }
    }

    /// Parses `text` into `value`.
    fn set_from_string(&self, text: &str, value: &mut dyn Any) -> SerialResult<()>;

    /// Renders `value` as text.
    ///
    /// `mask` selects which fields of nested classes are included.
    fn to_string(&self, value: &dyn Any, mask: FieldFlags) -> SerialResult<String>;
}

// -----------------------------------------------------------------------------
// Reflected

/// Static access to the [`TypeReflector`] of a type.
///
/// Classes get this from [`impl_class!`](crate::impl_class). Implementing it
/// by hand requires a reflector singleton, see [`ReflectorCell`] and
/// [`GenericReflectorCell`].
pub trait Reflected: Any + Send + Sync {
    fn reflector() -> &'static dyn TypeReflector;
}

// -----------------------------------------------------------------------------
// Downcasting

#[inline]
pub(crate) fn downcast_ref<T: Any>(value: &dyn Any) -> SerialResult<&T> {
    value.downcast_ref::<T>().ok_or_else(mismatch::<T>)
}

#[inline]
pub(crate) fn downcast_mut<T: Any>(value: &mut dyn Any) -> SerialResult<&mut T> {
    value.downcast_mut::<T>().ok_or_else(mismatch::<T>)
}

#[cold]
fn mismatch<T: Any>() -> SerialError {
    SerialError::type_mismatch(type_name::<T>(), "a value of another type")
}
