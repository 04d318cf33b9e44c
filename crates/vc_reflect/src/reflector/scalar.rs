use core::any::Any;
use core::fmt::Display;
use core::marker::PhantomData;
use core::str::FromStr;

use vc_io::{ReadExt, Reader, SerialError, SerialResult, WriteExt, Writer};

use crate::field::FieldFlags;
use crate::reflector::{Reflected, ReflectorCell, TypeReflector, downcast_mut, downcast_ref};
use crate::schema::{ScalarType, StoredType};
use crate::serial::{ReadContext, WriteContext};

// -----------------------------------------------------------------------------
// Scalar

/// A fixed-width value with a binary and a text form.
///
/// Implemented for `bool`, the 8 to 64 bit integers, `f32` and `f64`.
pub trait Scalar: Any + Send + Sync + Copy + Display {
    /// The declared type name.
    const NAME: &'static str;
    /// The stored descriptor of the type.
    const SCALAR: ScalarType;

    fn encode<W: Writer + ?Sized>(self, writer: &mut W) -> SerialResult<()>;

    fn decode<R: Reader + ?Sized>(reader: &mut R) -> SerialResult<Self>;

    fn parse(text: &str) -> SerialResult<Self>;
}

#[cold]
fn unparsable(text: &str, name: &str) -> SerialError {
    SerialError::invalid_data(format!("cannot parse `{text}` as {name}"))
}

macro_rules! impl_scalar {
    ($($ty:ty => $scalar:ident, $read:ident, $write:ident;)*) => {
        $(
            impl Scalar for $ty {
                const NAME: &'static str = ::core::stringify!($ty);
                const SCALAR: ScalarType = ScalarType::$scalar;

                #[inline]
                fn encode<W: Writer + ?Sized>(self, writer: &mut W) -> SerialResult<()> {
                    writer.$write(self)
                }

                #[inline]
                fn decode<R: Reader + ?Sized>(reader: &mut R) -> SerialResult<Self> {
                    reader.$read()
                }

                fn parse(text: &str) -> SerialResult<Self> {
                    <$ty as FromStr>::from_str(text.trim()).map_err(|_| unparsable(text, Self::NAME))
                }
            }

            impl Reflected for $ty {
                fn reflector() -> &'static dyn TypeReflector {
                    static CELL: ReflectorCell<ScalarReflector<$ty>> = ReflectorCell::new();
                    CELL.get_or_init(ScalarReflector::new)
                }
            }
        )*
    };
}

impl_scalar! {
    u8 => U8, read_u8, write_u8;
    i8 => I8, read_i8, write_i8;
    u16 => U16, read_u16, write_u16;
    i16 => I16, read_i16, write_i16;
    u32 => U32, read_u32, write_u32;
    i32 => I32, read_i32, write_i32;
    u64 => U64, read_u64, write_u64;
    i64 => I64, read_i64, write_i64;
    f32 => F32, read_f32, write_f32;
    f64 => F64, read_f64, write_f64;
}

impl Scalar for bool {
    const NAME: &'static str = "bool";
    const SCALAR: ScalarType = ScalarType::Bool;

    #[inline]
    fn encode<W: Writer + ?Sized>(self, writer: &mut W) -> SerialResult<()> {
        writer.write_bool(self)
    }

    #[inline]
    fn decode<R: Reader + ?Sized>(reader: &mut R) -> SerialResult<Self> {
        reader.read_bool()
    }

    /// Accepts `1`, `0`, `true` and `false`, ignoring case and surrounding
    /// whitespace.
    fn parse(text: &str) -> SerialResult<Self> {
        let trimmed = text.trim();
        if trimmed == "1" || trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed == "0" || trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(unparsable(text, Self::NAME))
        }
    }
}

impl Reflected for bool {
    fn reflector() -> &'static dyn TypeReflector {
        static CELL: ReflectorCell<ScalarReflector<bool>> = ReflectorCell::new();
        CELL.get_or_init(ScalarReflector::new)
    }
}

// -----------------------------------------------------------------------------
// ScalarReflector

/// The reflector of a [`Scalar`] type.
///
/// ```
/// # use vc_reflect::{FieldFlags, Reflected};
/// let reflector = <bool as Reflected>::reflector();
/// let mut flag = false;
///
/// reflector.set_from_string("TRUE", &mut flag).unwrap();
/// assert!(flag);
/// assert_eq!(reflector.to_string(&flag, FieldFlags::STATE).unwrap(), "true");
/// assert!(reflector.set_from_string("yes", &mut flag).is_err());
/// ```
pub struct ScalarReflector<T: Scalar>(PhantomData<fn() -> T>);

impl<T: Scalar> ScalarReflector<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Scalar> TypeReflector for ScalarReflector<T> {
    #[inline]
    fn static_type_name(&self) -> &str {
        T::NAME
    }

    #[inline]
    fn stored_type(&self) -> StoredType {
        StoredType::Scalar(T::SCALAR)
    }

    fn serialize(&self, cx: &mut WriteContext<'_>, value: &dyn Any) -> SerialResult<()> {
        downcast_ref::<T>(value)?.encode(cx)
    }

    fn deserialize(&self, cx: &mut ReadContext<'_>, value: &mut dyn Any) -> SerialResult<()> {
        let slot = downcast_mut::<T>(value)?;
        *slot = T::decode(cx)?;
        Ok(())
    }

    fn set_from_string(&self, text: &str, value: &mut dyn Any) -> SerialResult<()> {
        let slot = downcast_mut::<T>(value)?;
        *slot = T::parse(text)?;
        Ok(())
    }

    fn to_string(&self, value: &dyn Any, _mask: FieldFlags) -> SerialResult<String> {
        downcast_ref::<T>(value).map(ToString::to_string)
    }
}

// -----------------------------------------------------------------------------
// StringReflector

/// The reflector of `String`. The text form is the string itself.
pub struct StringReflector;

impl TypeReflector for StringReflector {
    #[inline]
    fn static_type_name(&self) -> &str {
        "String"
    }

    #[inline]
    fn stored_type(&self) -> StoredType {
        StoredType::Str
    }

    fn serialize(&self, cx: &mut WriteContext<'_>, value: &dyn Any) -> SerialResult<()> {
        cx.write_str(downcast_ref::<String>(value)?)
    }

    fn deserialize(&self, cx: &mut ReadContext<'_>, value: &mut dyn Any) -> SerialResult<()> {
        let slot = downcast_mut::<String>(value)?;
        *slot = cx.read_limited_string()?;
        Ok(())
    }

    fn set_from_string(&self, text: &str, value: &mut dyn Any) -> SerialResult<()> {
        let slot = downcast_mut::<String>(value)?;
        text.clone_into(slot);
        Ok(())
    }

    fn to_string(&self, value: &dyn Any, _mask: FieldFlags) -> SerialResult<String> {
        downcast_ref::<String>(value).cloned()
    }
}

impl Reflected for String {
    fn reflector() -> &'static dyn TypeReflector {
        static CELL: ReflectorCell<StringReflector> = ReflectorCell::new();
        CELL.get_or_init(|| StringReflector)
    }
}

// -----------------------------------------------------------------------------
// Tests
