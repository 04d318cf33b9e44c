use core::any::Any;
use core::marker::PhantomData;

use uuid::Uuid;
use vc_io::{SerialError, SerialResult};

use crate::class::StaticClass;
use crate::field::{FieldFlags, ReflectedFields};
use crate::reflector::{TypeReflector, downcast_mut, downcast_ref};
use crate::schema::StoredType;
use crate::serial::{ClassHeader, ReadContext, SerializationManager, WriteContext};

/// Renders the fields matching `mask` as `{a="1", b="x"}`.
pub(crate) fn fields_to_string(fields: &ReflectedFields<'_>, mask: FieldFlags) -> SerialResult<String> {
    let mut out = String::from("{");
    let mut first = true;
    for field in fields {
        let field = field?;
        if !field.flags().intersects(mask) {
            continue;
        }
        if !first {
            out.push_str(", ");
        }
        first = false;
        out.push_str(field.name());
        out.push_str("=\"");
        out.push_str(&field.to_string(mask)?);
        out.push('"');
    }
    out.push('}');
    Ok(out)
}

/// The reflector of a class `C`, usually created by
/// [`impl_class!`](crate::impl_class).
///
/// Values are stored as the class header followed by the persisted fields,
/// see [`SerializationManager`].
pub struct ClassReflector<C: StaticClass>(PhantomData<fn() -> C>);

impl<C: StaticClass> ClassReflector<C> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C: StaticClass> TypeReflector for ClassReflector<C> {
    #[inline]
    fn static_type_name(&self) -> &str {
        C::static_class_info().name()
    }

    #[inline]
    fn uuid(&self, _value: &dyn Any) -> Option<Uuid> {
        C::static_class_info().uuid()
    }

    fn stored_type(&self) -> StoredType {
        StoredType::Class(C::static_class_info().name().to_owned())
    }

    fn serialize(&self, cx: &mut WriteContext<'_>, value: &dyn Any) -> SerialResult<()> {
        let instance: &C = downcast_ref(value)?;
        SerializationManager::serialize_instance(cx, C::static_class_info(), instance)
    }

    fn deserialize(&self, cx: &mut ReadContext<'_>, value: &mut dyn Any) -> SerialResult<()> {
        let instance: &mut C = downcast_mut(value)?;
        SerializationManager::deserialize_instance(cx, C::static_class_info(), instance)
    }

    /// Writes the class header.
    fn serialize_type_info(
        &self,
        cx: &mut WriteContext<'_>,
        _value: Option<&dyn Any>,
    ) -> SerialResult<()> {
        ClassHeader::of(C::static_class_info()).write(cx)
    }

    fn verify_type_info(&self, cx: &mut ReadContext<'_>) -> SerialResult<()> {
        SerializationManager::verify_header(cx, C::static_class_info())
    }

    fn set_from_string(&self, _text: &str, value: &mut dyn Any) -> SerialResult<()> {
        downcast_mut::<C>(value)?;
        Err(SerialError::not_implemented(format!(
            "{}::set_from_string",
            C::static_class_info().name()
        )))
    }

    fn to_string(&self, value: &dyn Any, mask: FieldFlags) -> SerialResult<String> {
        let instance: &C = downcast_ref(value)?;
        fields_to_string(&ReflectedFields::new(C::static_class_info(), instance), mask)
    }
}
