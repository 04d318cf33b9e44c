use core::any::Any;
use core::marker::PhantomData;

use uuid::Uuid;
use vc_io::{SerialError, SerialResult};

use crate::class::{Poly, StaticClass};
use crate::field::{FieldFlags, ReflectedFields};
use crate::reflector::class::fields_to_string;
use crate::reflector::{GenericReflectorCell, Reflected, TypeReflector, downcast_mut, downcast_ref};
use crate::schema::StoredType;
use crate::serial::{ClassHeader, ReadContext, SerializationManager, WriteContext};

/// The reflector of [`Poly<B>`].
///
/// The declared type is `B`, the runtime type is the class of the held
/// object. Values are stored as the header of `B`, the header of the dynamic
/// class and the persisted fields of the dynamic class.
pub struct PolyReflector<B: StaticClass>(PhantomData<fn() -> B>);

impl<B: StaticClass> PolyReflector<B> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<B: StaticClass> TypeReflector for PolyReflector<B> {
    #[inline]
    fn static_type_name(&self) -> &str {
        B::static_class_info().name()
    }

    fn type_name<'a>(&'a self, value: &'a dyn Any) -> &'a str {
        match value.downcast_ref::<Poly<B>>() {
            Some(poly) => poly.class_info().name(),
            None => self.static_type_name(),
        }
    }

    #[inline]
    fn is_polymorphic(&self) -> bool {
        true
    }

    fn uuid(&self, value: &dyn Any) -> Option<Uuid> {
        value.downcast_ref::<Poly<B>>()?.class_info().uuid()
    }

    fn stored_type(&self) -> StoredType {
        StoredType::Poly(B::static_class_info().name().to_owned())
    }

    fn serialize(&self, cx: &mut WriteContext<'_>, value: &dyn Any) -> SerialResult<()> {
        let poly: &Poly<B> = downcast_ref(value)?;
        SerializationManager::serialize_polymorphic(cx, B::static_class_info(), poly.get())
    }

    /// Replaces the held object with a new instance of the stored class.
    fn deserialize(&self, cx: &mut ReadContext<'_>, value: &mut dyn Any) -> SerialResult<()> {
        let poly: &mut Poly<B> = downcast_mut(value)?;
        let object = SerializationManager::deserialize_polymorphic(cx, B::static_class_info())?;
        let found = object.class_info().name();
        *poly = Poly::from_box(object)
            .ok_or_else(|| SerialError::type_mismatch(B::static_class_info().name(), found))?;
        Ok(())
    }

    /// Writes the headers of the declared and of the dynamic class. Without a
    /// value, the declared class stands in for the dynamic one.
    fn serialize_type_info(
        &self,
        cx: &mut WriteContext<'_>,
        value: Option<&dyn Any>,
    ) -> SerialResult<()> {
        let declared = B::static_class_info();
        let dynamic = match value {
            Some(value) => downcast_ref::<Poly<B>>(value)?.class_info(),
            None => declared,
        };
        ClassHeader::of(declared).write(cx)?;
        ClassHeader::of(dynamic).write(cx)
    }

    fn verify_type_info(&self, cx: &mut ReadContext<'_>) -> SerialResult<()> {
        SerializationManager::verify_polymorphic(cx, B::static_class_info())
    }

    fn set_from_string(&self, _text: &str, value: &mut dyn Any) -> SerialResult<()> {
        downcast_mut::<Poly<B>>(value)?;
        Err(SerialError::not_implemented(format!(
            "Poly<{}>::set_from_string",
            B::static_class_info().name()
        )))
    }

    fn to_string(&self, value: &dyn Any, mask: FieldFlags) -> SerialResult<String> {
        let poly: &Poly<B> = downcast_ref(value)?;
        fields_to_string(&ReflectedFields::of(poly.get()), mask)
    }
}

impl<B: StaticClass> Reflected for Poly<B> {
    fn reflector() -> &'static dyn TypeReflector {
        static CELL: GenericReflectorCell = GenericReflectorCell::new();
        CELL.get_or_insert::<Self>(|| Box::new(PolyReflector::<B>::new()))
    }
}
