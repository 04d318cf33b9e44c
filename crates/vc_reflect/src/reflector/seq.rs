use core::any::Any;
use core::marker::PhantomData;

use vc_io::{SerialError, SerialResult, WriteExt};

use crate::field::FieldFlags;
use crate::reflector::{GenericReflectorCell, Reflected, TypeReflector, downcast_mut, downcast_ref};
use crate::schema::StoredType;
use crate::serial::{ReadContext, WriteContext};

/// Upper bound on elements reserved ahead of reading them.
const PREALLOCATION_LIMIT: usize = 1024;

/// The reflector of `Vec<T>`.
///
/// Stored as a `u32` element count followed by the elements.
pub struct SeqReflector<T: Reflected> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflected> SeqReflector<T> {
    pub fn new() -> Self {
        Self {
            name: format!("Vec<{}>", T::reflector().static_type_name()),
            _marker: PhantomData,
        }
    }
}

impl<T: Reflected + Default> TypeReflector for SeqReflector<T> {
    #[inline]
    fn static_type_name(&self) -> &str {
        &self.name
    }

    fn stored_type(&self) -> StoredType {
        StoredType::Seq(Box::new(T::reflector().stored_type()))
    }

    fn serialize(&self, cx: &mut WriteContext<'_>, value: &dyn Any) -> SerialResult<()> {
        let items = downcast_ref::<Vec<T>>(value)?;
        let element = T::reflector();
        cx.write_len("sequence length", items.len())?;
        for item in items {
            element.serialize(cx, item)?;
        }
        Ok(())
    }

    /// Replaces the content of the vector with default-constructed elements
    /// filled in from the stream.
    fn deserialize(&self, cx: &mut ReadContext<'_>, value: &mut dyn Any) -> SerialResult<()> {
        let items = downcast_mut::<Vec<T>>(value)?;
        let element = T::reflector();
        let count = cx.read_limited_len("sequence length")?;
        items.clear();
        items.reserve(count.min(PREALLOCATION_LIMIT));
        for _ in 0..count {
            let mut item = T::default();
            element.deserialize(cx, &mut item)?;
            items.push(item);
        }
        Ok(())
    }

    fn set_from_string(&self, _text: &str, value: &mut dyn Any) -> SerialResult<()> {
        downcast_mut::<Vec<T>>(value)?;
        Err(SerialError::not_implemented(format!(
            "{}::set_from_string",
            self.name
        )))
    }

    fn to_string(&self, value: &dyn Any, mask: FieldFlags) -> SerialResult<String> {
        let items = downcast_ref::<Vec<T>>(value)?;
        let element = T::reflector();
        let mut out = String::from("[");
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            out.push_str(&element.to_string(item, mask)?);
        }
        out.push(']');
        Ok(out)
    }
}

impl<T: Reflected + Default> Reflected for Vec<T> {
    fn reflector() -> &'static dyn TypeReflector {
        static CELL: GenericReflectorCell = GenericReflectorCell::new();
        CELL.get_or_insert::<Self>(|| Box::new(SeqReflector::<T>::new()))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::io::ErrorKind;
    use crate::{FieldFlags, Reflected, StoredType};
    use crate::schema::ScalarType;

    #[test]
    fn nested_sequences() {
        let reflector = <Vec<Vec<u8>>>::reflector();
        assert_eq!(reflector.static_type_name(), "Vec<Vec<u8>>");
        assert_eq!(
            reflector.stored_type(),
            StoredType::Seq(Box::new(StoredType::Seq(Box::new(StoredType::Scalar(
                ScalarType::U8
            )))))
        );

        let value = vec![vec![1u8, 2], vec![], vec![3]];
        assert_eq!(
            reflector.to_string(&value, FieldFlags::STATE).unwrap(),
            "[[1, 2], [], [3]]"
        );
    }

    #[test]
    fn text_input_is_not_supported() {
        let mut value = vec![1u32];
        let err = <Vec<u32>>::reflector()
            .set_from_string("[2]", &mut value)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
        assert_eq!(value, [1]);
    }
}
