use std::rc::Rc;

use vc_io::{Reader, SerialError, SerialResult};

use crate::schema::{ClassSchema, StoredType};
use crate::serial::{ClassHeader, ReadContext};

/// Advances past one stored value of type `ty` without materializing it.
///
/// Nested classes are laid out by the registry if it knows the stored
/// version, and by the schema provider otherwise.
pub(crate) fn skip_value(cx: &mut ReadContext<'_>, ty: &StoredType) -> SerialResult<()> {
    match ty {
        StoredType::Scalar(scalar) => cx.skip(scalar.width()),
        StoredType::Str => {
            let len = cx.read_limited_len("string length")?;
            cx.skip(len)
        }
        StoredType::Seq(element) => {
            let count = cx.read_limited_len("sequence length")?;
            match element.fixed_width() {
                Some(width) => cx.skip(count.saturating_mul(width)),
                None => {
                    for _ in 0..count {
                        skip_value(cx, element)?;
                    }
                    Ok(())
                }
            }
        }
        StoredType::Class(name) => {
            let header = cx.read_header()?;
            if header.name() != name {
                return Err(SerialError::type_mismatch(name.clone(), header.name));
            }
            skip_body(cx, header)
        }
        StoredType::Poly(base) => {
            let declared = cx.read_header()?;
            if declared.name() != base {
                return Err(SerialError::type_mismatch(base.clone(), declared.name));
            }
            let header = cx.read_header()?;
            skip_body(cx, header)
        }
    }
}

fn skip_body(cx: &mut ReadContext<'_>, header: ClassHeader) -> SerialResult<()> {
    let layout = stored_layout(cx, &header)?;
    log::debug!(
        "skipping value of class `{}` version {}",
        header.name(),
        header.version
    );
    cx.scoped(
        move || header.name,
        |cx| {
            for field in layout.fields() {
                skip_value(cx, field.ty())?;
            }
            Ok(())
        },
    )
}

fn stored_layout(cx: &mut ReadContext<'_>, header: &ClassHeader) -> SerialResult<Rc<ClassSchema>> {
    if let Some(meta) = cx.registry().class(header.name())
        && meta.info().version() == header.version
    {
        return Ok(Rc::new(ClassSchema::of(meta.info())));
    }
    match cx.load_schema(header.name())? {
        Some(schema) if schema.version() == header.version => Ok(schema),
        Some(schema) => Err(SerialError::VersionMismatch {
            class: header.name().to_owned(),
            expected: schema.version(),
            found: header.version,
        }),
        None => Err(SerialError::SchemaNotFound {
            class: header.name().to_owned(),
        }),
    }
}
