use core::fmt::Write;

use vc_io::{ErrorHandler, LogErrorHandler, SerialResult};

use crate::class::Class;
use crate::field::{FieldFlags, ReflectedFields};
use crate::reflector::Reflected;

#[inline]
fn logged<T>(result: SerialResult<T>) -> SerialResult<T> {
    if let Err(err) = &result {
        LogErrorHandler.report(err);
    }
    result
}

/// Renders `value` as text, nested class fields filtered by `mask`.
///
/// Failures are logged, see [`LogErrorHandler`]. Use
/// [`Archive::to_string`](crate::Archive::to_string) to report elsewhere.
///
/// ```
/// use vc_reflect::{reflect_to_string, FieldFlags};
///
/// let text = reflect_to_string(&vec![1u8, 2], FieldFlags::STATE).unwrap();
/// assert_eq!(text, "[1, 2]");
/// ```
pub fn reflect_to_string<T: Reflected>(value: &T, mask: FieldFlags) -> SerialResult<String> {
    logged(T::reflector().to_string(value, mask))
}

/// Parses `text` into `value`.
///
/// Failures are logged, see [`LogErrorHandler`].
///
/// ```
/// use vc_reflect::reflect_from_string;
///
/// let mut ready = false;
/// reflect_from_string(&mut ready, "TRUE").unwrap();
/// assert!(ready);
/// assert!(reflect_from_string(&mut ready, "maybe").is_err());
/// ```
pub fn reflect_from_string<T: Reflected>(value: &mut T, text: &str) -> SerialResult<()> {
    logged(T::reflector().set_from_string(text, value))
}

/// Lists the fields of `instance` selected by `mask`, one per line.
///
/// Each line reads `type Class::field = value`, where `Class` is the level
/// declaring the field. Polymorphic fields get a second line naming their
/// declared type.
///
/// ```
/// use vc_reflect::{impl_class, describe, FieldFlags};
///
/// #[derive(Default)]
/// struct Note { text: String, pinned: bool }
/// impl_class! {
///     Note as "Note" version 1 {}
///     fields { text: String [STATE], pinned: bool [CONFIG] }
/// }
///
/// let note = Note { text: "hello".into(), pinned: true };
/// assert_eq!(
///     describe(&note, FieldFlags::STATE).unwrap(),
///     "Instance of class Note:\nString          Note::text = hello\n",
/// );
/// ```
pub fn describe(instance: &dyn Class, mask: FieldFlags) -> SerialResult<String> {
    logged(describe_fields(instance, mask))
}

fn describe_fields(instance: &dyn Class, mask: FieldFlags) -> SerialResult<String> {
    let mut out = String::new();
    let _ = writeln!(out, "Instance of class {}:", instance.class_info().name());

    for field in &ReflectedFields::of(instance) {
        let field = field?;
        if !field.flags().intersects(mask) {
            continue;
        }
        let _ = writeln!(
            out,
            "{:<15} {}::{} = {}",
            field.type_name(),
            field.owner().name(),
            field.name(),
            field.to_string(FieldFlags::STATE)?,
        );
        if field.is_polymorphic() {
            let _ = writeln!(out, "\t(declared field type: {})", field.static_type_name());
        }
    }
    Ok(out)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{describe, reflect_from_string, reflect_to_string};
    use crate::FieldFlags;
    use crate::fixtures::{player, scene};
    use crate::io::ErrorKind;

    #[test]
    fn describe_lists_selected_fields_with_their_owner() {
        let text = describe(&player(), FieldFlags::STATE | FieldFlags::CONFIG).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Instance of class Player:");
        assert_eq!(lines[1], "i32             Player::score = -7");
        assert_eq!(lines[4], "Vec<String>     Player::tags = [red, fast]");
        assert_eq!(lines[6], "u64             Entity::id = 42");
        assert_eq!(lines[8], "u32             Entity::scratch = 9");
        assert_eq!(lines.len(), 9);

        let text = describe(&player(), FieldFlags::CONFIG).unwrap();
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn describe_names_the_declared_type_of_polymorphic_fields() {
        let text = describe(&scene(), FieldFlags::STATE).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "Circle          Scene::focus = {radius=\"3.5\", label=\"sun\"}");
        assert_eq!(lines[3], "\t(declared field type: Shape)");
    }

    #[test]
    fn string_helpers() {
        assert_eq!(reflect_to_string(&-3i64, FieldFlags::STATE).unwrap(), "-3");
        assert_eq!(reflect_to_string(&player().position, FieldFlags::STATE).unwrap(), "{x=\"1.5\", y=\"-2\"}");

        let mut value = 0u16;
        reflect_from_string(&mut value, "512").unwrap();
        assert_eq!(value, 512);
        let err = reflect_from_string(&mut value, "70000").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        let mut tags = vec![String::new()];
        let err = reflect_from_string(&mut tags, "[a]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }
}
