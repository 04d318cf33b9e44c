/// Declares a reflected class for a plain struct.
///
/// Implements [`Class`](crate::Class), [`StaticClass`](crate::StaticClass)
/// and [`Reflected`](crate::Reflected) for the type, backed by a static
/// [`ClassInfo`](crate::ClassInfo).
///
/// The header names the type, its stable class name and its version,
/// followed by optional settings:
///
/// - `uuid: <u128>,` attaches a UUID to the class.
/// - `base: <Type> => <field>,` declares the base class, embedded as a field.
/// - `auto_register: true,` submits the class to
///   [`TypeRegistry::auto_register`](crate::TypeRegistry::auto_register).
///
/// Each field lists its type, its [`FieldFlags`](crate::FieldFlags) and,
/// optionally, a params string and a description.
///
/// The type must be non-generic, implement `Default`, and every field type
/// must implement [`Reflected`](crate::Reflected).
///
/// # Example
///
/// ```
/// use vc_reflect::{impl_class, FieldFlags, StaticClass};
///
/// #[derive(Default)]
/// struct Entity {
///     id: u64,
///     name: String,
/// }
///
/// impl_class! {
///     Entity as "Entity" version 1 {
///         uuid: 0x7d44_0c8a_51c3_4b8e_9a5e_3f2a_17c0_b001,
///     }
///     fields {
///         id: u64 [STATE | MANDATORY],
///         name: String [STATE | CONFIG] "--name" "Display name",
///     }
/// }
///
/// #[derive(Default)]
/// struct Player {
///     base: Entity,
///     score: i32,
///     cache: u32,
/// }
///
/// impl_class! {
///     Player as "Player" version 3 {
///         base: Entity => base,
///     }
///     fields {
///         score: i32 [STATE],
///         cache: u32 [CONFIG],
///     }
/// }
///
/// let info = Player::static_class_info();
/// assert_eq!(info.name(), "Player");
/// assert_eq!(info.version(), 3);
/// assert_eq!(info.base().unwrap().name(), "Entity");
/// assert_eq!(info.field_count(), 4);
///
/// let (owner, name) = info.field(3).unwrap();
/// assert_eq!(owner.name(), "Entity");
/// assert_eq!(name.params(), "--name");
/// assert!(name.flags().contains(FieldFlags::CONFIG));
/// ```
#[macro_export]
macro_rules! impl_class {
    (
        $ty:ty as $name:literal version $version:literal {
            $(uuid: $uuid:expr,)?
            $(base: $base:ty => $base_field:ident,)?
            $(auto_register: $auto:tt,)?
        }
        fields {
            $(
                $field:ident : $fty:ty [ $($flag:ident)|+ ] $( $params:literal $( $desc:literal )? )?
            ),* $(,)?
        }
    ) => {
        const _: () = {
            const FIELDS: &[$crate::field::FieldDescriptor] = &[
                $(
                    $crate::field::FieldDescriptor::new(
                        ::core::stringify!($field),
                        <$fty as $crate::reflector::Reflected>::reflector,
                        {
                            fn get(
                                this: &dyn ::core::any::Any,
                            ) -> ::core::option::Option<&dyn ::core::any::Any> {
                                match this.downcast_ref::<$ty>() {
                                    ::core::option::Option::Some(this) => ::core::option::Option::Some(
                                        &this.$field as &dyn ::core::any::Any,
                                    ),
                                    ::core::option::Option::None => ::core::option::Option::None,
                                }
                            }
                            get
                        },
                        {
                            fn get_mut(
                                this: &mut dyn ::core::any::Any,
                            ) -> ::core::option::Option<&mut dyn ::core::any::Any> {
                                match this.downcast_mut::<$ty>() {
                                    ::core::option::Option::Some(this) => ::core::option::Option::Some(
                                        &mut this.$field as &mut dyn ::core::any::Any,
                                    ),
                                    ::core::option::Option::None => ::core::option::Option::None,
                                }
                            }
                            get_mut
                        },
                    )
                    .with_flags(
                        $crate::field::FieldFlags::empty()
                            $(.union($crate::field::FieldFlags::$flag))+
                    )
                    $(
                        .with_params($params)
                        $( .with_description($desc) )?
                    )?
                ),*
            ];

            static INFO: $crate::class::ClassInfo = $crate::class::ClassInfo::new(
                $name,
                $version,
                $crate::field::FieldSet::new(FIELDS),
            )
            $( .with_uuid($crate::__macro_exports::Uuid::from_u128($uuid)) )?
            $(
                .with_base($crate::field::BaseLink::new(
                    <$base as $crate::class::StaticClass>::static_class_info,
                    {
                        fn upcast(
                            this: &dyn ::core::any::Any,
                        ) -> ::core::option::Option<&dyn ::core::any::Any> {
                            match this.downcast_ref::<$ty>() {
                                ::core::option::Option::Some(this) => ::core::option::Option::Some(
                                    &this.$base_field as &dyn ::core::any::Any,
                                ),
                                ::core::option::Option::None => ::core::option::Option::None,
                            }
                        }
                        upcast
                    },
                    {
                        fn upcast_mut(
                            this: &mut dyn ::core::any::Any,
                        ) -> ::core::option::Option<&mut dyn ::core::any::Any> {
                            match this.downcast_mut::<$ty>() {
                                ::core::option::Option::Some(this) => ::core::option::Option::Some(
                                    &mut this.$base_field as &mut dyn ::core::any::Any,
                                ),
                                ::core::option::Option::None => ::core::option::Option::None,
                            }
                        }
                        upcast_mut
                    },
                ))
            )?;

            impl $crate::class::Class for $ty {
                #[inline]
                fn class_info(&self) -> &'static $crate::class::ClassInfo {
                    &INFO
                }
            }

            impl $crate::class::StaticClass for $ty {
                #[inline]
                fn static_class_info() -> &'static $crate::class::ClassInfo {
                    &INFO
                }
            }

            impl $crate::reflector::Reflected for $ty {
                fn reflector() -> &'static dyn $crate::reflector::TypeReflector {
                    static CELL: $crate::reflector::ReflectorCell<
                        $crate::reflector::ClassReflector<$ty>,
                    > = $crate::reflector::ReflectorCell::new();
                    CELL.get_or_init($crate::reflector::ClassReflector::new)
                }
            }

            $( $crate::__auto_register!($ty, $auto); )?
        };
    };
}
