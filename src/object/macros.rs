/// Declare a struct together with its [`DataObject`](crate::object::DataObject) impl.
///
/// Every field becomes a readable and writable member, in declaration order, named
/// after the field. The struct derives `Default`, which serves as the zero-argument
/// constructor; do not derive it again.
///
/// ```rust
/// use sql_marshal::prelude::*;
///
/// sql_marshal::data_object! {
///     #[derive(Debug, Clone)]
///     pub struct Account {
///         pub id: i64,
///         pub owner: String,
///         pub closed_on: Option<chrono::NaiveDate>,
///     }
/// }
///
/// assert_eq!(Account::descriptor().members().len(), 3);
/// ```
///
/// Prefix the struct with `@no_default` to declare a type without a constructor.
/// Compiling its converter then fails with `BuildError::CannotInstantiate`.
#[macro_export]
macro_rules! data_object {
    (@impl $name:ident [$($ctor:expr)?] $($field:ident : $fty:ty),*) => {
        impl $crate::object::DataObject for $name {
            fn descriptor() -> $crate::object::TypeDescriptor<Self> {
                let builder = $crate::object::TypeDescriptor::<Self>::builder();
                $(
                    let builder = builder.member(
                        ::core::stringify!($field),
                        <$fty as $crate::object::FieldValue>::FIELD_TYPE,
                        |obj: &Self| $crate::object::FieldValue::to_sql(&obj.$field),
                        |obj: &mut Self, value| {
                            obj.$field = <$fty as $crate::object::FieldValue>::from_sql(value)?;
                            Ok(())
                        },
                    );
                )*
                $(
                    let builder = builder.constructor($ctor);
                )?
                builder.build()
            }
        }
    };

    (
        @no_default
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$fmeta:meta])* $fvis:vis $field:ident : $fty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($(#[$fmeta])* $fvis $field: $fty),*
        }

        $crate::data_object!(@impl $name [] $($field : $fty),*);
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$fmeta:meta])* $fvis:vis $field:ident : $fty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis struct $name {
            $($(#[$fmeta])* $fvis $field: $fty),*
        }

        $crate::data_object!(
            @impl $name [<$name as ::core::default::Default>::default] $($field : $fty),*
        );
    };
}
