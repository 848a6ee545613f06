//! Type descriptors for data objects.
//!
//! A data object is any type whose members can be read into statement parameters and
//! written from result columns. Its [`TypeDescriptor`] lists those members in
//! declaration order, with plain function pointers as accessors, so a compiled
//! converter never reflects on the type at run time.

mod macros;

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::coercion::coerce_to;
use crate::error::CoercionError;
use crate::types::{Blob, Clob, SqlValue, ValueKind};

/// The declared type of a member: its value category and whether it admits NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType {
    pub kind: ValueKind,
    pub optional: bool,
}

impl FieldType {
    #[must_use]
    pub const fn required(kind: ValueKind) -> Self {
        Self {
            kind,
            optional: false,
        }
    }

    #[must_use]
    pub const fn optional(kind: ValueKind) -> Self {
        Self {
            kind,
            optional: true,
        }
    }
}

/// A Rust type that can be stored in a data object member.
pub trait FieldValue: Sized {
    const FIELD_TYPE: FieldType;

    fn to_sql(&self) -> SqlValue;

    /// Build the member value from a fetched column value.
    ///
    /// # Errors
    /// Returns a `CoercionError` when the value cannot be coerced to `FIELD_TYPE`.
    fn from_sql(value: SqlValue) -> Result<Self, CoercionError>;
}

macro_rules! impl_field_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const FIELD_TYPE: FieldType = FieldType::required(ValueKind::$variant);

                fn to_sql(&self) -> SqlValue {
                    SqlValue::$variant(self.clone())
                }

                fn from_sql(value: SqlValue) -> Result<Self, CoercionError> {
                    match coerce_to(value, Self::FIELD_TYPE)? {
                        SqlValue::$variant(v) => Ok(v),
                        other => Err(CoercionError::Incompatible {
                            from: other.kind(),
                            to: ValueKind::$variant,
                        }),
                    }
                }
            }
        )*
    };
}

impl_field_value! {
    String => Text,
    char => Char,
    bool => Bool,
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    NaiveDateTime => Timestamp,
    NaiveDate => Date,
    NaiveTime => Time,
    DateTime<Utc> => DateTime,
    Vec<u8> => Bytes,
    Blob => Blob,
    Clob => Clob,
    JsonValue => Json,
}

impl<T: FieldValue> FieldValue for Option<T> {
    const FIELD_TYPE: FieldType = FieldType::optional(T::FIELD_TYPE.kind);

    fn to_sql(&self) -> SqlValue {
        self.as_ref().map_or(SqlValue::Null, FieldValue::to_sql)
    }

    fn from_sql(value: SqlValue) -> Result<Self, CoercionError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_sql(value).map(Some)
        }
    }
}

/// Reads a member as a parameter value.
pub type Getter<T> = fn(&T) -> SqlValue;

/// Writes a coerced column value into a member.
pub type Setter<T> = fn(&mut T, SqlValue) -> Result<(), CoercionError>;

/// One named member of a data object.
pub struct Member<T> {
    name: String,
    field_type: FieldType,
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
}

impl<T> Member<T> {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        getter: Option<Getter<T>>,
        setter: Option<Setter<T>>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            getter,
            setter,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    #[must_use]
    pub fn getter(&self) -> Option<Getter<T>> {
        self.getter
    }

    #[must_use]
    pub fn setter(&self) -> Option<Setter<T>> {
        self.setter
    }

    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }
}

impl<T> Clone for Member<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            field_type: self.field_type,
            getter: self.getter,
            setter: self.setter,
        }
    }
}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// The members and constructor of a data object type.
pub struct TypeDescriptor<T> {
    type_name: &'static str,
    members: Vec<Member<T>>,
    constructor: Option<fn() -> T>,
}

impl<T> TypeDescriptor<T> {
    #[must_use]
    pub fn builder() -> DescriptorBuilder<T> {
        DescriptorBuilder::new()
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Members in declaration order.
    #[must_use]
    pub fn members(&self) -> &[Member<T>] {
        &self.members
    }

    #[must_use]
    pub fn constructor(&self) -> Option<fn() -> T> {
        self.constructor
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("members", &self.members)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

/// Incrementally assembles a [`TypeDescriptor`].
///
/// ```rust
/// use sql_marshal::prelude::*;
///
/// #[derive(Default)]
/// struct Account {
///     id: i64,
///     owner: String,
/// }
///
/// let descriptor = TypeDescriptor::<Account>::builder()
///     .member(
///         "id",
///         i64::FIELD_TYPE,
///         |a| a.id.to_sql(),
///         |a, v| {
///             a.id = FieldValue::from_sql(v)?;
///             Ok(())
///         },
///     )
///     .readable("owner", String::FIELD_TYPE, |a| a.owner.to_sql())
///     .constructor(Account::default)
///     .build();
/// assert_eq!(descriptor.members().len(), 2);
/// ```
pub struct DescriptorBuilder<T> {
    type_name: &'static str,
    members: Vec<Member<T>>,
    constructor: Option<fn() -> T>,
}

impl<T> DescriptorBuilder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            members: Vec::new(),
            constructor: None,
        }
    }

    #[must_use]
    pub fn type_name(mut self, type_name: &'static str) -> Self {
        self.type_name = type_name;
        self
    }

    /// A member that is both readable and writable.
    #[must_use]
    pub fn member(
        self,
        name: impl Into<String>,
        field_type: FieldType,
        getter: Getter<T>,
        setter: Setter<T>,
    ) -> Self {
        self.push(Member::new(name, field_type, Some(getter), Some(setter)))
    }

    #[must_use]
    pub fn readable(self, name: impl Into<String>, field_type: FieldType, getter: Getter<T>) -> Self {
        self.push(Member::new(name, field_type, Some(getter), None))
    }

    #[must_use]
    pub fn writable(self, name: impl Into<String>, field_type: FieldType, setter: Setter<T>) -> Self {
        self.push(Member::new(name, field_type, None, Some(setter)))
    }

    #[must_use]
    pub fn push(mut self, member: Member<T>) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn constructor(mut self, constructor: fn() -> T) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Finish the descriptor. Structural checks happen when a converter is built.
    #[must_use]
    pub fn build(self) -> TypeDescriptor<T> {
        TypeDescriptor {
            type_name: self.type_name,
            members: self.members,
            constructor: self.constructor,
        }
    }
}

impl<T> Default for DescriptorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A type that can be marshaled to parameters and from result rows.
///
/// Usually implemented through [`data_object!`](crate::data_object).
pub trait DataObject: Sized + 'static {
    fn descriptor() -> TypeDescriptor<Self>;
}
