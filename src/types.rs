use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

/// Values moved across the statement/result boundary.
///
/// Every parameter bound and every column fetched is one of these categories, so the
/// dispatch code can match exhaustively instead of inspecting runtime types:
/// ```rust
/// use sql_marshal::prelude::*;
///
/// let params = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Null,
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Character data
    Text(String),
    /// A single character
    Char(char),
    /// Boolean value
    Bool(bool),
    /// 8-bit integer
    TinyInt(i8),
    /// 16-bit integer
    SmallInt(i16),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    BigInt(i64),
    /// Single precision float
    Float(f32),
    /// Double precision float
    Double(f64),
    /// Exact decimal
    Decimal(Decimal),
    /// Date and time without zone
    Timestamp(NaiveDateTime),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Generic instant; binds with timestamp semantics
    DateTime(DateTime<Utc>),
    /// Byte array
    Bytes(Vec<u8>),
    /// Large binary object
    Blob(Blob),
    /// Large character object
    Clob(Clob),
    /// JSON document, bound untyped
    Json(JsonValue),
}

/// Large binary object payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Blob(pub Vec<u8>);

/// Large character object payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clob(pub String);

/// The category of a [`SqlValue`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Text,
    Char,
    Bool,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal,
    Timestamp,
    Date,
    Time,
    DateTime,
    Bytes,
    Blob,
    Clob,
    Json,
}

impl ValueKind {
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ValueKind::TinyInt | ValueKind::SmallInt | ValueKind::Int | ValueKind::BigInt
        )
    }

    #[must_use]
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            ValueKind::Timestamp | ValueKind::Date | ValueKind::Time | ValueKind::DateTime
        )
    }
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            SqlValue::Null => ValueKind::Null,
            SqlValue::Text(_) => ValueKind::Text,
            SqlValue::Char(_) => ValueKind::Char,
            SqlValue::Bool(_) => ValueKind::Bool,
            SqlValue::TinyInt(_) => ValueKind::TinyInt,
            SqlValue::SmallInt(_) => ValueKind::SmallInt,
            SqlValue::Int(_) => ValueKind::Int,
            SqlValue::BigInt(_) => ValueKind::BigInt,
            SqlValue::Float(_) => ValueKind::Float,
            SqlValue::Double(_) => ValueKind::Double,
            SqlValue::Decimal(_) => ValueKind::Decimal,
            SqlValue::Timestamp(_) => ValueKind::Timestamp,
            SqlValue::Date(_) => ValueKind::Date,
            SqlValue::Time(_) => ValueKind::Time,
            SqlValue::DateTime(_) => ValueKind::DateTime,
            SqlValue::Bytes(_) => ValueKind::Bytes,
            SqlValue::Blob(_) => ValueKind::Blob,
            SqlValue::Clob(_) => ValueKind::Clob,
            SqlValue::Json(_) => ValueKind::Json,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(value) => Some(value),
            SqlValue::Clob(Clob(value)) => Some(value),
            _ => None,
        }
    }

    /// Any integer category widened to `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::TinyInt(v) => Some(i64::from(*v)),
            SqlValue::SmallInt(v) => Some(i64::from(*v)),
            SqlValue::Int(v) => Some(i64::from(*v)),
            SqlValue::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Float(v) => Some(f64::from(*v)),
            SqlValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SqlValue::Bytes(bytes) | SqlValue::Blob(Blob(bytes)) => Some(bytes),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_sql_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_sql_value! {
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

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(SqlValue::Null.kind(), ValueKind::Null);
        assert_eq!(SqlValue::from(7_i16).kind(), ValueKind::SmallInt);
        assert_eq!(SqlValue::from("x").kind(), ValueKind::Text);
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(3_i64)), SqlValue::BigInt(3));
    }

    #[test]
    fn integer_accessor_widens() {
        assert_eq!(SqlValue::TinyInt(-3).as_i64(), Some(-3));
        assert_eq!(SqlValue::Int(i32::MAX).as_i64(), Some(i64::from(i32::MAX)));
        assert_eq!(SqlValue::Double(1.0).as_i64(), None);
        assert!(ValueKind::SmallInt.is_integer());
        assert!(ValueKind::DateTime.is_temporal());
        assert!(!ValueKind::Decimal.is_integer());
    }
}
