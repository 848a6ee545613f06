//! Parameter and column type codes.
//!
//! The numeric codes match the JDBC `java.sql.Types` constants so type codes coming
//! from foreign metadata (or persisted mappings) can be carried verbatim.

use serde::{Deserialize, Serialize};

use crate::types::{SqlValue, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Null,
    Other,
    JavaObject,
    Distinct,
    Struct,
    Array,
    Blob,
    Clob,
    Ref,
    Datalink,
    Boolean,
}

const CODES: &[(SqlType, i32, &str)] = &[
    (SqlType::Bit, -7, "BIT"),
    (SqlType::TinyInt, -6, "TINYINT"),
    (SqlType::SmallInt, 5, "SMALLINT"),
    (SqlType::Integer, 4, "INTEGER"),
    (SqlType::BigInt, -5, "BIGINT"),
    (SqlType::Float, 6, "FLOAT"),
    (SqlType::Real, 7, "REAL"),
    (SqlType::Double, 8, "DOUBLE"),
    (SqlType::Numeric, 2, "NUMERIC"),
    (SqlType::Decimal, 3, "DECIMAL"),
    (SqlType::Char, 1, "CHAR"),
    (SqlType::Varchar, 12, "VARCHAR"),
    (SqlType::LongVarchar, -1, "LONGVARCHAR"),
    (SqlType::Date, 91, "DATE"),
    (SqlType::Time, 92, "TIME"),
    (SqlType::Timestamp, 93, "TIMESTAMP"),
    (SqlType::Binary, -2, "BINARY"),
    (SqlType::VarBinary, -3, "VARBINARY"),
    (SqlType::LongVarBinary, -4, "LONGVARBINARY"),
    (SqlType::Null, 0, "NULL"),
    (SqlType::Other, 1111, "OTHER"),
    (SqlType::JavaObject, 2000, "JAVA_OBJECT"),
    (SqlType::Distinct, 2001, "DISTINCT"),
    (SqlType::Struct, 2002, "STRUCT"),
    (SqlType::Array, 2003, "ARRAY"),
    (SqlType::Blob, 2004, "BLOB"),
    (SqlType::Clob, 2005, "CLOB"),
    (SqlType::Ref, 2006, "REF"),
    (SqlType::Datalink, 70, "DATALINK"),
    (SqlType::Boolean, 16, "BOOLEAN"),
];

impl SqlType {
    #[must_use]
    pub fn code(self) -> i32 {
        CODES
            .iter()
            .find(|(ty, _, _)| *ty == self)
            .map_or(1111, |(_, code, _)| *code)
    }

    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        CODES
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(ty, _, _)| *ty)
    }

    /// Canonical upper-case name, e.g. `"VARCHAR"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        CODES
            .iter()
            .find(|(ty, _, _)| *ty == self)
            .map_or("OTHER", |(_, _, name)| *name)
    }

    /// Name for a raw type code; unknown codes yield `"Unsupported"`.
    #[must_use]
    pub fn name_of_code(code: i32) -> &'static str {
        Self::from_code(code).map_or("Unsupported", Self::name)
    }

    /// Case-insensitive lookup by canonical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        CODES
            .iter()
            .find(|(_, _, n)| n.eq_ignore_ascii_case(name))
            .map(|(ty, _, _)| *ty)
    }

    /// The type code a value binds as when no explicit code is given.
    ///
    /// Every temporal category reports `Timestamp`.
    #[must_use]
    pub fn for_value(value: &SqlValue) -> Self {
        match value.kind() {
            ValueKind::Null => SqlType::Null,
            ValueKind::Text => SqlType::Varchar,
            ValueKind::Int => SqlType::Integer,
            ValueKind::BigInt => SqlType::BigInt,
            ValueKind::Float => SqlType::Float,
            ValueKind::Double => SqlType::Double,
            ValueKind::SmallInt => SqlType::SmallInt,
            ValueKind::Decimal => SqlType::Numeric,
            ValueKind::Timestamp | ValueKind::Date | ValueKind::Time | ValueKind::DateTime => {
                SqlType::Timestamp
            }
            ValueKind::Bytes => SqlType::VarBinary,
            ValueKind::Blob => SqlType::Blob,
            ValueKind::Clob => SqlType::Clob,
            ValueKind::Char
            | ValueKind::Bool
            | ValueKind::TinyInt
            | ValueKind::Json => SqlType::Other,
        }
    }

    /// The value category a column of this type is fetched as.
    ///
    /// `None` means the driver's storage representation is kept as-is.
    #[must_use]
    pub fn natural_kind(self) -> Option<ValueKind> {
        match self {
            SqlType::Bit | SqlType::Boolean => Some(ValueKind::Bool),
            SqlType::TinyInt => Some(ValueKind::TinyInt),
            SqlType::SmallInt => Some(ValueKind::SmallInt),
            SqlType::Integer => Some(ValueKind::Int),
            SqlType::BigInt => Some(ValueKind::BigInt),
            SqlType::Float | SqlType::Real => Some(ValueKind::Float),
            SqlType::Double => Some(ValueKind::Double),
            SqlType::Numeric | SqlType::Decimal => Some(ValueKind::Decimal),
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar => Some(ValueKind::Text),
            SqlType::Date => Some(ValueKind::Date),
            SqlType::Time => Some(ValueKind::Time),
            SqlType::Timestamp => Some(ValueKind::Timestamp),
            SqlType::Binary | SqlType::VarBinary | SqlType::LongVarBinary => {
                Some(ValueKind::Bytes)
            }
            SqlType::Blob => Some(ValueKind::Blob),
            SqlType::Clob => Some(ValueKind::Clob),
            SqlType::Null
            | SqlType::Other
            | SqlType::JavaObject
            | SqlType::Distinct
            | SqlType::Struct
            | SqlType::Array
            | SqlType::Ref
            | SqlType::Datalink => None,
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_the_table() {
        for (ty, code, name) in CODES {
            assert_eq!(ty.code(), *code);
            assert_eq!(SqlType::from_code(*code), Some(*ty));
            assert_eq!(ty.name(), *name);
        }
    }

    #[test]
    fn unknown_code_is_unsupported() {
        assert_eq!(SqlType::name_of_code(-9), "Unsupported");
        assert_eq!(SqlType::name_of_code(12), "VARCHAR");
        assert_eq!(SqlType::from_name("timestamp"), Some(SqlType::Timestamp));
    }

    #[test]
    fn natural_type_for_values() {
        assert_eq!(SqlType::for_value(&SqlValue::Null), SqlType::Null);
        assert_eq!(SqlType::for_value(&SqlValue::Text("a".into())), SqlType::Varchar);
        assert_eq!(SqlType::for_value(&SqlValue::BigInt(1)), SqlType::BigInt);
        let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(SqlType::for_value(&SqlValue::Date(date)), SqlType::Timestamp);
        assert_eq!(SqlType::for_value(&SqlValue::Bool(true)), SqlType::Other);
        assert_eq!(SqlType::for_value(&SqlValue::Bytes(vec![1])), SqlType::VarBinary);
    }
}
