use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::adapters::StatementHandle;
use crate::error::SqlMarshalError;
use crate::sql_type::SqlType;
use crate::types::{Blob, Clob, SqlValue};

/// The typed binding a value takes when no explicit type code is given.
///
/// `None` means the value is bound untyped. A generic `DateTime` reports `Timestamp`
/// because [`set_parameter`] converts it first.
#[must_use]
pub fn natural_binding(value: &SqlValue) -> Option<SqlType> {
    match value {
        SqlValue::Null => Some(SqlType::Null),
        SqlValue::Text(_) => Some(SqlType::Varchar),
        SqlValue::Int(_) => Some(SqlType::Integer),
        SqlValue::BigInt(_) => Some(SqlType::BigInt),
        SqlValue::SmallInt(_) => Some(SqlType::SmallInt),
        SqlValue::Float(_) => Some(SqlType::Float),
        SqlValue::Double(_) => Some(SqlType::Double),
        SqlValue::TinyInt(_) => Some(SqlType::TinyInt),
        SqlValue::Decimal(_) => Some(SqlType::Numeric),
        SqlValue::Timestamp(_) | SqlValue::DateTime(_) => Some(SqlType::Timestamp),
        SqlValue::Date(_) => Some(SqlType::Date),
        SqlValue::Time(_) => Some(SqlType::Time),
        SqlValue::Bytes(_) => Some(SqlType::VarBinary),
        SqlValue::Blob(_) => Some(SqlType::Blob),
        SqlValue::Clob(_) => Some(SqlType::Clob),
        SqlValue::Char(_) | SqlValue::Bool(_) | SqlValue::Json(_) => None,
    }
}

/// Bind `value` at the 1-based `index` using the binding its category calls for.
///
/// # Errors
/// Propagates errors raised by the statement handle.
pub fn set_parameter<S>(stmt: &mut S, index: usize, value: SqlValue) -> Result<(), SqlMarshalError>
where
    S: StatementHandle + ?Sized,
{
    let value = match value {
        SqlValue::DateTime(dt) => SqlValue::Timestamp(dt.naive_utc()),
        other => other,
    };
    trace!(index, kind = ?value.kind(), "binding parameter");
    match natural_binding(&value) {
        Some(SqlType::Null) => stmt.bind_null(index, SqlType::Null),
        Some(sql_type) => stmt.bind_typed(index, value, sql_type),
        None => stmt.bind_untyped(index, value),
    }
}

/// Bind `value` at `index` as `sql_type`.
///
/// NULL always binds as a typed NULL. A value of the matching category binds
/// directly; a safe widening (integer widths, float to double, integer to decimal,
/// char to text, bytes to blob, between temporal kinds) is applied when one exists.
/// Anything else falls back to an untyped binding instead of failing.
///
/// # Errors
/// Propagates errors raised by the statement handle.
pub fn set_parameter_as<S>(
    stmt: &mut S,
    index: usize,
    value: SqlValue,
    sql_type: SqlType,
) -> Result<(), SqlMarshalError>
where
    S: StatementHandle + ?Sized,
{
    if value.is_null() {
        return stmt.bind_null(index, sql_type);
    }
    match widen(value, sql_type) {
        Ok(value) => {
            trace!(index, %sql_type, "binding typed parameter");
            stmt.bind_typed(index, value, sql_type)
        }
        Err(value) => {
            debug!(
                index,
                %sql_type,
                kind = ?value.kind(),
                "no safe conversion to requested type, binding untyped"
            );
            stmt.bind_untyped(index, value)
        }
    }
}

/// Bind a raw value array at positions `1..=len`.
///
/// # Errors
/// Propagates errors raised by the statement handle.
pub fn bind_values<S>(stmt: &mut S, values: &[SqlValue]) -> Result<(), SqlMarshalError>
where
    S: StatementHandle + ?Sized,
{
    for (i, value) in values.iter().enumerate() {
        set_parameter(stmt, i + 1, value.clone())?;
    }
    Ok(())
}

fn midnight(date: chrono::NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Convert toward `target`, handing the value back unchanged when no safe path exists.
fn widen(value: SqlValue, target: SqlType) -> Result<SqlValue, SqlValue> {
    use SqlType as T;
    use SqlValue as V;

    match target {
        T::Varchar | T::Char | T::LongVarchar => match value {
            V::Text(_) => Ok(value),
            V::Char(c) => Ok(V::Text(c.to_string())),
            other => Err(other),
        },
        T::Boolean | T::Bit => match value {
            V::Bool(_) => Ok(value),
            other => Err(other),
        },
        T::Numeric | T::Decimal => match value {
            V::Decimal(_) => Ok(value),
            other => match other.as_i64() {
                Some(i) => Ok(V::Decimal(Decimal::from(i))),
                None => Err(other),
            },
        },
        T::BigInt => match value.as_i64() {
            Some(i) => Ok(V::BigInt(i)),
            None => Err(value),
        },
        T::Integer => match value {
            V::Int(_) => Ok(value),
            V::SmallInt(i) => Ok(V::Int(i32::from(i))),
            V::TinyInt(i) => Ok(V::Int(i32::from(i))),
            other => Err(other),
        },
        T::SmallInt => match value {
            V::SmallInt(_) => Ok(value),
            V::TinyInt(i) => Ok(V::SmallInt(i16::from(i))),
            other => Err(other),
        },
        T::TinyInt => match value {
            V::TinyInt(_) => Ok(value),
            other => Err(other),
        },
        T::Double => match value {
            V::Double(_) => Ok(value),
            V::Float(f) => Ok(V::Double(f64::from(f))),
            other => Err(other),
        },
        T::Float | T::Real => match value {
            V::Float(_) => Ok(value),
            other => Err(other),
        },
        T::Binary | T::VarBinary | T::LongVarBinary => match value {
            V::Bytes(_) => Ok(value),
            V::Blob(Blob(bytes)) => Ok(V::Bytes(bytes)),
            other => Err(other),
        },
        T::Blob => match value {
            V::Blob(_) => Ok(value),
            V::Bytes(bytes) => Ok(V::Blob(Blob(bytes))),
            other => Err(other),
        },
        T::Clob => match value {
            V::Clob(_) => Ok(value),
            V::Text(text) => Ok(V::Clob(Clob(text))),
            other => Err(other),
        },
        T::Date => match value {
            V::Date(_) => Ok(value),
            V::Timestamp(ts) => Ok(V::Date(ts.date())),
            V::DateTime(dt) => Ok(V::Date(dt.date_naive())),
            other => Err(other),
        },
        T::Timestamp => match value {
            V::Timestamp(_) => Ok(value),
            V::DateTime(dt) => Ok(V::Timestamp(dt.naive_utc())),
            V::Date(date) => Ok(V::Timestamp(midnight(date))),
            other => Err(other),
        },
        T::Time => match value {
            V::Time(_) => Ok(value),
            V::Timestamp(ts) => Ok(V::Time(ts.time())),
            V::DateTime(dt) => Ok(V::Time(dt.naive_utc().time())),
            other => Err(other),
        },
        T::Null
        | T::Other
        | T::JavaObject
        | T::Distinct
        | T::Struct
        | T::Array
        | T::Ref
        | T::Datalink => Err(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Binding, ParamBuffer};
    use chrono::{NaiveDate, TimeZone, Utc};

    const ALL_TYPES: [SqlType; 30] = [
        SqlType::Bit,
        SqlType::TinyInt,
        SqlType::SmallInt,
        SqlType::Integer,
        SqlType::BigInt,
        SqlType::Float,
        SqlType::Real,
        SqlType::Double,
        SqlType::Numeric,
        SqlType::Decimal,
        SqlType::Char,
        SqlType::Varchar,
        SqlType::LongVarchar,
        SqlType::Date,
        SqlType::Time,
        SqlType::Timestamp,
        SqlType::Binary,
        SqlType::VarBinary,
        SqlType::LongVarBinary,
        SqlType::Null,
        SqlType::Other,
        SqlType::JavaObject,
        SqlType::Distinct,
        SqlType::Struct,
        SqlType::Array,
        SqlType::Blob,
        SqlType::Clob,
        SqlType::Ref,
        SqlType::Datalink,
        SqlType::Boolean,
    ];

    fn bound(value: SqlValue) -> Binding {
        let mut buf = ParamBuffer::new();
        set_parameter(&mut buf, 1, value).unwrap();
        buf.get(1).cloned().unwrap()
    }

    fn bound_as(value: SqlValue, sql_type: SqlType) -> Binding {
        let mut buf = ParamBuffer::new();
        set_parameter_as(&mut buf, 1, value, sql_type).unwrap();
        buf.get(1).cloned().unwrap()
    }

    #[test]
    fn null_binds_for_every_type_code() {
        for sql_type in ALL_TYPES {
            assert_eq!(bound_as(SqlValue::Null, sql_type), Binding::Null(sql_type));
        }
        assert_eq!(bound(SqlValue::Null), Binding::Null(SqlType::Null));
    }

    #[test]
    fn untyped_dispatch_follows_value_category() {
        assert_eq!(
            bound(SqlValue::Text("a".into())),
            Binding::Typed {
                value: SqlValue::Text("a".into()),
                sql_type: SqlType::Varchar
            }
        );
        assert_eq!(bound(SqlValue::Int(1)).sql_type(), Some(SqlType::Integer));
        assert_eq!(bound(SqlValue::BigInt(1)).sql_type(), Some(SqlType::BigInt));
        assert_eq!(bound(SqlValue::SmallInt(1)).sql_type(), Some(SqlType::SmallInt));
        assert_eq!(bound(SqlValue::TinyInt(1)).sql_type(), Some(SqlType::TinyInt));
        assert_eq!(bound(SqlValue::Float(1.0)).sql_type(), Some(SqlType::Float));
        assert_eq!(bound(SqlValue::Double(1.0)).sql_type(), Some(SqlType::Double));
        assert_eq!(
            bound(SqlValue::Decimal(Decimal::new(125, 2))).sql_type(),
            Some(SqlType::Numeric)
        );
        assert_eq!(bound(SqlValue::Bytes(vec![1])).sql_type(), Some(SqlType::VarBinary));
        assert_eq!(bound(SqlValue::Blob(Blob(vec![1]))).sql_type(), Some(SqlType::Blob));
        assert_eq!(bound(SqlValue::Clob(Clob("c".into()))).sql_type(), Some(SqlType::Clob));
        assert_eq!(bound(SqlValue::Bool(true)), Binding::Untyped(SqlValue::Bool(true)));
        assert_eq!(
            bound(SqlValue::Json(serde_json::json!({"a": 1}))).sql_type(),
            None
        );
    }

    #[test]
    fn generic_instant_binds_as_timestamp() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(
            bound(SqlValue::DateTime(dt)),
            Binding::Typed {
                value: SqlValue::Timestamp(dt.naive_utc()),
                sql_type: SqlType::Timestamp
            }
        );
    }

    #[test]
    fn explicit_type_widens_temporal_values() {
        let ts = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            bound_as(SqlValue::Timestamp(ts), SqlType::Date),
            Binding::Typed {
                value: SqlValue::Date(ts.date()),
                sql_type: SqlType::Date
            }
        );
        assert_eq!(
            bound_as(SqlValue::Timestamp(ts), SqlType::Time).value(),
            &SqlValue::Time(ts.time())
        );
        assert_eq!(
            bound_as(SqlValue::Date(ts.date()), SqlType::Timestamp).value(),
            &SqlValue::Timestamp(ts.date().and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn explicit_type_widens_numbers() {
        assert_eq!(
            bound_as(SqlValue::TinyInt(3), SqlType::Integer).value(),
            &SqlValue::Int(3)
        );
        assert_eq!(
            bound_as(SqlValue::Int(3), SqlType::Numeric).value(),
            &SqlValue::Decimal(Decimal::from(3))
        );
        assert_eq!(
            bound_as(SqlValue::Float(0.5), SqlType::Double).value(),
            &SqlValue::Double(0.5)
        );
    }

    #[test]
    fn impossible_conversion_falls_back_to_untyped() {
        assert_eq!(
            bound_as(SqlValue::Text("abc".into()), SqlType::Integer),
            Binding::Untyped(SqlValue::Text("abc".into()))
        );
        assert_eq!(
            bound_as(SqlValue::BigInt(1), SqlType::Integer),
            Binding::Untyped(SqlValue::BigInt(1))
        );
        assert_eq!(
            bound_as(SqlValue::Int(1), SqlType::Other),
            Binding::Untyped(SqlValue::Int(1))
        );
    }

    #[test]
    fn raw_arrays_bind_positionally() {
        let mut buf = ParamBuffer::new();
        bind_values(&mut buf, &[SqlValue::Int(1), SqlValue::Null]).unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.get(2), Some(&Binding::Null(SqlType::Null)));
    }
}
