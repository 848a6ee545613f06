use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde_json::Value as JsonValue;

use crate::error::CoercionError;
use crate::object::FieldType;
use crate::sql_type::SqlType;
use crate::types::{Blob, Clob, SqlValue, ValueKind};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S%.f";
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const TIMESTAMP_PARSE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const TIME_PARSE_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_PARSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(text).map(|ts| ts.date()))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    TIME_PARSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
        .or_else(|| parse_timestamp(text).map(|ts| ts.time()))
}

fn from_unix_seconds(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

fn out_of_range(value: &SqlValue, target: ValueKind) -> CoercionError {
    CoercionError::OutOfRange {
        value: format!("{value:?}"),
        target,
    }
}

fn unparsable(text: &str, target: ValueKind) -> CoercionError {
    CoercionError::Unparsable {
        text: text.to_string(),
        target,
    }
}

fn incompatible(value: &SqlValue, target: ValueKind) -> CoercionError {
    CoercionError::Incompatible {
        from: value.kind(),
        to: target,
    }
}

/// Any numeric-ish source as an exact `i64`.
fn integral(value: &SqlValue, target: ValueKind) -> Result<i64, CoercionError> {
    if let Some(i) = value.as_i64() {
        return Ok(i);
    }
    match value {
        SqlValue::Bool(b) => Ok(i64::from(*b)),
        SqlValue::Float(_) | SqlValue::Double(_) => {
            let f = value.as_f64().unwrap_or(f64::NAN);
            if f.is_finite() && f.fract() == 0.0 {
                f.to_i64().ok_or_else(|| out_of_range(value, target))
            } else {
                Err(out_of_range(value, target))
            }
        }
        SqlValue::Decimal(d) if d.fract().is_zero() => {
            d.to_i64().ok_or_else(|| out_of_range(value, target))
        }
        SqlValue::Decimal(_) => Err(out_of_range(value, target)),
        SqlValue::Text(s) => s.trim().parse().map_err(|_| unparsable(s, target)),
        other => Err(incompatible(other, target)),
    }
}

fn floating(value: &SqlValue, target: ValueKind) -> Result<f64, CoercionError> {
    if let Some(f) = value.as_f64() {
        return Ok(f);
    }
    match value {
        SqlValue::Decimal(d) => d.to_f64().ok_or_else(|| out_of_range(value, target)),
        SqlValue::Text(s) => s.trim().parse().map_err(|_| unparsable(s, target)),
        SqlValue::Bool(b) => Ok(f64::from(u8::from(*b))),
        other => other
            .as_i64()
            .map(|i| i as f64)
            .ok_or_else(|| incompatible(other, target)),
    }
}

fn timestamp_of(value: &SqlValue, target: ValueKind) -> Result<NaiveDateTime, CoercionError> {
    match value {
        SqlValue::Timestamp(ts) => Ok(*ts),
        SqlValue::DateTime(dt) => Ok(dt.naive_utc()),
        SqlValue::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
        SqlValue::Text(s) => parse_timestamp(s).ok_or_else(|| unparsable(s, target)),
        other => match other.as_i64() {
            Some(secs) => from_unix_seconds(secs)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| out_of_range(other, target)),
            None => Err(incompatible(other, target)),
        },
    }
}

fn text_of(value: &SqlValue) -> Result<String, CoercionError> {
    Ok(match value {
        SqlValue::Text(s) | SqlValue::Clob(Clob(s)) => s.clone(),
        SqlValue::Char(c) => c.to_string(),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::TinyInt(_) | SqlValue::SmallInt(_) | SqlValue::Int(_) | SqlValue::BigInt(_) => {
            value.as_i64().map(|i| i.to_string()).unwrap_or_default()
        }
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Double(f) => f.to_string(),
        SqlValue::Decimal(d) => d.to_string(),
        SqlValue::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        SqlValue::Date(d) => d.format(DATE_FORMAT).to_string(),
        SqlValue::Time(t) => t.format(TIME_FORMAT).to_string(),
        SqlValue::DateTime(dt) => dt.to_rfc3339(),
        SqlValue::Json(j) => j.to_string(),
        SqlValue::Null | SqlValue::Bytes(_) | SqlValue::Blob(_) => {
            return Err(incompatible(value, ValueKind::Text));
        }
    })
}

/// Convert a non-NULL value to the category `target`.
///
/// # Errors
/// Returns a `CoercionError` when no conversion exists, a narrowing would overflow, or
/// text cannot be parsed as the target.
pub fn convert(value: &SqlValue, target: ValueKind) -> Result<SqlValue, CoercionError> {
    if value.kind() == target {
        return Ok(value.clone());
    }
    if value.is_null() {
        return Err(CoercionError::UnexpectedNull(target));
    }

    match target {
        ValueKind::TinyInt => {
            let i = integral(value, target)?;
            i8::try_from(i)
                .map(SqlValue::TinyInt)
                .map_err(|_| out_of_range(value, target))
        }
        ValueKind::SmallInt => {
            let i = integral(value, target)?;
            i16::try_from(i)
                .map(SqlValue::SmallInt)
                .map_err(|_| out_of_range(value, target))
        }
        ValueKind::Int => {
            let i = integral(value, target)?;
            i32::try_from(i)
                .map(SqlValue::Int)
                .map_err(|_| out_of_range(value, target))
        }
        ValueKind::BigInt => integral(value, target).map(SqlValue::BigInt),
        ValueKind::Float => {
            let f = floating(value, target)?;
            if f.is_finite() && f.abs() > f64::from(f32::MAX) {
                Err(out_of_range(value, target))
            } else {
                Ok(SqlValue::Float(f as f32))
            }
        }
        ValueKind::Double => floating(value, target).map(SqlValue::Double),
        ValueKind::Decimal => match value {
            SqlValue::Text(s) => Decimal::from_str(s.trim())
                .map(SqlValue::Decimal)
                .map_err(|_| unparsable(s, target)),
            SqlValue::Float(_) | SqlValue::Double(_) => {
                let f = value.as_f64().unwrap_or(f64::NAN);
                Decimal::from_str(&f.to_string())
                    .ok()
                    .or_else(|| Decimal::from_f64(f))
                    .map(SqlValue::Decimal)
                    .ok_or_else(|| out_of_range(value, target))
            }
            other => match other.as_i64() {
                Some(i) => Ok(SqlValue::Decimal(Decimal::from(i))),
                None => Err(incompatible(other, target)),
            },
        },
        ValueKind::Bool => match value {
            SqlValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "y" | "yes" => Ok(SqlValue::Bool(true)),
                "false" | "f" | "0" | "n" | "no" => Ok(SqlValue::Bool(false)),
                _ => Err(unparsable(s, target)),
            },
            other => match other.as_i64() {
                Some(i) => Ok(SqlValue::Bool(i != 0)),
                None => Err(incompatible(other, target)),
            },
        },
        ValueKind::Text => text_of(value).map(SqlValue::Text),
        ValueKind::Char => {
            let text = text_of(value).map_err(|_| incompatible(value, target))?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(SqlValue::Char(c)),
                _ => Err(unparsable(&text, target)),
            }
        }
        ValueKind::Clob => text_of(value)
            .map(|s| SqlValue::Clob(Clob(s)))
            .map_err(|_| incompatible(value, target)),
        ValueKind::Timestamp => timestamp_of(value, target).map(SqlValue::Timestamp),
        ValueKind::DateTime => match value {
            SqlValue::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| parse_timestamp(s).map(|ts| Utc.from_utc_datetime(&ts)))
                .map(SqlValue::DateTime)
                .ok_or_else(|| unparsable(s, target)),
            other => timestamp_of(other, target)
                .map(|ts| SqlValue::DateTime(Utc.from_utc_datetime(&ts))),
        },
        ValueKind::Date => match value {
            SqlValue::Text(s) => parse_date(s)
                .map(SqlValue::Date)
                .ok_or_else(|| unparsable(s, target)),
            other => timestamp_of(other, target).map(|ts| SqlValue::Date(ts.date())),
        },
        ValueKind::Time => match value {
            SqlValue::Time(t) => Ok(SqlValue::Time(*t)),
            SqlValue::Text(s) => parse_time(s)
                .map(SqlValue::Time)
                .ok_or_else(|| unparsable(s, target)),
            SqlValue::Timestamp(_) | SqlValue::DateTime(_) => {
                timestamp_of(value, target).map(|ts| SqlValue::Time(ts.time()))
            }
            other => Err(incompatible(other, target)),
        },
        ValueKind::Bytes => match value {
            SqlValue::Blob(Blob(bytes)) => Ok(SqlValue::Bytes(bytes.clone())),
            other => Err(incompatible(other, target)),
        },
        ValueKind::Blob => match value {
            SqlValue::Bytes(bytes) => Ok(SqlValue::Blob(Blob(bytes.clone()))),
            other => Err(incompatible(other, target)),
        },
        ValueKind::Json => match value {
            SqlValue::Text(s) | SqlValue::Clob(Clob(s)) => serde_json::from_str(s)
                .map(SqlValue::Json)
                .map_err(|_| unparsable(s, target)),
            SqlValue::Bool(b) => Ok(SqlValue::Json(JsonValue::Bool(*b))),
            SqlValue::Float(_) | SqlValue::Double(_) => value
                .as_f64()
                .and_then(serde_json::Number::from_f64)
                .map(|n| SqlValue::Json(JsonValue::Number(n)))
                .ok_or_else(|| out_of_range(value, target)),
            other => match other.as_i64() {
                Some(i) => Ok(SqlValue::Json(JsonValue::from(i))),
                None => Err(incompatible(other, target)),
            },
        },
        ValueKind::Null => Err(incompatible(value, target)),
    }
}

/// Coerce a fetched column value to a member's declared type.
///
/// NULL passes only into optional members; a non-optional member receiving NULL is
/// the unboxing failure of a primitive destination.
///
/// # Errors
/// See [`convert`]; additionally `CoercionError::UnexpectedNull`.
pub fn coerce_to(value: SqlValue, field: FieldType) -> Result<SqlValue, CoercionError> {
    if value.is_null() {
        return if field.optional {
            Ok(SqlValue::Null)
        } else {
            Err(CoercionError::UnexpectedNull(field.kind))
        };
    }
    if value.kind() == field.kind {
        return Ok(value);
    }
    convert(&value, field.kind)
}

/// Reshape a driver value into the natural representation of a column type.
///
/// Values that do not fit the declared type are returned unchanged; the member-level
/// coercion decides what to do with them.
#[must_use]
pub fn natural_value(value: SqlValue, sql_type: SqlType) -> SqlValue {
    match sql_type.natural_kind() {
        Some(kind) if !value.is_null() && value.kind() != kind => {
            convert(&value, kind).unwrap_or(value)
        }
        _ => value,
    }
}
