use std::str::FromStr;

use rusqlite::types::Value;
use rust_decimal::Decimal;
use tracing::trace;

use crate::adapters::StatementHandle;
use crate::coercion::{DATE_FORMAT, TIME_FORMAT, TIMESTAMP_FORMAT};
use crate::error::SqlMarshalError;
use crate::sql_type::SqlType;
use crate::types::{Blob, Clob, SqlValue};

/// Convert a single `SqlValue` to a rusqlite `Value`.
///
/// Temporal values are stored as text, decimals as their canonical text and booleans
/// as integers. Columns with NUMERIC affinity turn decimal text into INTEGER or REAL,
/// so [`SqliteStatement`] refuses decimals that would not survive that conversion.
#[must_use]
pub fn sql_value_to_sqlite_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Text(s) | SqlValue::Clob(Clob(s)) => Value::Text(s.clone()),
        SqlValue::Char(c) => Value::Text(c.to_string()),
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::TinyInt(i) => Value::Integer(i64::from(*i)),
        SqlValue::SmallInt(i) => Value::Integer(i64::from(*i)),
        SqlValue::Int(i) => Value::Integer(i64::from(*i)),
        SqlValue::BigInt(i) => Value::Integer(*i),
        SqlValue::Float(f) => Value::Real(f64::from(*f)),
        SqlValue::Double(f) => Value::Real(*f),
        SqlValue::Decimal(d) => Value::Text(d.to_string()),
        SqlValue::Timestamp(ts) => Value::Text(ts.format(TIMESTAMP_FORMAT).to_string()),
        SqlValue::Date(d) => Value::Text(d.format(DATE_FORMAT).to_string()),
        SqlValue::Time(t) => Value::Text(t.format(TIME_FORMAT).to_string()),
        SqlValue::DateTime(dt) => Value::Text(dt.naive_utc().format(TIMESTAMP_FORMAT).to_string()),
        SqlValue::Bytes(bytes) | SqlValue::Blob(Blob(bytes)) => Value::Blob(bytes.clone()),
        SqlValue::Json(json) => Value::Text(json.to_string()),
    }
}

/// Whether SQLite NUMERIC affinity stores `d` without changing its value.
///
/// Integral text that fits an i64 becomes INTEGER. Everything else goes through a
/// double, which must give back the same decimal.
pub(crate) fn survives_numeric_affinity(d: &Decimal) -> bool {
    if d.scale() == 0 && d.to_string().parse::<i64>().is_ok() {
        return true;
    }
    match d.to_string().parse::<f64>() {
        Ok(f) if f.is_finite() => Decimal::from_str(&f.to_string()).is_ok_and(|back| back == *d),
        _ => false,
    }
}

/// A borrowed rusqlite statement accepting positional bindings.
pub struct SqliteStatement<'s, 'c> {
    stmt: &'s mut rusqlite::Statement<'c>,
}

impl<'s, 'c> SqliteStatement<'s, 'c> {
    pub fn new(stmt: &'s mut rusqlite::Statement<'c>) -> Self {
        Self { stmt }
    }

    /// Reset every parameter of the statement to NULL.
    ///
    /// # Errors
    ///
    /// Returns `SqlMarshalError::SqliteError` if rusqlite rejects a binding.
    pub fn clear(&mut self) -> Result<(), SqlMarshalError> {
        for index in 1..=self.stmt.parameter_count() {
            self.stmt.raw_bind_parameter(index, Value::Null)?;
        }
        Ok(())
    }

    fn bind_value(&mut self, index: usize, value: &SqlValue) -> Result<(), SqlMarshalError> {
        if index == 0 || index > self.stmt.parameter_count() {
            return Err(SqlMarshalError::Parameter(format!(
                "parameter index {index} out of range 1..={}",
                self.stmt.parameter_count()
            )));
        }
        if let SqlValue::Decimal(d) = value {
            if !survives_numeric_affinity(d) {
                return Err(SqlMarshalError::Parameter(format!(
                    "decimal {d} at parameter {index} exceeds the precision sqlite keeps"
                )));
            }
        }
        self.stmt
            .raw_bind_parameter(index, sql_value_to_sqlite_value(value))?;
        Ok(())
    }
}

impl StatementHandle for SqliteStatement<'_, '_> {
    fn bind_typed(
        &mut self,
        index: usize,
        value: SqlValue,
        sql_type: SqlType,
    ) -> Result<(), SqlMarshalError> {
        trace!(index, %sql_type, "sqlite typed bind");
        self.bind_value(index, &value)
    }

    fn bind_untyped(&mut self, index: usize, value: SqlValue) -> Result<(), SqlMarshalError> {
        self.bind_value(index, &value)
    }

    fn bind_null(&mut self, index: usize, _sql_type: SqlType) -> Result<(), SqlMarshalError> {
        self.bind_value(index, &SqlValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn values_map_to_storage_classes() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 5, 600)
            .unwrap();
        assert_eq!(
            sql_value_to_sqlite_value(&SqlValue::Timestamp(ts)),
            Value::Text("2024-01-02 03:04:05.600".into())
        );
        assert_eq!(
            sql_value_to_sqlite_value(&SqlValue::Bool(true)),
            Value::Integer(1)
        );
        assert_eq!(
            sql_value_to_sqlite_value(&SqlValue::Decimal(Decimal::new(1050, 2))),
            Value::Text("10.50".into())
        );
        assert_eq!(
            sql_value_to_sqlite_value(&SqlValue::Char('x')),
            Value::Text("x".into())
        );
    }

    #[test]
    fn decimals_beyond_double_precision_are_refused() {
        let exact = ["12.34", "10.50", "-0.001", "12345678901234567", "0"];
        for text in exact {
            assert!(survives_numeric_affinity(&Decimal::from_str(text).unwrap()), "{text}");
        }
        let lossy = ["12345678901234567.89", "0.1234567890123456789", "12345678901234567.00"];
        for text in lossy {
            assert!(!survives_numeric_affinity(&Decimal::from_str(text).unwrap()), "{text}");
        }

        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT ?").unwrap();
        let mut handle = SqliteStatement::new(&mut stmt);
        let wide = Decimal::from_str("12345678901234567.89").unwrap();
        assert!(matches!(
            handle.bind_untyped(1, SqlValue::Decimal(wide)),
            Err(SqlMarshalError::Parameter(_))
        ));
    }

    #[test]
    fn out_of_range_index_is_a_parameter_error() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT ?").unwrap();
        let mut handle = SqliteStatement::new(&mut stmt);
        handle.bind_untyped(1, SqlValue::Int(1)).unwrap();
        assert!(matches!(
            handle.bind_untyped(2, SqlValue::Int(2)),
            Err(SqlMarshalError::Parameter(_))
        ));
    }
}
