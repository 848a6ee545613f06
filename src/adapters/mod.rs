//! Boundary contracts with the execution layer.
//!
//! The engine never owns a statement or a cursor; it borrows one per call through
//! these traits. Parameter positions are 1-based, column positions 0-based.

mod params;

pub use params::{Binding, ParamBuffer};

use crate::error::SqlMarshalError;
use crate::sql_type::SqlType;
use crate::types::SqlValue;

/// A prepared statement accepting positional parameters.
pub trait StatementHandle {
    /// Bind `value` at `index` as the given type code.
    fn bind_typed(
        &mut self,
        index: usize,
        value: SqlValue,
        sql_type: SqlType,
    ) -> Result<(), SqlMarshalError>;

    /// Bind `value` at `index` leaving the type to the driver.
    fn bind_untyped(&mut self, index: usize, value: SqlValue) -> Result<(), SqlMarshalError>;

    /// Bind SQL NULL at `index`.
    fn bind_null(&mut self, index: usize, sql_type: SqlType) -> Result<(), SqlMarshalError>;
}

/// The current row of a query result, with its column metadata.
pub trait ResultCursor {
    fn column_count(&self) -> usize;

    fn column_label(&self, index: usize) -> Result<&str, SqlMarshalError>;

    fn column_type(&self, index: usize) -> Result<SqlType, SqlMarshalError>;

    /// Fetch the column in the natural representation of `sql_type`.
    fn fetch(&self, index: usize, sql_type: SqlType) -> Result<SqlValue, SqlMarshalError>;
}

/// All column labels of a cursor, in column order.
///
/// # Errors
/// Propagates label lookup failures from the cursor.
pub fn column_labels<C>(cursor: &C) -> Result<Vec<String>, SqlMarshalError>
where
    C: ResultCursor + ?Sized,
{
    (0..cursor.column_count())
        .map(|i| cursor.column_label(i).map(str::to_string))
        .collect()
}

/// All column types of a cursor, in column order.
///
/// # Errors
/// Propagates type lookup failures from the cursor.
pub fn column_types<C>(cursor: &C) -> Result<Vec<SqlType>, SqlMarshalError>
where
    C: ResultCursor + ?Sized,
{
    (0..cursor.column_count())
        .map(|i| cursor.column_type(i))
        .collect()
}
