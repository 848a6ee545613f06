use rusqlite::{Connection, Statement};
use tracing::debug;

use super::params::SqliteStatement;
use super::query::{SqliteRow, build_result_set, column_meta};
use crate::convert::{TypeConverter, get_converter};
use crate::error::SqlMarshalError;
use crate::object::DataObject;
use crate::params::ParamSet;
use crate::results::ResultSet;
use crate::template::{
    rewrite_template, validate_batch, validate_params, validate_sql, validate_statements,
};

fn read_rows<T>(
    stmt: &mut Statement<'_>,
    converter: &TypeConverter<T>,
) -> Result<Vec<T>, SqlMarshalError> {
    let meta = column_meta(stmt);
    let codes = converter.map_column_codes(&meta.labels);
    let mut rows = stmt.raw_query();
    let mut objects = Vec::new();
    while let Some(row) = rows.next()? {
        objects.push(converter.read(&SqliteRow::new(row, &meta), &codes)?);
    }
    Ok(objects)
}

/// Run a `#{name}` template with a data object as the parameter source and read every
/// row into `T`.
///
/// # Errors
///
/// Returns `SqlMarshalError` if validation, binding, execution or row mapping fails.
pub fn select_objects<T, P>(
    conn: &Connection,
    template: &str,
    params: &P,
) -> Result<Vec<T>, SqlMarshalError>
where
    T: DataObject,
    P: DataObject,
{
    let parsed = rewrite_template(template);
    validate_sql(parsed.sql(), parsed.parameter_count())?;
    let binder = get_converter::<P>()?;
    let reader = get_converter::<T>()?;

    debug!(sql = parsed.sql(), "sqlite select objects");
    let mut stmt = conn.prepare(parsed.sql())?;
    binder.bind(
        &mut SqliteStatement::new(&mut stmt),
        params,
        parsed.parameter_names(),
    )?;
    read_rows(&mut stmt, &reader)
}

/// Run plain SQL with positional parameters and read every row into `T`.
///
/// # Errors
///
/// Returns `SqlMarshalError` if validation, binding, execution or row mapping fails.
pub fn select_rows<T: DataObject>(
    conn: &Connection,
    sql: &str,
    params: &ParamSet,
) -> Result<Vec<T>, SqlMarshalError> {
    validate_params(sql, Some(params))?;
    let reader = get_converter::<T>()?;
    let mut stmt = conn.prepare(sql)?;
    params.bind_to(&mut SqliteStatement::new(&mut stmt))?;
    read_rows(&mut stmt, &reader)
}

/// Run plain SQL with positional parameters into an in-memory result set.
///
/// # Errors
///
/// Returns `SqlMarshalError` if validation, binding or execution fails.
pub fn select_values(
    conn: &Connection,
    sql: &str,
    params: &ParamSet,
) -> Result<ResultSet, SqlMarshalError> {
    validate_params(sql, Some(params))?;
    let mut stmt = conn.prepare(sql)?;
    params.bind_to(&mut SqliteStatement::new(&mut stmt))?;
    build_result_set(&mut stmt)
}

/// Execute a DML template with a data object as the parameter source.
///
/// # Errors
///
/// Returns `SqlMarshalError` if validation, binding or execution fails.
pub fn execute_object<P: DataObject>(
    conn: &Connection,
    template: &str,
    params: &P,
) -> Result<usize, SqlMarshalError> {
    let parsed = rewrite_template(template);
    validate_sql(parsed.sql(), parsed.parameter_count())?;
    let binder = get_converter::<P>()?;
    let mut stmt = conn.prepare(parsed.sql())?;
    binder.bind(
        &mut SqliteStatement::new(&mut stmt),
        params,
        parsed.parameter_names(),
    )?;
    Ok(stmt.raw_execute()?)
}

/// Execute a DML template once per object, returning the total rows affected.
///
/// The statement is prepared once; every execution starts from all-NULL parameters.
///
/// # Errors
///
/// Returns `SqlMarshalError` on the first failing execution.
pub fn execute_batch_objects<P: DataObject>(
    conn: &Connection,
    template: &str,
    batch: &[P],
) -> Result<usize, SqlMarshalError> {
    let parsed = rewrite_template(template);
    validate_sql(parsed.sql(), parsed.parameter_count())?;
    let binder = get_converter::<P>()?;
    let mut stmt = conn.prepare(parsed.sql())?;

    let mut affected = 0;
    for params in batch {
        let mut handle = SqliteStatement::new(&mut stmt);
        handle.clear()?;
        binder.bind(&mut handle, params, parsed.parameter_names())?;
        affected += stmt.raw_execute()?;
    }
    debug!(rows = batch.len(), affected, "sqlite batch executed");
    Ok(affected)
}

/// Execute plain SQL with positional parameters.
///
/// # Errors
///
/// Returns `SqlMarshalError` if validation, binding or execution fails.
pub fn execute_values(
    conn: &Connection,
    sql: &str,
    params: &ParamSet,
) -> Result<usize, SqlMarshalError> {
    validate_params(sql, Some(params))?;
    let mut stmt = conn.prepare(sql)?;
    params.bind_to(&mut SqliteStatement::new(&mut stmt))?;
    Ok(stmt.raw_execute()?)
}

/// Execute plain SQL once per parameter set, returning the total rows affected.
///
/// # Errors
///
/// Returns `SqlMarshalError` if any set fails validation, or on the first failing
/// execution.
pub fn execute_batch_values(
    conn: &Connection,
    sql: &str,
    batch: &[ParamSet],
) -> Result<usize, SqlMarshalError> {
    validate_batch(sql, batch)?;
    let mut stmt = conn.prepare(sql)?;
    let mut affected = 0;
    for params in batch {
        let mut handle = SqliteStatement::new(&mut stmt);
        handle.clear()?;
        params.bind_to(&mut handle)?;
        affected += stmt.raw_execute()?;
    }
    Ok(affected)
}

/// Execute parameterless statements in order, returning the total rows affected.
///
/// # Errors
///
/// Returns `SqlMarshalError` if any statement carries a placeholder, or on the first
/// failing execution.
pub fn execute_statements<S: AsRef<str>>(
    conn: &Connection,
    statements: &[S],
) -> Result<usize, SqlMarshalError> {
    validate_statements(statements)?;
    let mut affected = 0;
    for sql in statements {
        affected += conn.execute(sql.as_ref(), [])?;
    }
    Ok(affected)
}
