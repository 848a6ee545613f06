use rusqlite::Statement;
use rusqlite::types::Value;

use crate::adapters::ResultCursor;
use crate::coercion::natural_value;
use crate::error::SqlMarshalError;
use crate::results::ResultSet;
use crate::sql_type::SqlType;
use crate::types::SqlValue;

/// Map a declared SQLite column type to the closest `SqlType`.
///
/// Exact type names (ignoring case and any `(precision, scale)` suffix) win; a few
/// common spellings are aliased; anything else falls back to SQLite's affinity rules.
/// Expression columns have no declared type and report `OTHER`.
#[must_use]
pub fn decl_type_to_sql_type(decl_type: Option<&str>) -> SqlType {
    let Some(decl) = decl_type else {
        return SqlType::Other;
    };
    let base = decl.split('(').next().unwrap_or(decl).trim().to_ascii_uppercase();
    if base.is_empty() {
        return SqlType::Other;
    }

    let aliased = match base.as_str() {
        "INT" | "MEDIUMINT" | "INT4" => Some(SqlType::Integer),
        "INT2" => Some(SqlType::SmallInt),
        "INT8" | "UNSIGNED BIG INT" => Some(SqlType::BigInt),
        "BOOL" => Some(SqlType::Boolean),
        "TEXT" | "STRING" | "NVARCHAR" | "VARCHAR2" | "CHARACTER VARYING" => {
            Some(SqlType::Varchar)
        }
        "NCHAR" | "CHARACTER" => Some(SqlType::Char),
        "REAL" | "DOUBLE PRECISION" => Some(SqlType::Double),
        "DATETIME" => Some(SqlType::Timestamp),
        "BYTEA" => Some(SqlType::VarBinary),
        "JSON" | "JSONB" => Some(SqlType::Other),
        _ => None,
    };
    if let Some(sql_type) = aliased.or_else(|| SqlType::from_name(&base)) {
        return sql_type;
    }

    if base.contains("INT") {
        SqlType::BigInt
    } else if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
        SqlType::Varchar
    } else if base.contains("BLOB") {
        SqlType::Blob
    } else if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
        SqlType::Double
    } else {
        SqlType::Numeric
    }
}

/// Extract the storage-class value of a `SQLite` row column.
///
/// # Errors
///
/// Returns `SqlMarshalError::SqliteError` if the column cannot be read.
pub fn sqlite_storage_value(row: &rusqlite::Row<'_>, idx: usize) -> Result<SqlValue, SqlMarshalError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::BigInt(i),
        Value::Real(f) => SqlValue::Double(f),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Bytes(b),
    })
}

/// Column labels and declared types of a prepared statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub labels: Vec<String>,
    pub types: Vec<SqlType>,
}

#[must_use]
pub fn column_meta(stmt: &Statement<'_>) -> ColumnMeta {
    let (labels, types) = stmt
        .columns()
        .iter()
        .map(|col| (col.name().to_string(), decl_type_to_sql_type(col.decl_type())))
        .unzip();
    ColumnMeta { labels, types }
}

/// A `SQLite` row viewed as a result cursor.
pub struct SqliteRow<'r, 's> {
    row: &'r rusqlite::Row<'s>,
    meta: &'r ColumnMeta,
}

impl<'r, 's> SqliteRow<'r, 's> {
    #[must_use]
    pub fn new(row: &'r rusqlite::Row<'s>, meta: &'r ColumnMeta) -> Self {
        Self { row, meta }
    }
}

impl ResultCursor for SqliteRow<'_, '_> {
    fn column_count(&self) -> usize {
        self.meta.labels.len()
    }

    fn column_label(&self, index: usize) -> Result<&str, SqlMarshalError> {
        self.meta
            .labels
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| SqlMarshalError::Execution(format!("no column at index {index}")))
    }

    fn column_type(&self, index: usize) -> Result<SqlType, SqlMarshalError> {
        self.meta
            .types
            .get(index)
            .copied()
            .ok_or_else(|| SqlMarshalError::Execution(format!("no column at index {index}")))
    }

    fn fetch(&self, index: usize, sql_type: SqlType) -> Result<SqlValue, SqlMarshalError> {
        Ok(natural_value(sqlite_storage_value(self.row, index)?, sql_type))
    }
}

/// Build a result set from a `SQLite` statement whose parameters are already bound.
///
/// Values arrive in the natural representation of each column's declared type.
///
/// # Errors
/// Returns `SqlMarshalError::SqliteError` if query execution or row extraction fails.
pub fn build_result_set(stmt: &mut Statement<'_>) -> Result<ResultSet, SqlMarshalError> {
    let meta = column_meta(stmt);
    let mut result_set = ResultSet::with_capacity(meta.labels.clone(), meta.types.clone(), 10);

    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let cursor = SqliteRow::new(row, &meta);
        let row_values = meta
            .types
            .iter()
            .enumerate()
            .map(|(i, sql_type)| cursor.fetch(i, *sql_type))
            .collect::<Result<Vec<_>, _>>()?;
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
