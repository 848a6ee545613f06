// SQLite execution adapter
//
// - params: value conversion and the statement binding handle
// - query: declared-type mapping, row cursor and result building
// - executor: template and raw-array entry points over a rusqlite connection

pub mod executor;
pub mod params;
pub mod query;

pub use executor::{
    execute_batch_objects, execute_batch_values, execute_object, execute_statements,
    execute_values, select_objects, select_rows, select_values,
};
pub use params::{SqliteStatement, sql_value_to_sqlite_value};
pub use query::{
    ColumnMeta, SqliteRow, build_result_set, column_meta, decl_type_to_sql_type,
    sqlite_storage_value,
};
