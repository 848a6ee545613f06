//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::adapters::{Binding, ParamBuffer, ResultCursor, StatementHandle};
pub use crate::config::MarshalOptions;
pub use crate::convert::{ColumnCodes, ConverterCache, TypeConverter, get_converter};
pub use crate::error::{BuildError, CoercionError, SqlMarshalError};
pub use crate::object::{DataObject, FieldType, FieldValue, TypeDescriptor};
pub use crate::params::ParamSet;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::sql_type::SqlType;
pub use crate::template::{ParsedSql, rewrite_template, validate_placeholder_count};
pub use crate::types::{Blob, Clob, SqlValue, ValueKind};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{execute_object, select_objects, select_values};
