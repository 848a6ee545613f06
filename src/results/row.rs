use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::ResultCursor;
use crate::error::SqlMarshalError;
use crate::sql_type::SqlType;
use crate::types::SqlValue;

/// A row from a query result
///
/// This struct represents a single row from a query result, with access to the
/// column labels and declared column types shared by every row of its result set.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column labels for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The declared column types (shared across all rows in a result set)
    pub column_types: Arc<Vec<SqlType>>,
    /// The values for this row
    pub rows: Vec<SqlValue>,
    // Label to position, built once per result set
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl CustomDbRow {
    /// Create a new row
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column labels
    /// * `column_types` - The declared type of each column
    /// * `rows` - The values for this row
    ///
    /// # Returns
    ///
    /// A new `CustomDbRow` instance
    #[must_use]
    pub fn new(
        column_names: Arc<Vec<String>>,
        column_types: Arc<Vec<SqlType>>,
        rows: Vec<SqlValue>,
    ) -> Self {
        let cache = Arc::new(index_labels(&column_names));
        Self {
            column_names,
            column_types,
            rows,
            column_index_cache: cache,
        }
    }

    /// Get the index of a column by label
    ///
    /// # Returns
    ///
    /// The index of the column, or None if not found
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index_cache.get(column_name).copied()
    }

    /// Get a value from the row by column label
    ///
    /// # Returns
    ///
    /// The value at the column, or None if the column wasn't found
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.rows.get(index)
    }
}

pub(crate) fn index_labels(labels: &[String]) -> HashMap<String, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

fn column_out_of_range(index: usize, count: usize) -> SqlMarshalError {
    SqlMarshalError::Execution(format!(
        "column index {index} out of range for {count} columns"
    ))
}

impl ResultCursor for CustomDbRow {
    fn column_count(&self) -> usize {
        self.column_names.len()
    }

    fn column_label(&self, index: usize) -> Result<&str, SqlMarshalError> {
        self.column_names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| column_out_of_range(index, self.column_names.len()))
    }

    fn column_type(&self, index: usize) -> Result<SqlType, SqlMarshalError> {
        // Rows built without type metadata report every column as OTHER.
        if index < self.column_names.len() {
            Ok(self.column_types.get(index).copied().unwrap_or(SqlType::Other))
        } else {
            Err(column_out_of_range(index, self.column_names.len()))
        }
    }

    fn fetch(&self, index: usize, _sql_type: SqlType) -> Result<SqlValue, SqlMarshalError> {
        self.rows
            .get(index)
            .cloned()
            .ok_or_else(|| column_out_of_range(index, self.rows.len()))
    }
}
