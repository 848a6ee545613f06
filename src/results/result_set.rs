use std::collections::HashMap;
use std::sync::Arc;

use super::row::{CustomDbRow, index_labels};
use crate::adapters::ResultCursor;
use crate::convert::get_converter;
use crate::error::SqlMarshalError;
use crate::object::DataObject;
use crate::sql_type::SqlType;
use crate::types::SqlValue;

/// A result set from a query
///
/// This struct represents the rows returned by a query together with the metadata
/// shared by all of them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    column_names: Arc<Vec<String>>,
    column_types: Arc<Vec<SqlType>>,
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    /// Create an empty result set with the given column metadata
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column labels, in column order
    /// * `column_types` - The declared type of each column
    #[must_use]
    pub fn new(column_names: Vec<String>, column_types: Vec<SqlType>) -> ResultSet {
        let column_index_cache = Arc::new(index_labels(&column_names));
        ResultSet {
            results: Vec::new(),
            column_names: Arc::new(column_names),
            column_types: Arc::new(column_types),
            column_index_cache,
        }
    }

    /// Create a new result set with a known row capacity
    #[must_use]
    pub fn with_capacity(
        column_names: Vec<String>,
        column_types: Vec<SqlType>,
        capacity: usize,
    ) -> ResultSet {
        let mut rs = ResultSet::new(column_names, column_types);
        rs.results.reserve(capacity);
        rs
    }

    /// Get the column labels for this result set
    #[must_use]
    pub fn get_column_names(&self) -> &Arc<Vec<String>> {
        &self.column_names
    }

    #[must_use]
    pub fn get_column_types(&self) -> &Arc<Vec<SqlType>> {
        &self.column_types
    }

    /// Add a row to the result set
    ///
    /// # Arguments
    ///
    /// * `row_values` - The values for this row, in column order
    pub fn add_row_values(&mut self, row_values: Vec<SqlValue>) {
        self.results.push(CustomDbRow {
            column_names: Arc::clone(&self.column_names),
            column_types: Arc::clone(&self.column_types),
            rows: row_values,
            column_index_cache: Arc::clone(&self.column_index_cache),
        });
    }

    #[must_use]
    pub fn rows(&self) -> &[CustomDbRow] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CustomDbRow> {
        self.results.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// A forward-only cursor over the rows
    #[must_use]
    pub fn cursor(&self) -> RowCursor<'_> {
        RowCursor {
            set: self,
            position: None,
        }
    }

    /// Read every row into `T` through its cached converter
    ///
    /// # Errors
    ///
    /// Converter build failures for `T`, or coercion failures naming the member.
    pub fn read_objects<T: DataObject>(&self) -> Result<Vec<T>, SqlMarshalError> {
        let converter = get_converter::<T>()?;
        let codes = converter.map_column_codes(self.column_names.as_slice());
        self.results
            .iter()
            .map(|row| converter.read(row, &codes))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a CustomDbRow;
    type IntoIter = std::slice::Iter<'a, CustomDbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Forward-only cursor over a [`ResultSet`], positioned before the first row.
#[derive(Debug, Clone)]
pub struct RowCursor<'a> {
    set: &'a ResultSet,
    position: Option<usize>,
}

impl<'a> RowCursor<'a> {
    /// Advance to the next row; `false` once the rows are exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next.min(self.set.results.len()));
        next < self.set.results.len()
    }

    #[must_use]
    pub fn current(&self) -> Option<&'a CustomDbRow> {
        self.position.and_then(|p| self.set.results.get(p))
    }

    fn row(&self) -> Result<&'a CustomDbRow, SqlMarshalError> {
        self.current()
            .ok_or_else(|| SqlMarshalError::Execution("cursor is not on a row".into()))
    }
}

impl ResultCursor for RowCursor<'_> {
    fn column_count(&self) -> usize {
        self.set.column_names.len()
    }

    fn column_label(&self, index: usize) -> Result<&str, SqlMarshalError> {
        self.set
            .column_names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| {
                SqlMarshalError::Execution(format!("column index {index} out of range"))
            })
    }

    fn column_type(&self, index: usize) -> Result<SqlType, SqlMarshalError> {
        self.row()?.column_type(index)
    }

    fn fetch(&self, index: usize, sql_type: SqlType) -> Result<SqlValue, SqlMarshalError> {
        self.row()?.fetch(index, sql_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::column_labels;

    crate::data_object! {
        #[derive(Debug, PartialEq)]
        struct Person {
            id: i64,
            name: String,
        }
    }

    fn people() -> ResultSet {
        let mut rs = ResultSet::new(
            vec!["name".into(), "id".into(), "ignored".into()],
            vec![SqlType::Varchar, SqlType::BigInt, SqlType::Integer],
        );
        rs.add_row_values(vec!["ann".into(), SqlValue::BigInt(1), SqlValue::Int(9)]);
        rs.add_row_values(vec!["bob".into(), SqlValue::BigInt(2), SqlValue::Null]);
        rs
    }

    #[test]
    fn rows_share_metadata() {
        let rs = people();
        assert_eq!(rs.len(), 2);
        let first = &rs.rows()[0];
        assert!(Arc::ptr_eq(&first.column_names, rs.get_column_names()));
        assert_eq!(first.get("id"), Some(&SqlValue::BigInt(1)));
        assert_eq!(first.get("missing"), None);
        assert_eq!(column_labels(first).unwrap(), ["name", "id", "ignored"]);
        assert_eq!(first.column_type(1).unwrap(), SqlType::BigInt);
        assert!(first.column_type(3).is_err());
    }

    #[test]
    fn read_objects_skips_unknown_columns() {
        let people = people().read_objects::<Person>().unwrap();
        assert_eq!(
            people,
            vec![
                Person {
                    id: 1,
                    name: "ann".into()
                },
                Person {
                    id: 2,
                    name: "bob".into()
                },
            ]
        );
    }

    #[test]
    fn cursor_walks_rows_in_order() {
        let rs = people();
        let converter = get_converter::<Person>().unwrap();
        let mut cursor = rs.cursor();
        assert!(cursor.fetch(0, SqlType::Varchar).is_err());
        let codes = converter.map_labels_of(&cursor).unwrap();

        let mut names = Vec::new();
        while cursor.next() {
            names.push(converter.read(&cursor, &codes).unwrap().name);
        }
        assert_eq!(names, ["ann", "bob"]);
        assert!(!cursor.next());
        assert!(cursor.current().is_none());
    }
}
