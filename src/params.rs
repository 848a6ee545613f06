//! Raw positional parameter arrays.

use crate::adapters::StatementHandle;
use crate::coercion::{set_parameter, set_parameter_as};
use crate::error::SqlMarshalError;
use crate::sql_type::SqlType;
use crate::types::SqlValue;

/// One positional parameter, optionally pinned to an explicit type code.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub value: SqlValue,
    pub sql_type: Option<SqlType>,
}

/// An ordered set of parameters for one statement execution.
///
/// ```rust
/// use sql_marshal::prelude::*;
///
/// let mut ps = ParamSet::new();
/// ps.push(42).push("alice").push_typed(None::<String>, SqlType::Varchar);
/// assert_eq!(ps.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamSet {
    params: Vec<Param>,
}

impl ParamSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            params: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.params.push(Param {
            value: value.into(),
            sql_type: None,
        });
        self
    }

    pub fn push_typed(&mut self, value: impl Into<SqlValue>, sql_type: SqlType) -> &mut Self {
        self.params.push(Param {
            value: value.into(),
            sql_type: Some(sql_type),
        });
        self
    }

    pub fn push_null(&mut self, sql_type: SqlType) -> &mut Self {
        self.push_typed(SqlValue::Null, sql_type)
    }

    /// Set the parameter at a 1-based position, padding any gap with NULLs.
    ///
    /// # Errors
    /// Returns `SqlMarshalError::Parameter` for index 0.
    pub fn set(&mut self, index: usize, value: impl Into<SqlValue>) -> Result<(), SqlMarshalError> {
        let slot = index
            .checked_sub(1)
            .ok_or_else(|| SqlMarshalError::Parameter("parameter index is 1-based".into()))?;
        if self.params.len() <= slot {
            self.params.resize(
                slot + 1,
                Param {
                    value: SqlValue::Null,
                    sql_type: None,
                },
            );
        }
        self.params[slot] = Param {
            value: value.into(),
            sql_type: None,
        };
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.params.iter()
    }

    #[must_use]
    pub fn values(&self) -> Vec<SqlValue> {
        self.params.iter().map(|p| p.value.clone()).collect()
    }

    /// Bind every parameter at positions `1..=len`.
    ///
    /// # Errors
    /// Propagates errors raised by the statement handle.
    pub fn bind_to<S>(&self, stmt: &mut S) -> Result<(), SqlMarshalError>
    where
        S: StatementHandle + ?Sized,
    {
        for (i, param) in self.params.iter().enumerate() {
            match param.sql_type {
                Some(sql_type) => set_parameter_as(stmt, i + 1, param.value.clone(), sql_type)?,
                None => set_parameter(stmt, i + 1, param.value.clone())?,
            }
        }
        Ok(())
    }
}

impl From<Vec<SqlValue>> for ParamSet {
    fn from(values: Vec<SqlValue>) -> Self {
        values.into_iter().collect()
    }
}

impl FromIterator<SqlValue> for ParamSet {
    fn from_iter<I: IntoIterator<Item = SqlValue>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|value| Param {
                    value,
                    sql_type: None,
                })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ParamSet {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
