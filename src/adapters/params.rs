use super::StatementHandle;
use crate::error::SqlMarshalError;
use crate::sql_type::SqlType;
use crate::types::SqlValue;

static NULL_VALUE: SqlValue = SqlValue::Null;

/// Highest position a [`ParamBuffer`] accepts.
pub const MAX_PARAMETERS: usize = 65_535;

/// How one parameter slot was bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Typed { value: SqlValue, sql_type: SqlType },
    Untyped(SqlValue),
    Null(SqlType),
}

impl Binding {
    #[must_use]
    pub fn value(&self) -> &SqlValue {
        match self {
            Binding::Typed { value, .. } | Binding::Untyped(value) => value,
            Binding::Null(_) => &NULL_VALUE,
        }
    }

    #[must_use]
    pub fn into_value(self) -> SqlValue {
        match self {
            Binding::Typed { value, .. } | Binding::Untyped(value) => value,
            Binding::Null(_) => SqlValue::Null,
        }
    }

    /// The explicit type code, if the slot was bound with one.
    #[must_use]
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            Binding::Typed { sql_type, .. } | Binding::Null(sql_type) => Some(*sql_type),
            Binding::Untyped(_) => None,
        }
    }
}

/// In-memory statement handle that records every binding.
///
/// Useful for building parameter vectors for drivers that take a value slice, and
/// for inspecting what a converter would bind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamBuffer {
    slots: Vec<Option<Binding>>,
}

impl ParamBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, index: usize) -> Result<&mut Option<Binding>, SqlMarshalError> {
        let slot = index
            .checked_sub(1)
            .ok_or_else(|| SqlMarshalError::Parameter("parameter index is 1-based".into()))?;
        if index > MAX_PARAMETERS {
            return Err(SqlMarshalError::Parameter(format!(
                "parameter index {index} out of range 1..={MAX_PARAMETERS}"
            )));
        }
        if self.slots.len() <= slot {
            self.slots.resize(slot + 1, None);
        }
        Ok(&mut self.slots[slot])
    }

    /// Binding at a 1-based position, `None` if never bound.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Binding> {
        index
            .checked_sub(1)
            .and_then(|slot| self.slots.get(slot))
            .and_then(Option::as_ref)
    }

    #[must_use]
    pub fn is_bound(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Highest bound position.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Every slot in position order; unbound slots are `None`.
    pub fn bindings(&self) -> impl Iterator<Item = Option<&Binding>> {
        self.slots.iter().map(Option::as_ref)
    }

    /// Values in position order, with unbound slots as NULL.
    #[must_use]
    pub fn into_values(self) -> Vec<SqlValue> {
        self.slots
            .into_iter()
            .map(|slot| slot.map_or(SqlValue::Null, Binding::into_value))
            .collect()
    }
}

impl StatementHandle for ParamBuffer {
    fn bind_typed(
        &mut self,
        index: usize,
        value: SqlValue,
        sql_type: SqlType,
    ) -> Result<(), SqlMarshalError> {
        *self.slot(index)? = Some(Binding::Typed { value, sql_type });
        Ok(())
    }

    fn bind_untyped(&mut self, index: usize, value: SqlValue) -> Result<(), SqlMarshalError> {
        *self.slot(index)? = Some(Binding::Untyped(value));
        Ok(())
    }

    fn bind_null(&mut self, index: usize, sql_type: SqlType) -> Result<(), SqlMarshalError> {
        *self.slot(index)? = Some(Binding::Null(sql_type));
        Ok(())
    }
}
