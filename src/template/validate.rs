use crate::config::validate_sql_enabled;
use crate::error::SqlMarshalError;
use crate::params::ParamSet;
use crate::types::SqlValue;

use super::scanner::count_placeholders;

/// Positional placeholder marker.
pub const PARAMETER_MARKER: char = '?';
/// Delimiter of quoted string literals.
pub const QUOTE_DELIMITER: char = '\'';

/// Check that `sql` holds exactly `expected` placeholders. Always scans.
///
/// # Errors
/// Returns `SqlMarshalError::MalformedSql` if the text cannot be scanned, or
/// `SqlMarshalError::ParameterCountMismatch` carrying both counts and the SQL.
pub fn validate_placeholder_count(sql: &str, expected: usize) -> Result<(), SqlMarshalError> {
    let holder_size = count_placeholders(sql, PARAMETER_MARKER, QUOTE_DELIMITER)?;
    if holder_size == expected {
        Ok(())
    } else {
        Err(SqlMarshalError::ParameterCountMismatch {
            sql: sql.to_string(),
            holder_size,
            expected,
        })
    }
}

/// [`validate_placeholder_count`] gated on the process-wide switch.
///
/// # Errors
/// As [`validate_placeholder_count`]; never errors while validation is disabled.
pub fn validate_sql(sql: &str, expected: usize) -> Result<(), SqlMarshalError> {
    if !validate_sql_enabled() {
        return Ok(());
    }
    validate_placeholder_count(sql, expected)
}

/// Validate one parameter set; `None` counts as zero parameters.
///
/// # Errors
/// As [`validate_sql`].
pub fn validate_params(sql: &str, params: Option<&ParamSet>) -> Result<(), SqlMarshalError> {
    validate_sql(sql, params.map_or(0, ParamSet::len))
}

/// Validate every set of a batch against the same SQL, stopping at the first failure.
///
/// # Errors
/// As [`validate_sql`].
pub fn validate_batch(sql: &str, sets: &[ParamSet]) -> Result<(), SqlMarshalError> {
    if !validate_sql_enabled() {
        return Ok(());
    }
    sets.iter()
        .try_for_each(|set| validate_placeholder_count(sql, set.len()))
}

/// Batch validation over raw value arrays.
///
/// # Errors
/// As [`validate_sql`].
pub fn validate_arrays<P>(sql: &str, arrays: &[P]) -> Result<(), SqlMarshalError>
where
    P: AsRef<[SqlValue]>,
{
    if !validate_sql_enabled() {
        return Ok(());
    }
    arrays
        .iter()
        .try_for_each(|values| validate_placeholder_count(sql, values.as_ref().len()))
}

/// Validate parameterless statements, e.g. the members of a textual batch.
///
/// # Errors
/// As [`validate_sql`].
pub fn validate_statements<S: AsRef<str>>(statements: &[S]) -> Result<(), SqlMarshalError> {
    if !validate_sql_enabled() {
        return Ok(());
    }
    statements
        .iter()
        .try_for_each(|sql| validate_placeholder_count(sql.as_ref(), 0))
}
