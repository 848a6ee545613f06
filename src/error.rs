use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;

use crate::types::ValueKind;

#[derive(Debug, Error)]
pub enum SqlMarshalError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Malformed SQL text ({reason}): {sql}")]
    MalformedSql { sql: String, reason: &'static str },

    #[error(
        "Parameter count mismatch: holderSize={holder_size}, expected={expected}, sql={sql}"
    )]
    ParameterCountMismatch {
        sql: String,
        holder_size: usize,
        expected: usize,
    },

    #[error("Type converter build failure for {type_name}: {source}")]
    ConverterBuild {
        type_name: &'static str,
        #[source]
        source: BuildError,
    },

    #[error("Cannot coerce value for member '{member}': {source}")]
    Coercion {
        member: String,
        #[source]
        source: CoercionError,
    },

    #[error("Parameter error: {0}")]
    Parameter(String),

    #[error("SQL execution error: {0}")]
    Execution(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a type converter could not be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("cannot instantiate type: no zero-argument constructor")]
    CannotInstantiate,

    #[error("duplicate member '{0}'")]
    DuplicateMember(String),

    #[error("member '{0}' is neither readable nor writable")]
    InaccessibleMember(String),
}

/// Why a column value could not be moved into a member's declared type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoercionError {
    #[error("NULL cannot be stored in a non-optional {0:?} member")]
    UnexpectedNull(ValueKind),

    #[error("{value} is out of range for {target:?}")]
    OutOfRange { value: String, target: ValueKind },

    #[error("cannot parse {text:?} as {target:?}")]
    Unparsable { text: String, target: ValueKind },

    #[error("no conversion from {from:?} to {to:?}")]
    Incompatible { from: ValueKind, to: ValueKind },
}

pub type Result<T, E = SqlMarshalError> = std::result::Result<T, E>;
