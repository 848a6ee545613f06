//! Type-directed conversion between in-memory values and the parameter/column
//! type model.
//!
//! - `bind`: pick the typed binding for a value, optionally steered by a type code.
//! - `column`: move a fetched column value into a member's declared type.

mod bind;
mod column;

pub use bind::{bind_values, natural_binding, set_parameter, set_parameter_as};
pub use column::{coerce_to, convert, natural_value};

pub(crate) use column::{DATE_FORMAT, TIME_FORMAT, TIMESTAMP_FORMAT};
