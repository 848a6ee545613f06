//! Marshal data objects to and from SQL statements.
//!
//! - `#{name}` templates are rewritten to positional `?` SQL and cached by text.
//! - Placeholder counts are validated against the supplied parameters.
//! - Each data object type gets one compiled [`TypeConverter`](convert::TypeConverter)
//!   that binds its members as parameters and reads result rows back into it.
//!
//! ```rust
//! use sql_marshal::prelude::*;
//!
//! sql_marshal::data_object! {
//!     #[derive(Debug, PartialEq)]
//!     pub struct User {
//!         pub id: i64,
//!         pub name: String,
//!     }
//! }
//!
//! let parsed = rewrite_template("UPDATE users SET name = #{name} WHERE id = #{id}");
//! assert_eq!(parsed.sql(), "UPDATE users SET name = ? WHERE id = ?");
//!
//! let converter = get_converter::<User>().unwrap();
//! let mut params = ParamBuffer::new();
//! let user = User { id: 7, name: "ann".into() };
//! converter.bind(&mut params, &user, parsed.parameter_names()).unwrap();
//! assert_eq!(params.into_values(), vec![SqlValue::from("ann"), SqlValue::BigInt(7)]);
//! ```

pub mod adapters;
pub mod coercion;
pub mod config;
pub mod convert;
pub mod error;
pub mod object;
pub mod params;
pub mod prelude;
pub mod results;
pub mod sql_type;
pub mod template;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use error::{BuildError, CoercionError, SqlMarshalError};
pub use sql_type::SqlType;
pub use types::SqlValue;
