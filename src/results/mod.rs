//! In-memory query results.

mod result_set;
mod row;

pub use result_set::{ResultSet, RowCursor};
pub use row::CustomDbRow;
