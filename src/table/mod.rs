//! Row-indexed metric tables.
//!
//! A table row belongs to exactly one (node, secondary index) pair. Grouping
//! and aggregation are implemented directly on the table.

pub mod aggregate;
pub mod rows;
pub mod value;

// Re-export main types
pub use aggregate::Aggregation;
pub use rows::{Row, RowView, Table};
pub use value::{RowKey, Value};
