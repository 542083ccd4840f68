//! Core data structures: cell values, datasets, column classification.

mod dataset;
mod schema;
mod value;

pub use dataset::{Column, Dataset};
pub use schema::{classify, ColumnKind, Schema, LOW_CARDINALITY_LIMIT};
pub use value::Value;
