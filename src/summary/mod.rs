//! Descriptive statistics and chart-feeding aggregations.

mod aggregate;
mod describe;

pub use aggregate::{
    correlation_matrix, group_aggregate, histogram, value_counts, Aggregate, CorrelationMatrix,
    GroupValue, Histogram,
};
pub use describe::{describe, NumericSummary};
