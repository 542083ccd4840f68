//! Column classification: numeric vs categorical.

use crate::data::{Dataset, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Distinct-value count at or below which a numeric column is flagged as
/// possibly categorical. Advisory only.
pub const LOW_CARDINALITY_LIMIT: usize = 10;

/// The kind assigned to a whole column at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Every non-missing cell is a number.
    Numeric,
    /// At least one non-missing cell is not a number.
    Categorical,
}

/// Classification of every column of a dataset.
///
/// Assigned once when the source dataset is loaded and never re-evaluated:
/// filtering removes rows but keeps the schema of the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    kinds: HashMap<String, ColumnKind>,
    numeric: Vec<String>,
    categorical: Vec<String>,
    /// Numeric columns with few distinct values, flagged for operator
    /// awareness. The flag never changes a column's kind or its
    /// eligibility for numeric chart types.
    low_cardinality: Vec<String>,
}

impl Schema {
    /// Kind of a column, if it exists.
    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        self.kinds.get(column).copied()
    }

    /// Numeric column names, in dataset order.
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric
    }

    /// Categorical column names, in dataset order.
    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical
    }

    /// Numeric columns flagged as possibly categorical (advisory only).
    pub fn low_cardinality_columns(&self) -> &[String] {
        &self.low_cardinality
    }

    /// Check a column is classified as numeric.
    pub fn is_numeric(&self, column: &str) -> bool {
        self.kind_of(column) == Some(ColumnKind::Numeric)
    }

    /// Check a column is classified as categorical.
    pub fn is_categorical(&self, column: &str) -> bool {
        self.kind_of(column) == Some(ColumnKind::Categorical)
    }

    /// Total number of classified columns.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether no columns are classified.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Classify each column of a dataset as numeric or categorical.
///
/// A column is numeric iff every non-missing cell is a number; a single
/// non-numeric cell makes the whole column categorical. Missing cells do
/// not participate, so a column that is entirely missing counts as numeric.
///
/// A dataset with zero rows or zero columns yields an empty schema; this is
/// a valid state, not an error.
pub fn classify(dataset: &Dataset) -> Schema {
    let mut kinds = HashMap::new();
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();
    let mut low_cardinality = Vec::new();

    if dataset.is_empty() {
        return Schema {
            kinds,
            numeric,
            categorical,
            low_cardinality,
        };
    }

    for col in dataset.columns() {
        let all_numeric = col
            .values()
            .iter()
            .all(|v| matches!(v, Value::Number(_) | Value::Missing));

        if all_numeric {
            kinds.insert(col.name().to_string(), ColumnKind::Numeric);
            numeric.push(col.name().to_string());
            let distinct = col.distinct().len();
            if distinct > 0 && distinct <= LOW_CARDINALITY_LIMIT {
                low_cardinality.push(col.name().to_string());
            }
        } else {
            kinds.insert(col.name().to_string(), ColumnKind::Categorical);
            categorical.push(col.name().to_string());
        }
    }

    Schema {
        kinds,
        numeric,
        categorical,
        low_cardinality,
    }
}
