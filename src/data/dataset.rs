//! In-memory tabular dataset.

use crate::data::Value;
use crate::error::{PulseError, Result};
use std::collections::BTreeSet;

/// A named column of cell values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    /// Create a column from a name and values.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell values in row order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-missing numeric values in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_number).collect()
    }

    /// Sorted set of distinct non-missing values.
    pub fn distinct(&self) -> BTreeSet<Value> {
        self.values
            .iter()
            .filter(|v| !v.is_missing())
            .cloned()
            .collect()
    }
}

/// An ordered collection of named columns with uniform row count.
///
/// A dataset is immutable once loaded; filtering and other transformations
/// produce new datasets rather than mutating in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Create a dataset from columns, checking the row count is uniform.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        for col in &columns {
            if col.len() != n_rows {
                return Err(PulseError::LengthMismatch {
                    expected: n_rows,
                    actual: col.len(),
                });
            }
        }
        Ok(Self { columns, n_rows })
    }

    /// An empty dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            n_rows: 0,
        }
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the dataset has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0 || self.columns.is_empty()
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| PulseError::MissingColumn(name.to_string()))
    }

    /// Check if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// A single row as a vector of cell references, in column order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.n_rows()`.
    pub fn row(&self, index: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values()[index]).collect()
    }

    /// New dataset keeping only the rows at the given indices, in the
    /// order given. Indices are expected to be strictly increasing so row
    /// order is preserved.
    ///
    /// # Panics
    ///
    /// Panics if any index is `>= self.n_rows()`.
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let values = indices.iter().map(|&i| col.values()[i].clone()).collect();
                Column::new(col.name(), values)
            })
            .collect();
        Self {
            columns,
            n_rows: indices.len(),
        }
    }

    /// New dataset with the first `n` rows (dataset preview).
    pub fn head(&self, n: usize) -> Self {
        let take = n.min(self.n_rows);
        let indices: Vec<usize> = (0..take).collect();
        self.take_rows(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new(
                "Age",
                vec![Value::Number(23.0), Value::Number(45.0), Value::Number(31.0)],
            ),
            Column::new(
                "Drug",
                vec![Value::from("A"), Value::from("B"), Value::from("A")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_dimensions() {
        let ds = sample();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.n_columns(), 2);
        assert_eq!(ds.column_names(), vec!["Age", "Drug"]);
    }

    #[test]
    fn test_length_mismatch() {
        let result = Dataset::new(vec![
            Column::new("a", vec![Value::Number(1.0)]),
            Column::new("b", vec![Value::Number(1.0), Value::Number(2.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_column_lookup() {
        let ds = sample();
        assert_eq!(ds.column("Age").unwrap().numbers(), vec![23.0, 45.0, 31.0]);
        assert!(ds.column("Dose").is_err());
    }

    #[test]
    fn test_take_rows_preserves_order() {
        let ds = sample();
        let taken = ds.take_rows(&[0, 2]);
        assert_eq!(taken.n_rows(), 2);
        assert_eq!(
            taken.column("Drug").unwrap().values(),
            &[Value::from("A"), Value::from("A")]
        );
        assert_eq!(taken.column("Age").unwrap().numbers(), vec![23.0, 31.0]);
    }

    #[test]
    #[should_panic]
    fn test_row_out_of_range_panics() {
        sample().row(3);
    }

    #[test]
    #[should_panic]
    fn test_take_rows_out_of_range_panics() {
        sample().take_rows(&[0, 3]);
    }

    #[test]
    fn test_head() {
        let ds = sample();
        assert_eq!(ds.head(2).n_rows(), 2);
        assert_eq!(ds.head(10).n_rows(), 3);
    }

    #[test]
    fn test_empty() {
        let ds = Dataset::empty();
        assert!(ds.is_empty());
        assert_eq!(ds.n_rows(), 0);
        assert_eq!(ds.n_columns(), 0);
    }

    #[test]
    fn test_distinct() {
        let ds = sample();
        let distinct = ds.column("Drug").unwrap().distinct();
        assert_eq!(distinct.len(), 2);
        assert!(distinct.contains(&Value::from("A")));
    }
}
