//! Filter engine: reduce a source dataset to the working dataset.
//!
//! A filter specification maps column names to restrictions: an
//! allowed-value set for categorical columns or a closed numeric range for
//! numeric columns. Filtering keeps exactly the rows that satisfy every
//! restriction (AND across columns, membership within a column), preserving
//! row order. The working dataset is always rebuilt from the source, never
//! patched incrementally, so applying the same specification twice gives
//! the same result as applying it once.

use crate::data::{ColumnKind, Dataset, Schema, Value};
use crate::error::{PulseError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Restriction on a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnFilter {
    /// Keep rows whose value is in the set. Valid on categorical columns.
    ///
    /// An explicitly empty set selects nothing: the working dataset has
    /// zero rows ("filter present, nothing checked"). A set holding every
    /// distinct value of the column imposes no restriction.
    Values(BTreeSet<Value>),
    /// Keep rows whose numeric value lies in the closed range `[min, max]`.
    /// Valid on numeric columns. Missing cells never pass.
    Range { min: f64, max: f64 },
}

/// Per-column restrictions currently selected. A column absent from the
/// specification is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    filters: BTreeMap<String, ColumnFilter>,
}

impl FilterSpec {
    /// Create an empty specification (no restrictions).
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict a categorical column to an allowed-value set.
    pub fn keep_values<I>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let set = values.into_iter().map(Into::into).collect();
        self.filters
            .insert(column.to_string(), ColumnFilter::Values(set));
        self
    }

    /// Restrict a numeric column to a closed range.
    pub fn keep_range(mut self, column: &str, min: f64, max: f64) -> Self {
        self.filters
            .insert(column.to_string(), ColumnFilter::Range { min, max });
        self
    }

    /// Insert a prebuilt restriction for a column.
    pub fn insert(&mut self, column: &str, filter: ColumnFilter) {
        self.filters.insert(column.to_string(), filter);
    }

    /// Remove the restriction on a column, if any.
    pub fn remove(&mut self, column: &str) -> Option<ColumnFilter> {
        self.filters.remove(column)
    }

    /// Restrictions by column name.
    pub fn filters(&self) -> &BTreeMap<String, ColumnFilter> {
        &self.filters
    }

    /// Whether no restriction is specified.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Row counts before and after filtering.
///
/// Filtering to zero rows is a valid outcome and is reported here as a
/// count; downstream chart and statistics collaborators are responsible
/// for refusing zero-row inputs themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterReport {
    /// Rows in the source dataset.
    pub rows_before: usize,
    /// Rows in the working dataset.
    pub rows_after: usize,
    /// Rows removed.
    pub rows_removed: usize,
    /// Number of columns with an active restriction.
    pub active_filters: usize,
}

impl std::fmt::Display for FilterReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Filter Report")?;
        writeln!(f, "  Rows before:     {}", self.rows_before)?;
        writeln!(f, "  Rows after:      {}", self.rows_after)?;
        writeln!(f, "  Rows removed:    {}", self.rows_removed)?;
        writeln!(f, "  Active filters:  {}", self.active_filters)?;
        Ok(())
    }
}

/// Apply a filter specification to a source dataset, producing the working
/// dataset and a row-count report.
///
/// The schema must be the one classified from the source dataset; it is
/// used to validate that value filters target categorical columns and
/// range filters target numeric columns. The working dataset keeps the
/// source's column set, so its classification is unchanged by construction.
///
/// An empty source dataset yields an empty working dataset, not an error.
/// Kind checks are skipped in that case: a zero-row dataset has an empty
/// schema, so only column existence can be validated.
pub fn apply_filter(
    dataset: &Dataset,
    schema: &Schema,
    spec: &FilterSpec,
) -> Result<(Dataset, FilterReport)> {
    if dataset.n_rows() == 0 {
        for name in spec.filters().keys() {
            if !dataset.has_column(name) {
                return Err(PulseError::MissingColumn(name.clone()));
            }
        }
        let report = FilterReport {
            rows_before: 0,
            rows_after: 0,
            rows_removed: 0,
            active_filters: spec.filters().len(),
        };
        return Ok((dataset.clone(), report));
    }

    // Resolve column indices up front; this also rejects unknown columns
    // and kind mismatches before any row is touched.
    let mut active: Vec<(usize, &ColumnFilter)> = Vec::with_capacity(spec.filters().len());
    for (name, filter) in spec.filters() {
        let idx = dataset
            .column_index(name)
            .ok_or_else(|| PulseError::MissingColumn(name.clone()))?;
        match (filter, schema.kind_of(name)) {
            (ColumnFilter::Values(_), Some(ColumnKind::Categorical)) => {}
            (ColumnFilter::Range { .. }, Some(ColumnKind::Numeric)) => {}
            (ColumnFilter::Values(_), _) => {
                return Err(PulseError::InvalidColumnKind {
                    column: name.clone(),
                    reason: "value filters apply to categorical columns".to_string(),
                });
            }
            (ColumnFilter::Range { .. }, _) => {
                return Err(PulseError::InvalidColumnKind {
                    column: name.clone(),
                    reason: "range filters apply to numeric columns".to_string(),
                });
            }
        }
        active.push((idx, filter));
    }

    if active.is_empty() {
        let report = FilterReport {
            rows_before: dataset.n_rows(),
            rows_after: dataset.n_rows(),
            rows_removed: 0,
            active_filters: active.len(),
        };
        return Ok((dataset.clone(), report));
    }

    let columns = dataset.columns();
    let keep: Vec<bool> = (0..dataset.n_rows())
        .into_par_iter()
        .map(|row| {
            active.iter().all(|(idx, filter)| {
                let value = &columns[*idx].values()[row];
                match filter {
                    ColumnFilter::Values(allowed) => allowed.contains(value),
                    ColumnFilter::Range { min, max } => value
                        .as_number()
                        .is_some_and(|v| v >= *min && v <= *max),
                }
            })
        })
        .collect();

    let indices: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect();

    let working = dataset.take_rows(&indices);
    let report = FilterReport {
        rows_before: dataset.n_rows(),
        rows_after: working.n_rows(),
        rows_removed: dataset.n_rows() - working.n_rows(),
        active_filters: active.len(),
    };
    Ok((working, report))
}
