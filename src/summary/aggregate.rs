//! Single-pass aggregations feeding the chart renderers.
//!
//! Every aggregation recomputes from the working dataset it is handed;
//! nothing here caches or updates incrementally.

use crate::data::{ColumnKind, Dataset, Schema};
use crate::error::{PulseError, Result};
use crate::stats::{pearson_r, require_kind};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How to aggregate a numeric column within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate {
    Sum,
    Mean,
    Count,
}

/// One group's aggregated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupValue {
    pub group: String,
    pub value: f64,
}

/// Aggregate a numeric column per level of a categorical column, sorted by
/// group label. Rows missing either value are skipped.
pub fn group_aggregate(
    dataset: &Dataset,
    schema: &Schema,
    group_column: &str,
    value_column: &str,
    aggregate: Aggregate,
) -> Result<Vec<GroupValue>> {
    require_kind(dataset, schema, group_column, ColumnKind::Categorical)?;
    require_kind(dataset, schema, value_column, ColumnKind::Numeric)?;

    let groups = dataset.column(group_column)?;
    let values = dataset.column(value_column)?;

    let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for (group, value) in groups.values().iter().zip(values.values()) {
        if group.is_missing() {
            continue;
        }
        if let Some(v) = value.as_number() {
            let entry = acc.entry(group.to_string()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }

    Ok(acc
        .into_iter()
        .map(|(group, (sum, count))| {
            let value = match aggregate {
                Aggregate::Sum => sum,
                Aggregate::Mean => sum / count as f64,
                Aggregate::Count => count as f64,
            };
            GroupValue { group, value }
        })
        .collect())
}

/// Frequency of each distinct non-missing value of a categorical column,
/// sorted by descending count (ties broken by label).
pub fn value_counts(
    dataset: &Dataset,
    schema: &Schema,
    column: &str,
) -> Result<Vec<(String, usize)>> {
    require_kind(dataset, schema, column, ColumnKind::Categorical)?;
    let col = dataset.column(column)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in col.values() {
        if value.is_missing() {
            continue;
        }
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(out)
}

/// Equal-width histogram of a numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram {
    pub column: String,
    /// Lower bound of the first bin.
    pub min: f64,
    /// Upper bound of the last bin (inclusive).
    pub max: f64,
    /// Width of each bin.
    pub bin_width: f64,
    /// Observation counts per bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin edges, `counts.len() + 1` values from min to max.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.counts.len())
            .map(|i| self.min + self.bin_width * i as f64)
            .collect()
    }
}

/// Bin the non-missing values of a numeric column into `bins` equal-width
/// bins. The last bin includes the maximum.
pub fn histogram(
    dataset: &Dataset,
    schema: &Schema,
    column: &str,
    bins: usize,
) -> Result<Histogram> {
    require_kind(dataset, schema, column, ColumnKind::Numeric)?;
    if bins == 0 {
        return Err(PulseError::InvalidParameter(
            "Histogram requires at least one bin".to_string(),
        ));
    }

    let values = dataset.column(column)?.numbers();
    if values.is_empty() {
        return Err(PulseError::InsufficientData(format!(
            "'{column}' has no observations to bin"
        )));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Degenerate single-valued column: one bin holding everything
    if min == max {
        return Ok(Histogram {
            column: column.to_string(),
            min,
            max,
            bin_width: 0.0,
            counts: vec![values.len()],
        });
    }

    let bin_width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = (((v - min) / bin_width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram {
        column: column.to_string(),
        min,
        max,
        bin_width,
        counts,
    })
}

/// Pairwise Pearson correlation matrix over the numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Numeric column names, in dataset order.
    pub columns: Vec<String>,
    /// Row-major correlation values; `NaN` where a pair has fewer than two
    /// complete observations or zero variance.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Number of columns in the matrix.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Correlation between two columns by index.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// Compute the correlation matrix of all numeric columns, using
/// pairwise-complete observations for each pair.
pub fn correlation_matrix(dataset: &Dataset, schema: &Schema) -> Result<CorrelationMatrix> {
    let columns: Vec<String> = schema.numeric_columns().to_vec();
    let series: Vec<&[crate::data::Value]> = columns
        .iter()
        .map(|name| dataset.column(name).map(|c| c.values()))
        .collect::<Result<_>>()?;

    let n = columns.len();
    let values: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        return 1.0;
                    }
                    let pairs: Vec<(f64, f64)> = series[i]
                        .iter()
                        .zip(series[j])
                        .filter_map(|(x, y)| Some((x.as_number()?, y.as_number()?)))
                        .collect();
                    let xs: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
                    let ys: Vec<f64> = pairs.iter().map(|(_, y)| *y).collect();
                    pearson_r(&xs, &ys).unwrap_or(f64::NAN)
                })
                .collect()
        })
        .collect();

    Ok(CorrelationMatrix { columns, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{classify, Column, Value};
    use approx::assert_relative_eq;

    fn sample() -> (Dataset, Schema) {
        let ds = Dataset::new(vec![
            Column::new(
                "Age",
                vec![
                    Value::Number(23.0),
                    Value::Number(45.0),
                    Value::Number(31.0),
                    Value::Number(52.0),
                ],
            ),
            Column::new(
                "Dose",
                vec![
                    Value::Number(10.0),
                    Value::Number(20.0),
                    Value::Number(14.0),
                    Value::Number(24.0),
                ],
            ),
            Column::new(
                "Drug",
                vec![
                    Value::from("A"),
                    Value::from("B"),
                    Value::from("A"),
                    Value::from("B"),
                ],
            ),
        ])
        .unwrap();
        let schema = classify(&ds);
        (ds, schema)
    }

    #[test]
    fn test_group_sum() {
        let (ds, schema) = sample();
        let groups = group_aggregate(&ds, &schema, "Drug", "Age", Aggregate::Sum).unwrap();
        assert_eq!(
            groups,
            vec![
                GroupValue {
                    group: "A".into(),
                    value: 54.0
                },
                GroupValue {
                    group: "B".into(),
                    value: 97.0
                },
            ]
        );
    }

    #[test]
    fn test_group_mean_and_count() {
        let (ds, schema) = sample();
        let means = group_aggregate(&ds, &schema, "Drug", "Age", Aggregate::Mean).unwrap();
        assert_relative_eq!(means[0].value, 27.0);
        assert_relative_eq!(means[1].value, 48.5);

        let counts = group_aggregate(&ds, &schema, "Drug", "Age", Aggregate::Count).unwrap();
        assert_relative_eq!(counts[0].value, 2.0);
        assert_relative_eq!(counts[1].value, 2.0);
    }

    #[test]
    fn test_group_aggregate_kind_checks() {
        let (ds, schema) = sample();
        assert!(group_aggregate(&ds, &schema, "Age", "Dose", Aggregate::Sum).is_err());
        assert!(group_aggregate(&ds, &schema, "Drug", "Drug", Aggregate::Sum).is_err());
    }

    #[test]
    fn test_value_counts_sorted_by_frequency() {
        let ds = Dataset::new(vec![Column::new(
            "site",
            vec![
                Value::from("north"),
                Value::from("south"),
                Value::from("north"),
                Value::Missing,
                Value::from("north"),
                Value::from("east"),
            ],
        )])
        .unwrap();
        let schema = classify(&ds);
        let counts = value_counts(&ds, &schema, "site").unwrap();
        assert_eq!(
            counts,
            vec![
                ("north".to_string(), 3),
                ("east".to_string(), 1),
                ("south".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_value_counts_rejects_numeric_columns() {
        let (ds, schema) = sample();
        let result = value_counts(&ds, &schema, "Age");
        assert!(matches!(
            result,
            Err(PulseError::InvalidColumnKind { .. })
        ));
    }

    #[test]
    fn test_histogram_bins() {
        let ds = Dataset::new(vec![Column::new(
            "x",
            (0..10).map(|i| Value::Number(i as f64)).collect(),
        )])
        .unwrap();
        let schema = classify(&ds);
        let hist = histogram(&ds, &schema, "x", 3).unwrap();

        assert_eq!(hist.counts.iter().sum::<usize>(), 10);
        assert_eq!(hist.counts.len(), 3);
        assert_relative_eq!(hist.min, 0.0);
        assert_relative_eq!(hist.max, 9.0);
        // Max value lands in the last bin
        assert_eq!(hist.counts, vec![3, 3, 4]);
        assert_eq!(hist.edges().len(), 4);
    }

    #[test]
    fn test_histogram_single_value() {
        let ds = Dataset::new(vec![Column::new(
            "x",
            vec![Value::Number(5.0), Value::Number(5.0)],
        )])
        .unwrap();
        let schema = classify(&ds);
        let hist = histogram(&ds, &schema, "x", 15).unwrap();
        assert_eq!(hist.counts, vec![2]);
    }

    #[test]
    fn test_histogram_empty_column_is_insufficient() {
        let ds = Dataset::new(vec![Column::new("x", vec![Value::Missing])]).unwrap();
        let schema = classify(&ds);
        let result = histogram(&ds, &schema, "x", 15);
        assert!(matches!(result, Err(PulseError::InsufficientData(_))));
    }

    #[test]
    fn test_correlation_matrix() {
        let (ds, schema) = sample();
        let matrix = correlation_matrix(&ds, &schema).unwrap();
        assert_eq!(matrix.columns, vec!["Age".to_string(), "Dose".to_string()]);
        assert_relative_eq!(matrix.get(0, 0), 1.0);
        assert_relative_eq!(matrix.get(1, 1), 1.0);
        // Age and Dose move together in the fixture
        assert!(matrix.get(0, 1) > 0.99);
        assert_relative_eq!(matrix.get(0, 1), matrix.get(1, 0), epsilon = 1e-12);
    }

    #[test]
    fn test_correlation_matrix_no_numeric_columns() {
        let ds = Dataset::new(vec![Column::new(
            "label",
            vec![Value::from("a"), Value::from("b")],
        )])
        .unwrap();
        let schema = classify(&ds);
        let matrix = correlation_matrix(&ds, &schema).unwrap();
        assert!(matrix.is_empty());
    }
}
