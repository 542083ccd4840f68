//! Descriptive statistics for numeric columns.

use crate::data::{Dataset, Schema};
use serde::{Deserialize, Serialize};

/// Descriptive statistics for one numeric column.
///
/// Statistics are `NaN` when the column has no observations; the count
/// field says how many there were.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Column name.
    pub column: String,
    /// Non-missing observations.
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl std::fmt::Display for NumericSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.column)?;
        writeln!(f, "  count:  {}", self.count)?;
        writeln!(f, "  mean:   {:.4}", self.mean)?;
        writeln!(f, "  std:    {:.4}", self.std)?;
        writeln!(f, "  min:    {:.4}", self.min)?;
        writeln!(f, "  median: {:.4}", self.median)?;
        writeln!(f, "  max:    {:.4}", self.max)?;
        Ok(())
    }
}

/// Compute descriptive statistics for every numeric column, in dataset
/// order. An empty dataset yields an empty vector.
pub fn describe(dataset: &Dataset, schema: &Schema) -> Vec<NumericSummary> {
    schema
        .numeric_columns()
        .iter()
        .filter_map(|name| {
            let col = dataset.column(name).ok()?;
            Some(summarize(name, &col.numbers()))
        })
        .collect()
}

fn summarize(column: &str, values: &[f64]) -> NumericSummary {
    let count = values.len();
    if count == 0 {
        return NumericSummary {
            column: column.to_string(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            median: f64::NAN,
            max: f64::NAN,
        };
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    NumericSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min,
        median: median(values),
        max,
    }
}

/// Median of a sample (values need not be sorted).
pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
