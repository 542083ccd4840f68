//! Canned hypothesis tests over the working dataset.
//!
//! Each test takes one or two columns, checks the minimum group sizes, and
//! returns a statistic, p-value and effect size. Tests refuse inputs below
//! their minimum with an `InsufficientData` error rather than producing a
//! meaningless result.

mod anova;
mod chisq;
mod pearson;
mod ttest;

pub use anova::{anova_oneway, AnovaResult};
pub use chisq::{chi_square_independence, ChiSquareResult};
pub use pearson::{pearson_correlation, pearson_r, PearsonResult};
pub use ttest::{welch_t_test, TTestResult};

use crate::data::{ColumnKind, Dataset, Schema};
use crate::error::{PulseError, Result};

/// Check a column exists and has the expected kind.
pub(crate) fn require_kind(
    dataset: &Dataset,
    schema: &Schema,
    column: &str,
    kind: ColumnKind,
) -> Result<()> {
    dataset.column(column)?;
    if schema.kind_of(column) != Some(kind) {
        let reason = match kind {
            ColumnKind::Numeric => "expected a numeric column",
            ColumnKind::Categorical => "expected a categorical column",
        };
        return Err(PulseError::InvalidColumnKind {
            column: column.to_string(),
            reason: reason.to_string(),
        });
    }
    Ok(())
}

/// Sample mean of a slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator).
pub(crate) fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Split a numeric column into per-group observations keyed by the levels
/// of a categorical column. Rows missing either value are skipped. Levels
/// are returned in sorted order for deterministic output.
pub(crate) fn group_observations(
    dataset: &Dataset,
    value_column: &str,
    group_column: &str,
) -> Result<Vec<(String, Vec<f64>)>> {
    let values = dataset.column(value_column)?;
    let groups = dataset.column(group_column)?;

    let mut by_group: std::collections::BTreeMap<String, Vec<f64>> =
        std::collections::BTreeMap::new();
    for (value, group) in values.values().iter().zip(groups.values()) {
        if group.is_missing() {
            continue;
        }
        if let Some(v) = value.as_number() {
            by_group.entry(group.to_string()).or_default().push(v);
        }
    }
    Ok(by_group.into_iter().collect())
}
