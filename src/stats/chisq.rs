//! Chi-square test of independence.

use crate::data::{ColumnKind, Dataset, Schema};
use crate::error::{PulseError, Result};
use crate::stats::require_kind;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::collections::BTreeMap;

/// Result of a chi-square test of independence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChiSquareResult {
    /// First categorical column.
    pub column_a: String,
    /// Second categorical column.
    pub column_b: String,
    /// Observations with both values present.
    pub n_obs: usize,
    /// Contingency table dimensions.
    pub n_levels_a: usize,
    pub n_levels_b: usize,
    /// Chi-square statistic.
    pub statistic: f64,
    /// Degrees of freedom ((r - 1)(c - 1)).
    pub df: f64,
    /// P-value.
    pub p_value: f64,
    /// Cramer's V effect size.
    pub cramers_v: f64,
}

impl std::fmt::Display for ChiSquareResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Chi-square: {} x {} ({}x{} table, n={})",
            self.column_a, self.column_b, self.n_levels_a, self.n_levels_b, self.n_obs
        )?;
        writeln!(
            f,
            "  chi2 = {:.4}, df = {:.0}, p = {:.4}, V = {:.4}",
            self.statistic, self.df, self.p_value, self.cramers_v
        )?;
        Ok(())
    }
}

/// Chi-square test of independence between two categorical columns.
///
/// Builds the contingency table over rows where both values are present.
/// Requires at least two observed levels in each column.
pub fn chi_square_independence(
    dataset: &Dataset,
    schema: &Schema,
    column_a: &str,
    column_b: &str,
) -> Result<ChiSquareResult> {
    require_kind(dataset, schema, column_a, ColumnKind::Categorical)?;
    require_kind(dataset, schema, column_b, ColumnKind::Categorical)?;

    let col_a = dataset.column(column_a)?;
    let col_b = dataset.column(column_b)?;

    // Contingency counts over pairwise-complete rows
    let mut table: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut n_obs = 0usize;
    for (a, b) in col_a.values().iter().zip(col_b.values()) {
        if a.is_missing() || b.is_missing() {
            continue;
        }
        *table.entry((a.to_string(), b.to_string())).or_insert(0.0) += 1.0;
        n_obs += 1;
    }

    let levels_a: Vec<String> = {
        let mut set: Vec<String> = table.keys().map(|(a, _)| a.clone()).collect();
        set.sort();
        set.dedup();
        set
    };
    let levels_b: Vec<String> = {
        let mut set: Vec<String> = table.keys().map(|(_, b)| b.clone()).collect();
        set.sort();
        set.dedup();
        set
    };

    if levels_a.len() < 2 || levels_b.len() < 2 {
        return Err(PulseError::InsufficientData(format!(
            "chi-square requires at least 2 levels per column ('{}' has {}, '{}' has {})",
            column_a,
            levels_a.len(),
            column_b,
            levels_b.len()
        )));
    }

    let row_totals: Vec<f64> = levels_a
        .iter()
        .map(|a| {
            levels_b
                .iter()
                .map(|b| table.get(&(a.clone(), b.clone())).copied().unwrap_or(0.0))
                .sum()
        })
        .collect();
    let col_totals: Vec<f64> = levels_b
        .iter()
        .map(|b| {
            levels_a
                .iter()
                .map(|a| table.get(&(a.clone(), b.clone())).copied().unwrap_or(0.0))
                .sum()
        })
        .collect();
    let total = n_obs as f64;

    let mut statistic = 0.0;
    for (i, a) in levels_a.iter().enumerate() {
        for (j, b) in levels_b.iter().enumerate() {
            let observed = table.get(&(a.clone(), b.clone())).copied().unwrap_or(0.0);
            let expected = row_totals[i] * col_totals[j] / total;
            if expected > 0.0 {
                statistic += (observed - expected).powi(2) / expected;
            }
        }
    }

    let df = ((levels_a.len() - 1) * (levels_b.len() - 1)) as f64;
    let chi_dist = ChiSquared::new(df).unwrap();
    let p_value = 1.0 - chi_dist.cdf(statistic);

    let min_dim = (levels_a.len() - 1).min(levels_b.len() - 1) as f64;
    let cramers_v = (statistic / (total * min_dim)).sqrt();

    Ok(ChiSquareResult {
        column_a: column_a.to_string(),
        column_b: column_b.to_string(),
        n_obs,
        n_levels_a: levels_a.len(),
        n_levels_b: levels_b.len(),
        statistic,
        df,
        p_value,
        cramers_v,
    })
}
