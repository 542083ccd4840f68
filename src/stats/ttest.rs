//! Welch two-sample t-test.

use crate::data::{ColumnKind, Dataset, Schema};
use crate::error::{PulseError, Result};
use crate::stats::{group_observations, mean, require_kind, variance};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of a Welch two-sample t-test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TTestResult {
    /// Numeric column being compared.
    pub value_column: String,
    /// Categorical column defining the two groups.
    pub group_column: String,
    /// First group level (sorted order).
    pub group_a: String,
    /// Second group level.
    pub group_b: String,
    /// Observations in each group.
    pub n_a: usize,
    pub n_b: usize,
    /// Group means.
    pub mean_a: f64,
    pub mean_b: f64,
    /// t statistic.
    pub statistic: f64,
    /// Welch-Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Cohen's d (pooled standard deviation).
    pub cohens_d: f64,
}

impl std::fmt::Display for TTestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Welch t-test: {} by {} ({} vs {})",
            self.value_column, self.group_column, self.group_a, self.group_b
        )?;
        writeln!(
            f,
            "  mean {} = {:.4} (n={}), mean {} = {:.4} (n={})",
            self.group_a, self.mean_a, self.n_a, self.group_b, self.mean_b, self.n_b
        )?;
        writeln!(
            f,
            "  t = {:.4}, df = {:.2}, p = {:.4}, d = {:.4}",
            self.statistic, self.df, self.p_value, self.cohens_d
        )?;
        Ok(())
    }
}

/// Welch two-sample t-test of a numeric column between the two levels of a
/// categorical column.
///
/// The grouping column must have exactly two observed levels, each with at
/// least two observations.
pub fn welch_t_test(
    dataset: &Dataset,
    schema: &Schema,
    value_column: &str,
    group_column: &str,
) -> Result<TTestResult> {
    require_kind(dataset, schema, value_column, ColumnKind::Numeric)?;
    require_kind(dataset, schema, group_column, ColumnKind::Categorical)?;

    let groups = group_observations(dataset, value_column, group_column)?;
    if groups.len() != 2 {
        return Err(PulseError::InvalidParameter(format!(
            "t-test requires exactly 2 groups in '{}', found {}",
            group_column,
            groups.len()
        )));
    }
    let (label_a, obs_a) = &groups[0];
    let (label_b, obs_b) = &groups[1];
    if obs_a.len() < 2 || obs_b.len() < 2 {
        return Err(PulseError::InsufficientData(format!(
            "t-test requires at least 2 observations per group ({}={}, {}={})",
            label_a,
            obs_a.len(),
            label_b,
            obs_b.len()
        )));
    }

    let (n_a, n_b) = (obs_a.len() as f64, obs_b.len() as f64);
    let (mean_a, mean_b) = (mean(obs_a), mean(obs_b));
    let (var_a, var_b) = (variance(obs_a), variance(obs_b));

    let se_sq = var_a / n_a + var_b / n_b;
    let statistic = if se_sq > 0.0 {
        (mean_a - mean_b) / se_sq.sqrt()
    } else {
        f64::NAN
    };

    // Welch-Satterthwaite approximation
    let df = if se_sq > 0.0 {
        se_sq.powi(2)
            / ((var_a / n_a).powi(2) / (n_a - 1.0) + (var_b / n_b).powi(2) / (n_b - 1.0))
    } else {
        f64::NAN
    };

    let p_value = if !statistic.is_nan() && df > 0.0 {
        let t_dist = StudentsT::new(0.0, 1.0, df).unwrap();
        2.0 * (1.0 - t_dist.cdf(statistic.abs()))
    } else {
        f64::NAN
    };

    let pooled_var =
        ((n_a - 1.0) * var_a + (n_b - 1.0) * var_b) / (n_a + n_b - 2.0);
    let cohens_d = if pooled_var > 0.0 {
        (mean_a - mean_b) / pooled_var.sqrt()
    } else {
        f64::NAN
    };

    Ok(TTestResult {
        value_column: value_column.to_string(),
        group_column: group_column.to_string(),
        group_a: label_a.clone(),
        group_b: label_b.clone(),
        n_a: obs_a.len(),
        n_b: obs_b.len(),
        mean_a,
        mean_b,
        statistic,
        df,
        p_value,
        cohens_d,
    })
}
