//! One-way analysis of variance.

use crate::data::{ColumnKind, Dataset, Schema};
use crate::error::{PulseError, Result};
use crate::stats::{group_observations, mean, require_kind};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Result of a one-way ANOVA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnovaResult {
    /// Numeric column being compared.
    pub value_column: String,
    /// Categorical column defining the groups.
    pub group_column: String,
    /// Number of groups.
    pub n_groups: usize,
    /// Total observations across groups.
    pub n_obs: usize,
    /// F statistic.
    pub statistic: f64,
    /// Between-group degrees of freedom (k - 1).
    pub df_between: f64,
    /// Within-group degrees of freedom (N - k).
    pub df_within: f64,
    /// P-value.
    pub p_value: f64,
    /// Eta squared effect size (SS_between / SS_total).
    pub eta_squared: f64,
}

impl std::fmt::Display for AnovaResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "One-way ANOVA: {} by {} ({} groups, {} observations)",
            self.value_column, self.group_column, self.n_groups, self.n_obs
        )?;
        writeln!(
            f,
            "  F({:.0}, {:.0}) = {:.4}, p = {:.4}, eta^2 = {:.4}",
            self.df_between, self.df_within, self.statistic, self.p_value, self.eta_squared
        )?;
        Ok(())
    }
}

/// One-way ANOVA of a numeric column across the levels of a categorical
/// column. Requires at least two groups, each with at least two
/// observations.
pub fn anova_oneway(
    dataset: &Dataset,
    schema: &Schema,
    value_column: &str,
    group_column: &str,
) -> Result<AnovaResult> {
    require_kind(dataset, schema, value_column, ColumnKind::Numeric)?;
    require_kind(dataset, schema, group_column, ColumnKind::Categorical)?;

    let groups = group_observations(dataset, value_column, group_column)?;
    if groups.len() < 2 {
        return Err(PulseError::InsufficientData(format!(
            "ANOVA requires at least 2 groups in '{}', found {}",
            group_column,
            groups.len()
        )));
    }
    for (label, obs) in &groups {
        if obs.len() < 2 {
            return Err(PulseError::InsufficientData(format!(
                "ANOVA requires at least 2 observations per group ('{}' has {})",
                label,
                obs.len()
            )));
        }
    }

    let n_obs: usize = groups.iter().map(|(_, obs)| obs.len()).sum();
    let k = groups.len();
    let all: Vec<f64> = groups
        .iter()
        .flat_map(|(_, obs)| obs.iter().copied())
        .collect();
    let grand_mean = mean(&all);

    let ss_between: f64 = groups
        .iter()
        .map(|(_, obs)| obs.len() as f64 * (mean(obs) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|(_, obs)| {
            let m = mean(obs);
            obs.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();
    let ss_total = ss_between + ss_within;

    let df_between = (k - 1) as f64;
    let df_within = (n_obs - k) as f64;
    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;

    let (statistic, p_value) = if ms_within > 0.0 {
        let f_stat = ms_between / ms_within;
        let f_dist = FisherSnedecor::new(df_between, df_within).unwrap();
        (f_stat, 1.0 - f_dist.cdf(f_stat))
    } else if ss_between > 0.0 {
        // All within-group variance is zero but groups differ
        (f64::INFINITY, 0.0)
    } else {
        (f64::NAN, f64::NAN)
    };

    let eta_squared = if ss_total > 0.0 {
        ss_between / ss_total
    } else {
        f64::NAN
    };

    Ok(AnovaResult {
        value_column: value_column.to_string(),
        group_column: group_column.to_string(),
        n_groups: k,
        n_obs,
        statistic,
        df_between,
        df_within,
        p_value,
        eta_squared,
    })
}
