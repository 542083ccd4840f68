//! Pearson correlation.

use crate::data::{ColumnKind, Dataset, Schema};
use crate::error::{PulseError, Result};
use crate::stats::require_kind;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of a Pearson correlation test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PearsonResult {
    /// First numeric column.
    pub x_column: String,
    /// Second numeric column.
    pub y_column: String,
    /// Pairwise-complete observations used.
    pub n_obs: usize,
    /// Correlation coefficient.
    pub r: f64,
    /// t statistic for H0: rho = 0.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

impl std::fmt::Display for PearsonResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Pearson correlation: {} vs {} (n={})",
            self.x_column, self.y_column, self.n_obs
        )?;
        writeln!(
            f,
            "  r = {:.4}, t = {:.4}, p = {:.4}",
            self.r, self.statistic, self.p_value
        )?;
        Ok(())
    }
}

/// Pearson correlation coefficient of two equal-length samples.
///
/// Returns `None` when fewer than two pairs are given or either sample has
/// zero variance.
pub fn pearson_r(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = xs[i] - mean_x;
        let dy = ys[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Pearson correlation between two numeric columns, over rows where both
/// values are present. Requires at least three such rows.
pub fn pearson_correlation(
    dataset: &Dataset,
    schema: &Schema,
    x_column: &str,
    y_column: &str,
) -> Result<PearsonResult> {
    require_kind(dataset, schema, x_column, ColumnKind::Numeric)?;
    require_kind(dataset, schema, y_column, ColumnKind::Numeric)?;

    let col_x = dataset.column(x_column)?;
    let col_y = dataset.column(y_column)?;

    let pairs: Vec<(f64, f64)> = col_x
        .values()
        .iter()
        .zip(col_y.values())
        .filter_map(|(x, y)| Some((x.as_number()?, y.as_number()?)))
        .collect();

    if pairs.len() < 3 {
        return Err(PulseError::InsufficientData(format!(
            "Pearson correlation requires at least 3 paired observations, found {}",
            pairs.len()
        )));
    }

    let xs: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
    let ys: Vec<f64> = pairs.iter().map(|(_, y)| *y).collect();
    let n = pairs.len();

    let r = pearson_r(&xs, &ys).ok_or_else(|| {
        PulseError::InsufficientData(format!(
            "'{x_column}' or '{y_column}' has zero variance"
        ))
    })?;

    let df = (n - 2) as f64;
    let (statistic, p_value) = if r.abs() >= 1.0 {
        (f64::INFINITY * r.signum(), 0.0)
    } else {
        let t = r * (df / (1.0 - r * r)).sqrt();
        let t_dist = StudentsT::new(0.0, 1.0, df).unwrap();
        (t, 2.0 * (1.0 - t_dist.cdf(t.abs())))
    };

    Ok(PearsonResult {
        x_column: x_column.to_string(),
        y_column: y_column.to_string(),
        n_obs: n,
        r,
        statistic,
        p_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{classify, Column, Value};
    use approx::assert_relative_eq;

    fn dataset(xs: &[f64], ys: &[f64]) -> (Dataset, Schema) {
        let ds = Dataset::new(vec![
            Column::new("x", xs.iter().map(|&v| Value::Number(v)).collect()),
            Column::new("y", ys.iter().map(|&v| Value::Number(v)).collect()),
        ])
        .unwrap();
        let schema = classify(&ds);
        (ds, schema)
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let (ds, schema) = dataset(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]);
        let result = pearson_correlation(&ds, &schema, "x", "y").unwrap();
        assert_relative_eq!(result.r, 1.0, epsilon = 1e-10);
        assert_eq!(result.p_value, 0.0);
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let (ds, schema) = dataset(&[1.0, 2.0, 3.0, 4.0], &[8.0, 6.0, 4.0, 2.0]);
        let result = pearson_correlation(&ds, &schema, "x", "y").unwrap();
        assert_relative_eq!(result.r, -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_noisy_correlation() {
        let (ds, schema) = dataset(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &[1.1, 2.3, 2.8, 4.2, 4.9, 6.1],
        );
        let result = pearson_correlation(&ds, &schema, "x", "y").unwrap();
        assert!(result.r > 0.95);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_insufficient_pairs() {
        let (ds, schema) = dataset(&[1.0, 2.0], &[2.0, 4.0]);
        let result = pearson_correlation(&ds, &schema, "x", "y");
        assert!(matches!(result, Err(PulseError::InsufficientData(_))));
    }

    #[test]
    fn test_zero_variance() {
        let (ds, schema) = dataset(&[1.0, 1.0, 1.0, 1.0], &[2.0, 4.0, 6.0, 8.0]);
        let result = pearson_correlation(&ds, &schema, "x", "y");
        assert!(matches!(result, Err(PulseError::InsufficientData(_))));
    }

    #[test]
    fn test_missing_pairs_excluded() {
        let ds = Dataset::new(vec![
            Column::new(
                "x",
                vec![
                    Value::Number(1.0),
                    Value::Missing,
                    Value::Number(3.0),
                    Value::Number(4.0),
                ],
            ),
            Column::new(
                "y",
                vec![
                    Value::Number(2.0),
                    Value::Number(9.0),
                    Value::Number(6.0),
                    Value::Number(8.0),
                ],
            ),
        ])
        .unwrap();
        let schema = classify(&ds);
        let result = pearson_correlation(&ds, &schema, "x", "y").unwrap();
        assert_eq!(result.n_obs, 3);
        assert_relative_eq!(result.r, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_pearson_r_helper() {
        assert!(pearson_r(&[1.0], &[1.0]).is_none());
        assert!(pearson_r(&[1.0, 1.0], &[1.0, 2.0]).is_none());
        let r = pearson_r(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert_relative_eq!(r, -1.0, epsilon = 1e-10);
    }
}
