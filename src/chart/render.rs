//! Plotters-backed renderers, one per chart kind.

use crate::chart::ChartSpec;
use crate::data::{Dataset, Schema};
use crate::error::{PulseError, Result};
use crate::summary::{correlation_matrix, group_aggregate, value_counts};
use plotters::prelude::*;
use std::path::Path;

// Categorical series colors (matplotlib tab10 subset)
const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

fn chart_err<E: std::fmt::Display>(e: E) -> PulseError {
    PulseError::Chart(e.to_string())
}

pub(super) fn bar(
    dataset: &Dataset,
    schema: &Schema,
    spec: &ChartSpec,
    path: &Path,
) -> Result<()> {
    let group_col = spec.require_x()?;
    let value_col = spec.require_y()?;
    let groups = group_aggregate(dataset, schema, group_col, value_col, spec.aggregate)?;
    if groups.is_empty() {
        return Err(PulseError::InsufficientData(format!(
            "No groups to draw in '{group_col}'"
        )));
    }

    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let n = groups.len();
    let max_v = groups.iter().map(|g| g.value).fold(f64::NEG_INFINITY, f64::max);
    let min_v = groups.iter().map(|g| g.value).fold(f64::INFINITY, f64::min);
    let y_lo = min_v.min(0.0);
    let y_hi = max_v.max(0.0);
    let pad = ((y_hi - y_lo) * 0.05).max(1e-9);

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{value_col} by {group_col}"), ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), (y_lo - pad)..(y_hi + pad))
        .map_err(chart_err)?;

    let labels: Vec<String> = groups.iter().map(|g| g.group.clone()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x: &f64| {
            let i = x.round();
            if (x - i).abs() < 0.3 && i >= 0.0 && (i as usize) < labels.len() {
                labels[i as usize].clone()
            } else {
                String::new()
            }
        })
        .x_desc(group_col)
        .y_desc(value_col)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            Rectangle::new(
                [(i as f64 - 0.35, 0.0), (i as f64 + 0.35, g.value)],
                PALETTE[0].filled(),
            )
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

pub(super) fn histogram(
    dataset: &Dataset,
    schema: &Schema,
    spec: &ChartSpec,
    path: &Path,
) -> Result<()> {
    let column = spec.require_x()?;
    let hist = crate::summary::histogram(dataset, schema, column, spec.bins)?;

    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    // A single-valued column gets one unit-wide bar around the value
    let (x_lo, x_hi, width) = if hist.bin_width > 0.0 {
        (hist.min, hist.max, hist.bin_width)
    } else {
        (hist.min - 0.5, hist.min + 0.5, 1.0)
    };
    let max_count = hist.counts.iter().copied().max().unwrap_or(0) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution of {column}"), ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, 0f64..max_count * 1.05)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc(column)
        .y_desc("count")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
            let left = x_lo + width * i as f64;
            Rectangle::new(
                [(left, 0.0), (left + width, count as f64)],
                PALETTE[0].mix(0.7).filled(),
            )
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

pub(super) fn scatter(
    dataset: &Dataset,
    schema: &Schema,
    spec: &ChartSpec,
    path: &Path,
) -> Result<()> {
    let x_col = spec.require_x()?;
    let y_col = spec.require_y()?;
    crate::stats::require_kind(dataset, schema, x_col, crate::data::ColumnKind::Numeric)?;
    crate::stats::require_kind(dataset, schema, y_col, crate::data::ColumnKind::Numeric)?;

    let points: Vec<(f64, f64)> = dataset
        .column(x_col)?
        .values()
        .iter()
        .zip(dataset.column(y_col)?.values())
        .filter_map(|(x, y)| Some((x.as_number()?, y.as_number()?)))
        .collect();
    if points.is_empty() {
        return Err(PulseError::InsufficientData(format!(
            "No complete ({x_col}, {y_col}) pairs to plot"
        )));
    }

    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let (x_lo, x_hi) = padded_range(points.iter().map(|(x, _)| *x));
    let (y_lo, y_hi) = padded_range(points.iter().map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{y_col} vs {x_col}"), ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc(x_col)
        .y_desc(y_col)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, PALETTE[0].filled())),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

pub(super) fn line(
    dataset: &Dataset,
    schema: &Schema,
    spec: &ChartSpec,
    path: &Path,
) -> Result<()> {
    let column = spec.require_x()?;
    let points = sequence_points(dataset, schema, column)?;
    draw_sequence(spec, path, column, &points, false)
}

pub(super) fn area(
    dataset: &Dataset,
    schema: &Schema,
    spec: &ChartSpec,
    path: &Path,
) -> Result<()> {
    let column = spec.require_x()?;
    let points = sequence_points(dataset, schema, column)?;
    draw_sequence(spec, path, column, &points, true)
}

fn sequence_points(dataset: &Dataset, schema: &Schema, column: &str) -> Result<Vec<(f64, f64)>> {
    crate::stats::require_kind(dataset, schema, column, crate::data::ColumnKind::Numeric)?;
    let values = dataset.column(column)?.numbers();
    if values.len() < 2 {
        return Err(PulseError::InsufficientData(format!(
            "'{column}' needs at least 2 observations for a line"
        )));
    }
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i as f64, v))
        .collect())
}

fn draw_sequence(
    spec: &ChartSpec,
    path: &Path,
    column: &str,
    points: &[(f64, f64)],
    filled: bool,
) -> Result<()> {
    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let x_hi = (points.len() - 1) as f64;
    let (mut y_lo, mut y_hi) = padded_range(points.iter().map(|(_, y)| *y));
    if filled {
        // Area charts are anchored at zero
        y_lo = y_lo.min(0.0);
        y_hi = y_hi.max(0.0);
    }

    let title = if filled {
        format!("Area chart of {column}")
    } else {
        format!("Line chart of {column}")
    };
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_hi, y_lo..y_hi)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("row")
        .y_desc(column)
        .draw()
        .map_err(chart_err)?;

    if filled {
        chart
            .draw_series(
                AreaSeries::new(points.iter().copied(), 0.0, PALETTE[0].mix(0.25))
                    .border_style(PALETTE[0]),
            )
            .map_err(chart_err)?;
    } else {
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &PALETTE[0]))
            .map_err(chart_err)?;
    }

    root.present().map_err(chart_err)?;
    Ok(())
}

pub(super) fn pie(
    dataset: &Dataset,
    schema: &Schema,
    spec: &ChartSpec,
    path: &Path,
) -> Result<()> {
    let column = spec.require_x()?;
    let counts = value_counts(dataset, schema, column)?;
    if counts.is_empty() {
        return Err(PulseError::InsufficientData(format!(
            "'{column}' has no values to count"
        )));
    }

    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let root = root
        .titled(&format!("Pie chart of {column}"), ("sans-serif", 30))
        .map_err(chart_err)?;

    let sizes: Vec<f64> = counts.iter().map(|(_, c)| *c as f64).collect();
    let labels: Vec<String> = counts.iter().map(|(label, _)| label.clone()).collect();
    let colors: Vec<RGBColor> = (0..counts.len())
        .map(|i| PALETTE[i % PALETTE.len()])
        .collect();

    let center = (spec.width as i32 / 2, spec.height as i32 / 2);
    let radius = spec.width.min(spec.height) as f64 * 0.35;
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", 18).into_font());
    root.draw(&pie).map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

pub(super) fn heatmap(
    dataset: &Dataset,
    schema: &Schema,
    spec: &ChartSpec,
    path: &Path,
) -> Result<()> {
    let matrix = correlation_matrix(dataset, schema)?;
    let n = matrix.len();
    if n < 2 {
        return Err(PulseError::InsufficientData(
            "Correlation heatmap requires at least 2 numeric columns".to_string(),
        ));
    }

    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation heatmap", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..n as f64, 0f64..n as f64)
        .map_err(chart_err)?;

    let x_names = matrix.columns.clone();
    let y_names = matrix.columns.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&|x: &f64| {
            let i = x.floor() as usize;
            x_names.get(i).cloned().unwrap_or_default()
        })
        .y_label_formatter(&|y: &f64| {
            let i = y.floor() as usize;
            if i < n {
                y_names[n - 1 - i].clone()
            } else {
                String::new()
            }
        })
        .draw()
        .map_err(chart_err)?;

    // Row 0 at the top
    chart
        .draw_series((0..n).flat_map(|i| {
            let matrix = &matrix;
            (0..n).map(move |j| {
                let r = matrix.get(i, j);
                let y0 = (n - 1 - i) as f64;
                Rectangle::new(
                    [(j as f64, y0), (j as f64 + 1.0, y0 + 1.0)],
                    diverging_color(r).filled(),
                )
            })
        }))
        .map_err(chart_err)?;

    chart
        .draw_series((0..n).flat_map(|i| {
            let matrix = &matrix;
            (0..n).map(move |j| {
                let r = matrix.get(i, j);
                let label = if r.is_nan() {
                    "-".to_string()
                } else {
                    format!("{r:.2}")
                };
                Text::new(
                    label,
                    (j as f64 + 0.35, (n - 1 - i) as f64 + 0.55),
                    ("sans-serif", 16).into_font().color(&BLACK),
                )
            })
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Map a correlation in [-1, 1] to a blue-white-red diverging color.
/// NaN entries come out grey.
fn diverging_color(r: f64) -> RGBColor {
    if r.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let r = r.clamp(-1.0, 1.0);
    if r >= 0.0 {
        let t = r;
        RGBColor(255, (255.0 * (1.0 - t * 0.8)) as u8, (255.0 * (1.0 - t)) as u8)
    } else {
        let t = -r;
        RGBColor((255.0 * (1.0 - t)) as u8, (255.0 * (1.0 - t * 0.8)) as u8, 255)
    }
}

fn padded_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo == hi {
        (lo - 1.0, hi + 1.0)
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{render_chart, ChartKind};
    use crate::data::{classify, Column, Value};

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
    fn test_diverging_color_endpoints() {
        assert_eq!(diverging_color(1.0), RGBColor(255, 51, 0));
        assert_eq!(diverging_color(-1.0), RGBColor(0, 51, 255));
        assert_eq!(diverging_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(diverging_color(f64::NAN), RGBColor(200, 200, 200));
    }

    #[test]
    fn test_padded_range() {
        let (lo, hi) = padded_range([1.0, 2.0, 3.0].into_iter());
        assert!(lo < 1.0 && hi > 3.0);
        let (lo, hi) = padded_range([5.0, 5.0].into_iter());
        assert!(lo < 5.0 && hi > 5.0);
    }

    // Rendering smoke tests need a font for captions, which headless CI
    // boxes often lack.
    #[test]
    #[ignore = "requires a system font"]
    fn test_render_every_kind() {
        let (ds, schema) = sample();
        let dir = tempfile::tempdir().unwrap();

        let specs = vec![
            ChartSpec::new(ChartKind::Bar).x("Drug").y("Age"),
            ChartSpec::new(ChartKind::Histogram).x("Age").bins(5),
            ChartSpec::new(ChartKind::Scatter).x("Age").y("Dose"),
            ChartSpec::new(ChartKind::Line).x("Age"),
            ChartSpec::new(ChartKind::Area).x("Age"),
            ChartSpec::new(ChartKind::Pie).x("Drug"),
            ChartSpec::new(ChartKind::Heatmap),
        ];
        for spec in specs {
            let path = dir.path().join(format!("{}.png", spec.kind.name()));
            render_chart(&ds, &schema, &spec, &path).unwrap();
            let metadata = std::fs::metadata(&path).unwrap();
            assert!(metadata.len() > 0, "{} chart is empty", spec.kind.name());
        }
    }
}
