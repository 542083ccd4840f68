//! Chart rendering over the working dataset.
//!
//! Every chart recomputes its aggregation from the dataset it is handed
//! and renders to a PNG file. Zero-row inputs are refused here, not in the
//! filter engine: an empty working dataset is a valid state that charts
//! simply decline to draw.

mod render;

use crate::data::{Dataset, Schema};
use crate::error::{PulseError, Result};
use crate::summary::Aggregate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Available chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Aggregated numeric value per category.
    Bar,
    /// Distribution of a numeric column.
    Histogram,
    /// Two numeric columns as points.
    Scatter,
    /// A numeric column against row order.
    Line,
    /// Line chart with the area under it filled.
    Area,
    /// Category frequencies as a pie.
    Pie,
    /// Correlation heatmap over all numeric columns.
    Heatmap,
}

impl ChartKind {
    /// Lowercase name used in file names and the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Pie => "pie",
            ChartKind::Heatmap => "heatmap",
        }
    }
}

fn default_bins() -> usize {
    15
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

/// What to draw: chart kind, the columns it reads, and image dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Chart type.
    pub kind: ChartKind,
    /// Primary column (category for bar/pie, numeric otherwise). Unused by
    /// heatmaps.
    #[serde(default)]
    pub x: Option<String>,
    /// Secondary column (numeric value for bar, y-axis for scatter).
    #[serde(default)]
    pub y: Option<String>,
    /// Aggregation for bar charts.
    #[serde(default = "ChartSpec::default_aggregate")]
    pub aggregate: Aggregate,
    /// Bin count for histograms.
    #[serde(default = "default_bins")]
    pub bins: usize,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl ChartSpec {
    fn default_aggregate() -> Aggregate {
        Aggregate::Sum
    }

    /// Minimal specification for a chart kind; columns are filled in with
    /// the builder-style setters.
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            aggregate: Aggregate::Sum,
            bins: default_bins(),
            width: default_width(),
            height: default_height(),
        }
    }

    /// Set the primary column.
    pub fn x(mut self, column: &str) -> Self {
        self.x = Some(column.to_string());
        self
    }

    /// Set the secondary column.
    pub fn y(mut self, column: &str) -> Self {
        self.y = Some(column.to_string());
        self
    }

    /// Set the histogram bin count.
    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Set the bar-chart aggregation.
    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub(crate) fn require_x(&self) -> Result<&str> {
        self.x.as_deref().ok_or_else(|| {
            PulseError::InvalidParameter(format!(
                "{} chart requires a primary column",
                self.kind.name()
            ))
        })
    }

    pub(crate) fn require_y(&self) -> Result<&str> {
        self.y.as_deref().ok_or_else(|| {
            PulseError::InvalidParameter(format!(
                "{} chart requires a secondary column",
                self.kind.name()
            ))
        })
    }
}

/// Render a chart of the working dataset to a PNG file.
pub fn render_chart<P: AsRef<Path>>(
    dataset: &Dataset,
    schema: &Schema,
    spec: &ChartSpec,
    path: P,
) -> Result<()> {
    if dataset.is_empty() {
        return Err(PulseError::EmptyData(
            "Cannot chart a dataset with zero rows".to_string(),
        ));
    }
    let path = path.as_ref();
    match spec.kind {
        ChartKind::Bar => render::bar(dataset, schema, spec, path),
        ChartKind::Histogram => render::histogram(dataset, schema, spec, path),
        ChartKind::Scatter => render::scatter(dataset, schema, spec, path),
        ChartKind::Line => render::line(dataset, schema, spec, path),
        ChartKind::Area => render::area(dataset, schema, spec, path),
        ChartKind::Pie => render::pie(dataset, schema, spec, path),
        ChartKind::Heatmap => render::heatmap(dataset, schema, spec, path),
    }
}
