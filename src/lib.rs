//! Dataset classifier and filter engine
//!
//! This library loads tabular files, classifies every column as numeric or
//! categorical, and reduces the data to a working dataset with composable
//! row filters. Summaries, hypothesis tests, charts and markdown reports
//! all operate on the working dataset.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (Value, Column, Dataset, Schema)
//! - **loader**: File loading (CSV, TSV, Excel workbooks)
//! - **filter**: Row filtering (value sets, numeric ranges)
//! - **summary**: Descriptive statistics and chart-feeding aggregations
//! - **stats**: Hypothesis tests (Welch t-test, ANOVA, chi-square, Pearson)
//! - **chart**: PNG chart rendering (bar, histogram, scatter, line, area,
//!   pie, heatmap)
//! - **report**: Markdown session reports
//! - **pipeline**: Declarative, replayable analysis pipelines
//!
//! # Example
//!
//! ```no_run
//! use datapulse::prelude::*;
//!
//! // Load and classify
//! let dataset = load_path("trial.csv").unwrap();
//! let schema = classify(&dataset);
//!
//! // Reduce to the working dataset
//! let spec = FilterSpec::new()
//!     .keep_values("Drug", ["A", "B"])
//!     .keep_range("Age", 18.0, 65.0);
//! let (working, report) = apply_filter(&dataset, &schema, &spec).unwrap();
//! println!("{report}");
//!
//! // Summarize and test
//! for summary in describe(&working, &schema) {
//!     println!("{summary}");
//! }
//! let t = welch_t_test(&working, &schema, "Age", "Drug").unwrap();
//! println!("{t}");
//! ```

pub mod chart;
pub mod data;
pub mod error;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod summary;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::chart::{render_chart, ChartKind, ChartSpec};
    pub use crate::data::{classify, Column, ColumnKind, Dataset, Schema, Value};
    pub use crate::error::{PulseError, Result};
    pub use crate::filter::{apply_filter, ColumnFilter, FilterReport, FilterSpec};
    pub use crate::loader::{load_path, load_with_format, write_csv, Format};
    pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineState, PipelineStep};
    pub use crate::report::Report;
    pub use crate::stats::{
        anova_oneway, chi_square_independence, pearson_correlation, welch_t_test, AnovaResult,
        ChiSquareResult, PearsonResult, TTestResult,
    };
    pub use crate::summary::{
        correlation_matrix, describe, group_aggregate, histogram, value_counts, Aggregate,
        CorrelationMatrix, GroupValue, Histogram, NumericSummary,
    };
}
