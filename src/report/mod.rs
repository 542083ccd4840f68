//! Markdown session reports.
//!
//! A report collects what happened in one analysis session (load, classify,
//! filter, summarize, test, chart) into a single markdown document. Sections
//! are appended in call order.

use crate::data::{Dataset, Schema};
use crate::error::Result;
use crate::filter::FilterReport;
use crate::summary::NumericSummary;
use std::fmt::Write as _;
use std::path::Path;

/// Markdown report under construction.
#[derive(Debug, Clone)]
pub struct Report {
    title: String,
    sections: Vec<String>,
}

impl Report {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    /// Append a free-form section with a `##` heading.
    pub fn add_section(&mut self, heading: &str, body: &str) -> &mut Self {
        let mut section = String::new();
        let _ = writeln!(section, "## {heading}\n");
        section.push_str(body.trim_end());
        section.push('\n');
        self.sections.push(section);
        self
    }

    /// Dataset dimensions and the numeric/categorical split.
    pub fn add_overview(&mut self, dataset: &Dataset, schema: &Schema) -> &mut Self {
        let mut body = String::new();
        let _ = writeln!(
            body,
            "{} rows, {} columns.\n",
            dataset.n_rows(),
            dataset.n_columns()
        );
        let _ = writeln!(body, "- Numeric: {}", name_list(schema.numeric_columns()));
        let _ = writeln!(
            body,
            "- Categorical: {}",
            name_list(schema.categorical_columns())
        );
        if !schema.low_cardinality_columns().is_empty() {
            let _ = writeln!(
                body,
                "- Possibly categorical (few distinct values): {}",
                name_list(schema.low_cardinality_columns())
            );
        }
        self.add_section("Dataset", &body)
    }

    /// First `n` rows as a markdown table.
    pub fn add_preview(&mut self, dataset: &Dataset, n: usize) -> &mut Self {
        let head = dataset.head(n);
        let mut body = String::new();
        if head.n_columns() == 0 {
            body.push_str("(no columns)\n");
            return self.add_section("Preview", &body);
        }

        let names = head.column_names();
        let _ = writeln!(body, "| {} |", names.join(" | "));
        let _ = writeln!(
            body,
            "|{}|",
            names.iter().map(|_| " --- ").collect::<Vec<_>>().join("|")
        );
        for row in 0..head.n_rows() {
            let cells: Vec<String> = head.row(row).iter().map(|v| v.to_string()).collect();
            let _ = writeln!(body, "| {} |", cells.join(" | "));
        }
        if head.n_rows() < dataset.n_rows() {
            let _ = writeln!(
                body,
                "\nShowing {} of {} rows.",
                head.n_rows(),
                dataset.n_rows()
            );
        }
        self.add_section("Preview", &body)
    }

    /// Row counts before and after filtering.
    pub fn add_filter_report(&mut self, report: &FilterReport) -> &mut Self {
        let mut body = String::new();
        let _ = writeln!(
            body,
            "{} of {} rows kept ({} removed, {} active filters).",
            report.rows_after, report.rows_before, report.rows_removed, report.active_filters
        );
        self.add_section("Filters", &body)
    }

    /// Descriptive statistics as a markdown table.
    pub fn add_summaries(&mut self, summaries: &[NumericSummary]) -> &mut Self {
        let mut body = String::new();
        if summaries.is_empty() {
            body.push_str("No numeric columns.\n");
            return self.add_section("Numeric summary", &body);
        }
        body.push_str("| column | count | mean | std | min | median | max |\n");
        body.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
        for s in summaries {
            let _ = writeln!(
                body,
                "| {} | {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} |",
                s.column, s.count, s.mean, s.std, s.min, s.median, s.max
            );
        }
        self.add_section("Numeric summary", &body)
    }

    /// A hypothesis test outcome, rendered from its display form.
    pub fn add_test_result<T: std::fmt::Display>(&mut self, result: &T) -> &mut Self {
        let body = format!("```\n{}```\n", result);
        self.add_section("Hypothesis test", &body)
    }

    /// A link to a rendered chart image.
    pub fn add_chart(&mut self, caption: &str, path: &Path) -> &mut Self {
        let body = format!("![{}]({})\n", caption, path.display());
        self.add_section("Chart", &body)
    }

    /// Render the whole report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", self.title);
        for section in &self.sections {
            out.push_str(section);
            out.push('\n');
        }
        out
    }

    /// Write the report to a file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_markdown())?;
        Ok(())
    }
}

fn name_list(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
