//! Pipeline execution state.

use crate::data::{classify, Dataset, Schema, Value};
use crate::error::Result;
use crate::filter::{apply_filter, FilterReport, FilterSpec};
use crate::pipeline::PipelineStep;
use crate::report::Report;
use crate::stats::{anova_oneway, chi_square_independence, pearson_correlation, welch_t_test};
use crate::summary::{describe, NumericSummary};
use std::path::PathBuf;

/// State threaded through the steps of one pipeline run.
///
/// The source dataset and its schema are fixed at construction; filter
/// steps rebuild the working dataset from the source, so the schema never
/// changes mid-run.
#[derive(Debug, Clone)]
pub struct PipelineState {
    name: String,
    source: Dataset,
    schema: Schema,
    working: Dataset,
    spec: FilterSpec,
    filter_report: Option<FilterReport>,
    summaries: Vec<NumericSummary>,
    tests: Vec<String>,
    charts: Vec<(String, PathBuf)>,
    reports: Vec<PathBuf>,
}

impl PipelineState {
    pub(crate) fn new(name: String, source: Dataset) -> Self {
        let schema = classify(&source);
        let working = source.clone();
        Self {
            name,
            source,
            schema,
            working,
            spec: FilterSpec::new(),
            filter_report: None,
            summaries: Vec::new(),
            tests: Vec::new(),
            charts: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// The working dataset after all filter steps so far.
    pub fn working(&self) -> &Dataset {
        &self.working
    }

    /// Schema of the source dataset.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Row counts from the most recent filter step.
    pub fn filter_report(&self) -> Option<&FilterReport> {
        self.filter_report.as_ref()
    }

    /// Summaries from the most recent describe step.
    pub fn summaries(&self) -> &[NumericSummary] {
        &self.summaries
    }

    /// Rendered outcomes of every test step, in run order.
    pub fn test_results(&self) -> &[String] {
        &self.tests
    }

    /// Charts rendered so far (caption, file path).
    pub fn charts(&self) -> &[(String, PathBuf)] {
        &self.charts
    }

    /// Report files written so far.
    pub fn reports(&self) -> &[PathBuf] {
        &self.reports
    }

    pub(crate) fn execute(&mut self, step: &PipelineStep) -> Result<()> {
        match step {
            PipelineStep::FilterValues { column, values } => {
                let parsed: Vec<Value> = values.iter().map(|s| Value::parse(s)).collect();
                self.spec = self.spec.clone().keep_values(column, parsed);
                self.refilter()
            }
            PipelineStep::FilterRange { column, min, max } => {
                self.spec = self.spec.clone().keep_range(column, *min, *max);
                self.refilter()
            }
            PipelineStep::Describe => {
                self.summaries = describe(&self.working, &self.schema);
                Ok(())
            }
            PipelineStep::TTest {
                value_column,
                group_column,
            } => {
                let result =
                    welch_t_test(&self.working, &self.schema, value_column, group_column)?;
                self.tests.push(result.to_string());
                Ok(())
            }
            PipelineStep::Anova {
                value_column,
                group_column,
            } => {
                let result =
                    anova_oneway(&self.working, &self.schema, value_column, group_column)?;
                self.tests.push(result.to_string());
                Ok(())
            }
            PipelineStep::ChiSquare { column_a, column_b } => {
                let result =
                    chi_square_independence(&self.working, &self.schema, column_a, column_b)?;
                self.tests.push(result.to_string());
                Ok(())
            }
            PipelineStep::Correlation { column_a, column_b } => {
                let result =
                    pearson_correlation(&self.working, &self.schema, column_a, column_b)?;
                self.tests.push(result.to_string());
                Ok(())
            }
            PipelineStep::Chart { spec, output } => {
                crate::chart::render_chart(&self.working, &self.schema, spec, output)?;
                let caption = match (&spec.x, &spec.y) {
                    (Some(x), Some(y)) => format!("{} ({}, {})", spec.kind.name(), x, y),
                    (Some(x), None) => format!("{} ({})", spec.kind.name(), x),
                    _ => spec.kind.name().to_string(),
                };
                self.charts.push((caption, output.clone()));
                Ok(())
            }
            PipelineStep::Report {
                output,
                preview_rows,
            } => {
                let report = self.build_report(*preview_rows);
                report.write_to_file(output)?;
                self.reports.push(output.clone());
                Ok(())
            }
        }
    }

    fn refilter(&mut self) -> Result<()> {
        let (working, report) = apply_filter(&self.source, &self.schema, &self.spec)?;
        self.working = working;
        self.filter_report = Some(report);
        Ok(())
    }

    /// Assemble the session report from everything the run produced so far.
    pub fn build_report(&self, preview_rows: usize) -> Report {
        let mut report = Report::new(&self.name);
        report.add_overview(&self.working, &self.schema);
        report.add_preview(&self.working, preview_rows);
        if let Some(filter_report) = &self.filter_report {
            report.add_filter_report(filter_report);
        }
        if !self.summaries.is_empty() {
            report.add_summaries(&self.summaries);
        }
        for rendered in &self.tests {
            report.add_test_result(rendered);
        }
        for (caption, path) in &self.charts {
            report.add_chart(caption, path);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use crate::pipeline::Pipeline;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new(
                "Age",
                vec![
                    Value::Number(23.0),
                    Value::Number(45.0),
                    Value::Number(31.0),
                    Value::Number(52.0),
                    Value::Number(29.0),
                    Value::Number(61.0),
                ],
            ),
            Column::new(
                "Drug",
                vec![
                    Value::from("A"),
                    Value::from("B"),
                    Value::from("A"),
                    Value::from("B"),
                    Value::from("A"),
                    Value::from("B"),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_filter_steps_accumulate() {
        let pipeline = Pipeline::new("screen")
            .add_step(PipelineStep::FilterValues {
                column: "Drug".to_string(),
                values: vec!["A".to_string()],
            })
            .add_step(PipelineStep::FilterRange {
                column: "Age".to_string(),
                min: 25.0,
                max: 60.0,
            });
        let state = pipeline.run(&sample()).unwrap();

        assert_eq!(state.working().n_rows(), 2);
        let report = state.filter_report().unwrap();
        assert_eq!(report.rows_before, 6);
        assert_eq!(report.active_filters, 2);
    }

    #[test]
    fn test_describe_and_test_steps_use_working_dataset() {
        let pipeline = Pipeline::new("analysis")
            .add_step(PipelineStep::Describe)
            .add_step(PipelineStep::TTest {
                value_column: "Age".to_string(),
                group_column: "Drug".to_string(),
            });
        let state = pipeline.run(&sample()).unwrap();

        assert_eq!(state.summaries().len(), 1);
        assert_eq!(state.summaries()[0].column, "Age");
        assert_eq!(state.test_results().len(), 1);
        assert!(state.test_results()[0].contains("Welch t-test"));
    }

    #[test]
    fn test_failing_step_aborts_the_run() {
        let pipeline = Pipeline::new("broken").add_step(PipelineStep::FilterValues {
            column: "Dose".to_string(),
            values: vec!["low".to_string()],
        });
        assert!(pipeline.run(&sample()).is_err());
    }

    #[test]
    fn test_report_step_writes_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("session.md");

        let pipeline = Pipeline::new("trial-screen")
            .add_step(PipelineStep::FilterValues {
                column: "Drug".to_string(),
                values: vec!["A".to_string(), "B".to_string()],
            })
            .add_step(PipelineStep::Describe)
            .add_step(PipelineStep::Report {
                output: out.clone(),
                preview_rows: 3,
            });
        let state = pipeline.run(&sample()).unwrap();

        assert_eq!(state.reports(), &[out.clone()]);
        let md = std::fs::read_to_string(&out).unwrap();
        assert!(md.starts_with("# trial-screen"));
        assert!(md.contains("## Preview"));
        assert!(md.contains("Showing 3 of 6 rows."));
        assert!(md.contains("| Age | 6 |"));
    }

    #[test]
    fn test_numeric_values_in_value_filter_strings() {
        // A categorical column can hold numbers; filter strings parse the
        // same way cells do
        let ds = Dataset::new(vec![Column::new(
            "code",
            vec![Value::parse("1"), Value::parse("x"), Value::parse("1")],
        )])
        .unwrap();
        let pipeline = Pipeline::new("codes").add_step(PipelineStep::FilterValues {
            column: "code".to_string(),
            values: vec!["1".to_string()],
        });
        let state = pipeline.run(&ds).unwrap();
        assert_eq!(state.working().n_rows(), 2);
    }
}
