//! datapulse - Dataset classifier and filter engine CLI
//!
//! Command-line interface for loading tabular files, classifying columns,
//! filtering rows, and producing summaries, charts and reports.

use clap::{Parser, Subcommand, ValueEnum};
use datapulse::chart::{render_chart, ChartKind, ChartSpec};
use datapulse::data::{classify, Dataset, Schema, Value};
use datapulse::error::{PulseError, Result};
use datapulse::filter::{apply_filter, FilterSpec};
use datapulse::loader::{load_path, write_csv};
use datapulse::pipeline::{Pipeline, PipelineConfig, PipelineStep};
use datapulse::stats::{
    anova_oneway, chi_square_independence, pearson_correlation, welch_t_test,
};
use datapulse::summary::{describe, Aggregate};
use std::path::PathBuf;

/// CLI-friendly chart kind enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliChartKind {
    /// Aggregated numeric value per category
    Bar,
    /// Distribution of a numeric column
    Histogram,
    /// Two numeric columns as points
    Scatter,
    /// A numeric column against row order
    Line,
    /// Line chart with the area under it filled
    Area,
    /// Category frequencies as a pie
    Pie,
    /// Correlation heatmap over all numeric columns
    Heatmap,
}

impl From<CliChartKind> for ChartKind {
    fn from(kind: CliChartKind) -> Self {
        match kind {
            CliChartKind::Bar => ChartKind::Bar,
            CliChartKind::Histogram => ChartKind::Histogram,
            CliChartKind::Scatter => ChartKind::Scatter,
            CliChartKind::Line => ChartKind::Line,
            CliChartKind::Area => ChartKind::Area,
            CliChartKind::Pie => ChartKind::Pie,
            CliChartKind::Heatmap => ChartKind::Heatmap,
        }
    }
}

/// CLI-friendly aggregation enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAggregate {
    Sum,
    Mean,
    Count,
}

impl From<CliAggregate> for Aggregate {
    fn from(aggregate: CliAggregate) -> Self {
        match aggregate {
            CliAggregate::Sum => Aggregate::Sum,
            CliAggregate::Mean => Aggregate::Mean,
            CliAggregate::Count => Aggregate::Count,
        }
    }
}

/// Hypothesis test selector
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTest {
    /// Welch two-sample t-test (numeric value, two-level group)
    TTest,
    /// One-way ANOVA (numeric value, categorical group)
    Anova,
    /// Chi-square test of independence (two categorical columns)
    ChiSquare,
    /// Pearson correlation (two numeric columns)
    Correlation,
}

/// Dataset classifier and filter engine
#[derive(Parser)]
#[command(name = "datapulse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a dataset and print its schema and numeric summaries
    Inspect {
        /// Path to a CSV, TSV or Excel file
        input: PathBuf,

        /// Preview rows to print (text format only)
        #[arg(long, default_value = "10")]
        preview: usize,

        /// Output format: text, json, or yaml
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Filter rows and optionally write the working dataset to CSV
    Filter {
        /// Path to a CSV, TSV or Excel file
        input: PathBuf,

        /// Value filter "column=v1,v2" (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Range filter "column=min..max" (repeatable)
        #[arg(short, long = "range")]
        ranges: Vec<String>,

        /// Output path for the working dataset CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a chart of the (optionally filtered) dataset
    Chart {
        /// Path to a CSV, TSV or Excel file
        input: PathBuf,

        /// Chart type
        #[arg(short, long)]
        kind: CliChartKind,

        /// Primary column (category for bar/pie, numeric otherwise)
        #[arg(short, long)]
        x: Option<String>,

        /// Secondary column (numeric value for bar, y-axis for scatter)
        #[arg(short, long)]
        y: Option<String>,

        /// Aggregation for bar charts
        #[arg(long, default_value = "sum")]
        aggregate: CliAggregate,

        /// Bin count for histograms
        #[arg(long, default_value = "15")]
        bins: usize,

        /// Value filter "column=v1,v2" (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Range filter "column=min..max" (repeatable)
        #[arg(short, long = "range")]
        ranges: Vec<String>,

        /// Output path for the PNG image
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run a hypothesis test on two columns
    Test {
        /// Path to a CSV, TSV or Excel file
        input: PathBuf,

        /// Which test to run
        #[arg(short, long)]
        test: CliTest,

        /// First column (the numeric value for t-test/ANOVA)
        #[arg(short = 'a', long)]
        column_a: String,

        /// Second column (the grouping column for t-test/ANOVA)
        #[arg(short = 'b', long)]
        column_b: String,
    },

    /// Run a pipeline from a YAML configuration file
    Run {
        /// Path to pipeline configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Path to a CSV, TSV or Excel file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Write an example pipeline configuration
    Example {
        /// Output path for the YAML file
        #[arg(short, long, default_value = "pipeline.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect {
            input,
            preview,
            format,
        } => cmd_inspect(&input, preview, &format),
        Commands::Filter {
            input,
            filters,
            ranges,
            output,
        } => cmd_filter(&input, &filters, &ranges, output.as_deref()),
        Commands::Chart {
            input,
            kind,
            x,
            y,
            aggregate,
            bins,
            filters,
            ranges,
            output,
        } => cmd_chart(
            &input, kind, x, y, aggregate, bins, &filters, &ranges, &output,
        ),
        Commands::Test {
            input,
            test,
            column_a,
            column_b,
        } => cmd_test(&input, test, &column_a, &column_b),
        Commands::Run { config, input } => cmd_run(&config, &input),
        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load(input: &PathBuf) -> Result<(Dataset, Schema)> {
    eprintln!("Loading {:?}...", input);
    let dataset = load_path(input)?;
    let schema = classify(&dataset);
    eprintln!(
        "Loaded {} rows x {} columns ({} numeric, {} categorical)",
        dataset.n_rows(),
        dataset.n_columns(),
        schema.numeric_columns().len(),
        schema.categorical_columns().len()
    );
    Ok((dataset, schema))
}

/// Parse "column=v1,v2" into a value filter.
fn parse_value_filter(raw: &str) -> Result<(String, Vec<Value>)> {
    let (column, rest) = raw.split_once('=').ok_or_else(|| {
        PulseError::InvalidParameter(format!("Expected \"column=v1,v2\", got \"{raw}\""))
    })?;
    let values = rest.split(',').map(Value::parse).collect();
    Ok((column.to_string(), values))
}

/// Parse "column=min..max" into a range filter.
fn parse_range_filter(raw: &str) -> Result<(String, f64, f64)> {
    let invalid = || {
        PulseError::InvalidParameter(format!("Expected \"column=min..max\", got \"{raw}\""))
    };
    let (column, rest) = raw.split_once('=').ok_or_else(invalid)?;
    let (min, max) = rest.split_once("..").ok_or_else(invalid)?;
    let min: f64 = min.trim().parse().map_err(|_| invalid())?;
    let max: f64 = max.trim().parse().map_err(|_| invalid())?;
    Ok((column.to_string(), min, max))
}

fn build_spec(filters: &[String], ranges: &[String]) -> Result<FilterSpec> {
    let mut spec = FilterSpec::new();
    for raw in filters {
        let (column, values) = parse_value_filter(raw)?;
        spec = spec.keep_values(&column, values);
    }
    for raw in ranges {
        let (column, min, max) = parse_range_filter(raw)?;
        spec = spec.keep_range(&column, min, max);
    }
    Ok(spec)
}

fn cmd_inspect(input: &PathBuf, preview: usize, format: &str) -> Result<()> {
    let (dataset, schema) = load(input)?;

    if format == "json" || format == "yaml" {
        let profile = serde_json::json!({
            "dimensions": {
                "n_rows": dataset.n_rows(),
                "n_columns": dataset.n_columns()
            },
            "schema": {
                "numeric": schema.numeric_columns(),
                "categorical": schema.categorical_columns(),
                "low_cardinality": schema.low_cardinality_columns()
            },
            "summaries": describe(&dataset, &schema)
        });
        if format == "json" {
            println!("{}", serde_json::to_string_pretty(&profile)?);
        } else {
            println!("{}", serde_yaml::to_string(&profile)?);
        }
        return Ok(());
    }
    if format != "text" {
        return Err(PulseError::InvalidParameter(format!(
            "Unknown format \"{format}\" (expected text, json, or yaml)"
        )));
    }

    println!("Numeric columns:     {}", schema.numeric_columns().join(", "));
    println!(
        "Categorical columns: {}",
        schema.categorical_columns().join(", ")
    );
    if !schema.low_cardinality_columns().is_empty() {
        println!(
            "Possibly categorical (few distinct values): {}",
            schema.low_cardinality_columns().join(", ")
        );
    }

    println!();
    for summary in describe(&dataset, &schema) {
        print!("{}", summary);
    }

    if preview > 0 && !dataset.is_empty() {
        println!();
        println!("First {} rows:", preview.min(dataset.n_rows()));
        println!("{}", dataset.column_names().join("\t"));
        let head = dataset.head(preview);
        for row in 0..head.n_rows() {
            let cells: Vec<String> = head.row(row).iter().map(|v| v.to_string()).collect();
            println!("{}", cells.join("\t"));
        }
    }
    Ok(())
}

fn cmd_filter(
    input: &PathBuf,
    filters: &[String],
    ranges: &[String],
    output: Option<&std::path::Path>,
) -> Result<()> {
    let (dataset, schema) = load(input)?;
    let spec = build_spec(filters, ranges)?;
    let (working, report) = apply_filter(&dataset, &schema, &spec)?;

    print!("{}", report);
    if let Some(path) = output {
        write_csv(&working, path)?;
        eprintln!("Wrote {} rows to {:?}", working.n_rows(), path);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_chart(
    input: &PathBuf,
    kind: CliChartKind,
    x: Option<String>,
    y: Option<String>,
    aggregate: CliAggregate,
    bins: usize,
    filters: &[String],
    ranges: &[String],
    output: &PathBuf,
) -> Result<()> {
    let (dataset, schema) = load(input)?;
    let spec = build_spec(filters, ranges)?;
    let (working, report) = apply_filter(&dataset, &schema, &spec)?;
    if report.active_filters > 0 {
        eprintln!(
            "{} of {} rows after filtering",
            report.rows_after, report.rows_before
        );
    }

    let mut chart_spec = ChartSpec::new(kind.into())
        .aggregate(aggregate.into())
        .bins(bins);
    if let Some(x) = x {
        chart_spec = chart_spec.x(&x);
    }
    if let Some(y) = y {
        chart_spec = chart_spec.y(&y);
    }

    render_chart(&working, &schema, &chart_spec, output)?;
    eprintln!("Wrote chart to {:?}", output);
    Ok(())
}

fn cmd_test(input: &PathBuf, test: CliTest, column_a: &str, column_b: &str) -> Result<()> {
    let (dataset, schema) = load(input)?;

    match test {
        CliTest::TTest => {
            let result = welch_t_test(&dataset, &schema, column_a, column_b)?;
            print!("{}", result);
        }
        CliTest::Anova => {
            let result = anova_oneway(&dataset, &schema, column_a, column_b)?;
            print!("{}", result);
        }
        CliTest::ChiSquare => {
            let result = chi_square_independence(&dataset, &schema, column_a, column_b)?;
            print!("{}", result);
        }
        CliTest::Correlation => {
            let result = pearson_correlation(&dataset, &schema, column_a, column_b)?;
            print!("{}", result);
        }
    }
    Ok(())
}

fn cmd_run(config_path: &PathBuf, input: &PathBuf) -> Result<()> {
    eprintln!("Loading pipeline configuration from {:?}...", config_path);
    let config = PipelineConfig::from_file(config_path)?;

    let (dataset, _) = load(input)?;
    eprintln!("Running pipeline '{}'...", config.name);
    let pipeline = Pipeline::from_config(config);
    let state = pipeline.run(&dataset)?;

    if let Some(report) = state.filter_report() {
        print!("{}", report);
    }
    for summary in state.summaries() {
        print!("{}", summary);
    }
    for result in state.test_results() {
        print!("{}", result);
    }
    for (caption, path) in state.charts() {
        eprintln!("Wrote chart {} to {:?}", caption, path);
    }
    for path in state.reports() {
        eprintln!("Wrote report to {:?}", path);
    }
    eprintln!(
        "Done! {} rows in the working dataset",
        state.working().n_rows()
    );
    Ok(())
}

fn cmd_example(output_path: &PathBuf) -> Result<()> {
    let mut config = PipelineConfig::new("example-session");
    config.description = Some("Filter, summarize, test and report".to_string());
    config.steps = vec![
        PipelineStep::FilterValues {
            column: "Drug".to_string(),
            values: vec!["A".to_string(), "B".to_string()],
        },
        PipelineStep::FilterRange {
            column: "Age".to_string(),
            min: 18.0,
            max: 65.0,
        },
        PipelineStep::Describe,
        PipelineStep::TTest {
            value_column: "Age".to_string(),
            group_column: "Drug".to_string(),
        },
        PipelineStep::Chart {
            spec: ChartSpec::new(ChartKind::Histogram).x("Age"),
            output: PathBuf::from("age_histogram.png"),
        },
        PipelineStep::Report {
            output: PathBuf::from("session.md"),
            preview_rows: 10,
        },
    ];

    let yaml = config.to_yaml()?;
    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example pipeline to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    eprintln!("{}", yaml);
    Ok(())
}
