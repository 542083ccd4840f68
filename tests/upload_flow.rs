//! Integration tests for the full upload-classify-filter-analyze flow.

use datapulse::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Write a synthetic clinical-trial CSV with a known group effect.
///
/// 40 rows, two drugs. Drug B patients respond about 20 points higher than
/// drug A patients; age carries a deterministic spread plus two missing
/// cells and one "N/A" marker in the notes column.
fn create_trial_csv() -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(file, "Age,Response,Drug,Site,Notes").unwrap();

    let mut seed = 42u64;
    let mut simple_rand = move || -> f64 {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        ((seed >> 16) & 0x7FFF) as f64 / 32768.0
    };

    for i in 0..40 {
        let drug = if i % 2 == 0 { "A" } else { "B" };
        let site = if i % 4 < 2 { "north" } else { "south" };
        let age = 20 + (i * 7) % 50;
        let base = if drug == "A" { 50.0 } else { 70.0 };
        let response = base + 6.0 * simple_rand();

        let age_field = if i == 5 || i == 11 {
            String::new() // missing
        } else {
            age.to_string()
        };
        let notes = if i == 3 { "N/A" } else { "ok" };

        writeln!(
            file,
            "{},{:.2},{},{},{}",
            age_field, response, drug, site, notes
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_load_and_classify() {
    let file = create_trial_csv();
    let dataset = load_path(file.path()).unwrap();
    let schema = classify(&dataset);

    assert_eq!(dataset.n_rows(), 40);
    assert_eq!(dataset.n_columns(), 5);

    assert!(schema.is_numeric("Age"));
    assert!(schema.is_numeric("Response"));
    assert!(schema.is_categorical("Drug"));
    assert!(schema.is_categorical("Site"));
    // One "N/A" cell makes the whole column categorical
    assert!(schema.is_categorical("Notes"));

    // Missing age cells survive as missing, not as zeros
    let ages = dataset.column("Age").unwrap();
    assert_eq!(ages.values().iter().filter(|v| v.is_missing()).count(), 2);
    assert_eq!(ages.numbers().len(), 38);
}

#[test]
fn test_filter_then_summarize() {
    let file = create_trial_csv();
    let dataset = load_path(file.path()).unwrap();
    let schema = classify(&dataset);

    let spec = FilterSpec::new()
        .keep_values("Drug", ["A"])
        .keep_range("Age", 25.0, 60.0);
    let (working, report) = apply_filter(&dataset, &schema, &spec).unwrap();

    assert_eq!(report.rows_before, 40);
    assert_eq!(report.active_filters, 2);
    assert_eq!(report.rows_after, working.n_rows());
    assert!(working.n_rows() < 40);

    for v in working.column("Drug").unwrap().values() {
        assert_eq!(v, &Value::from("A"));
    }
    for age in working.column("Age").unwrap().numbers() {
        assert!((25.0..=60.0).contains(&age));
    }

    let summaries = describe(&working, &schema);
    let age = summaries.iter().find(|s| s.column == "Age").unwrap();
    assert!(age.min >= 25.0 && age.max <= 60.0);
}

#[test]
fn test_group_effect_is_detected() {
    let file = create_trial_csv();
    let dataset = load_path(file.path()).unwrap();
    let schema = classify(&dataset);

    let t = welch_t_test(&dataset, &schema, "Response", "Drug").unwrap();
    assert_eq!(t.n_a + t.n_b, 40);
    assert!(t.mean_b > t.mean_a);
    assert!(t.p_value < 0.001, "p = {} for a 20-point effect", t.p_value);

    let anova = anova_oneway(&dataset, &schema, "Response", "Drug").unwrap();
    assert!(anova.p_value < 0.001);

    // Drug and Site are assigned independently in the fixture
    let chi = chi_square_independence(&dataset, &schema, "Drug", "Site").unwrap();
    assert!(chi.p_value > 0.05);
}

#[test]
fn test_pipeline_from_yaml_writes_report() {
    let file = create_trial_csv();
    let dataset = load_path(file.path()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("session.md");

    let yaml = format!(
        r#"
name: trial-screen
description: Drug A vs B on response
steps:
  - action: filter_values
    column: Drug
    values: [A, B]
  - action: filter_range
    column: Age
    min: 18
    max: 70
  - action: describe
  - action: t_test
    value_column: Response
    group_column: Drug
  - action: report
    output: {}
    preview_rows: 5
"#,
        report_path.display()
    );
    let config = PipelineConfig::from_yaml(&yaml).unwrap();
    let state = Pipeline::from_config(config).run(&dataset).unwrap();

    // Missing ages fail the range filter
    assert_eq!(state.working().n_rows(), 38);
    assert_eq!(state.summaries().len(), 2);
    assert_eq!(state.test_results().len(), 1);

    let md = std::fs::read_to_string(&report_path).unwrap();
    assert!(md.starts_with("# trial-screen"));
    assert!(md.contains("## Dataset"));
    assert!(md.contains("## Preview"));
    assert!(md.contains("Showing 5 of 38 rows."));
    assert!(md.contains("## Filters"));
    assert!(md.contains("38 of 40 rows kept"));
    assert!(md.contains("Welch t-test: Response by Drug"));
}

#[test]
fn test_refiltering_from_source_is_idempotent() {
    let file = create_trial_csv();
    let dataset = load_path(file.path()).unwrap();
    let schema = classify(&dataset);

    let spec = FilterSpec::new().keep_values("Site", ["north"]);
    let (once, _) = apply_filter(&dataset, &schema, &spec).unwrap();
    let (twice, _) = apply_filter(&once, &schema, &spec).unwrap();
    assert_eq!(once, twice);

    // Schema never reclassifies after filtering
    let filtered_schema = classify(&once);
    for name in dataset.column_names() {
        assert_eq!(schema.kind_of(name), filtered_schema.kind_of(name));
    }
}

#[test]
fn test_empty_selection_yields_zero_rows_and_charts_refuse() {
    let file = create_trial_csv();
    let dataset = load_path(file.path()).unwrap();
    let schema = classify(&dataset);

    let spec = FilterSpec::new().keep_values("Drug", Vec::<Value>::new());
    let (working, report) = apply_filter(&dataset, &schema, &spec).unwrap();
    assert_eq!(working.n_rows(), 0);
    assert_eq!(report.rows_removed, 40);

    let chart = ChartSpec::new(ChartKind::Histogram).x("Age");
    let result = render_chart(&working, &schema, &chart, "/tmp/never-written.png");
    assert!(matches!(result, Err(PulseError::EmptyData(_))));
}

#[test]
fn test_working_dataset_round_trips_through_csv() {
    let file = create_trial_csv();
    let dataset = load_path(file.path()).unwrap();
    let schema = classify(&dataset);

    let spec = FilterSpec::new().keep_range("Age", 20.0, 40.0);
    let (working, _) = apply_filter(&dataset, &schema, &spec).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("working.csv");
    write_csv(&working, &out).unwrap();

    let reloaded = load_path(&out).unwrap();
    assert_eq!(reloaded.n_rows(), working.n_rows());
    let reloaded_schema = classify(&reloaded);
    for name in working.column_names() {
        assert_eq!(schema.kind_of(name), reloaded_schema.kind_of(name));
    }
}
