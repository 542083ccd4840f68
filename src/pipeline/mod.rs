//! Declarative analysis pipelines.
//!
//! A pipeline is an ordered list of steps (filter, describe, test, chart,
//! report) applied to a source dataset. Configurations serialize to YAML so
//! a session can be replayed on a fresh upload of the same data.

mod runner;

pub use runner::PipelineState;

use crate::chart::ChartSpec;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_preview_rows() -> usize {
    10
}

/// One step of a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PipelineStep {
    /// Restrict a categorical column to an allowed-value set.
    FilterValues { column: String, values: Vec<String> },
    /// Restrict a numeric column to a closed range.
    FilterRange { column: String, min: f64, max: f64 },
    /// Descriptive statistics of every numeric column.
    Describe,
    /// Welch two-sample t-test.
    TTest {
        value_column: String,
        group_column: String,
    },
    /// One-way ANOVA.
    Anova {
        value_column: String,
        group_column: String,
    },
    /// Chi-square test of independence.
    ChiSquare { column_a: String, column_b: String },
    /// Pearson correlation between two numeric columns.
    Correlation { column_a: String, column_b: String },
    /// Render a chart of the working dataset to a PNG file.
    Chart {
        #[serde(flatten)]
        spec: ChartSpec,
        output: PathBuf,
    },
    /// Write the accumulated session report to a markdown file.
    Report {
        output: PathBuf,
        #[serde(default = "default_preview_rows")]
        preview_rows: usize,
    },
}

/// A named, serializable pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub steps: Vec<PipelineStep>,
}

impl PipelineConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            steps: Vec::new(),
        }
    }

    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Serialize the configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// An executable pipeline.
///
/// Built either from a [`PipelineConfig`] or step by step with
/// [`Pipeline::add_step`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
        }
    }

    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            name: config.name,
            steps: config.steps,
        }
    }

    /// Append a step.
    pub fn add_step(mut self, step: PipelineStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Run every step against a source dataset.
    ///
    /// Steps run in order and share a [`PipelineState`]; the first failing
    /// step aborts the run.
    pub fn run(&self, dataset: &crate::data::Dataset) -> Result<PipelineState> {
        let mut state = PipelineState::new(self.name.clone(), dataset.clone());
        for step in &self.steps {
            state.execute(step)?;
        }
        Ok(state)
    }
}
