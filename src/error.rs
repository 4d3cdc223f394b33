//! Error types for the campaign pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template {template} has no option for placeholder(s): {}", .placeholders.join(", "))]
    UnresolvedPlaceholders {
        template: String,
        placeholders: Vec<String>,
    },

    #[error("Failed to write config {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch simulator {program}: {source}")]
    SimulatorLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Results unavailable for experiment {experiment}: {path} not found (did the run complete?)")]
    ResultsUnavailable { experiment: String, path: PathBuf },

    #[error("Failed to parse results {path}: {source}")]
    ResultsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed results: {0}")]
    ResultsShape(String),

    #[error("Results for experiment {0} have not been loaded")]
    ResultsNotLoaded(String),

    #[error("Metric '{metric}' missing for node {node} in run {run} of experiment {experiment}")]
    MissingMetric {
        experiment: String,
        run: String,
        node: String,
        metric: String,
    },

    #[error("Experiment {0} has no runs to summarize")]
    EmptySeries(String),

    #[error("Experiment {0} has a non-finite run value")]
    NonFiniteSeries(String),

    #[error("Chart '{title}' needs one label per series ({labels} labels, {series} series)")]
    LabelMismatch {
        title: String,
        labels: usize,
        series: usize,
    },

    #[error("Topology error: {0}")]
    Topology(#[from] topology::TopologyError),

    #[error("Failed to render chart {path}: {message}")]
    Plot { path: PathBuf, message: String },

    #[error("Failed to export chart data: {0}")]
    Export(#[from] csv::Error),

    #[error("Invalid campaign configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CampaignError>;
