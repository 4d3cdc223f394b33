//! TSCH simulation campaign harness
//!
//! Generates clustered network topologies, renders them into simulator
//! configs, runs the external simulator once per experiment, loads the merged
//! per-node statistics and turns chosen metrics into bar charts with
//! min/max error bars.

pub mod aggregate;
pub mod campaign;
pub mod chart;
pub mod config;
pub mod error;
pub mod experiment;
pub mod options;
pub mod plots;
pub mod results;
pub mod simulator;
pub mod template;

pub use aggregate::{extract_metric, extract_metrics, mean, Aggregate, Combine, MetricQuery, MetricSeries};
pub use campaign::{Campaign, RunReport};
pub use chart::{summarize, BarStats, ChartData, ChartSpec, MetricClass};
pub use config::CampaignConfig;
pub use error::{CampaignError, Result};
pub use experiment::Experiment;
pub use options::{OptionValue, Options};
pub use plots::{export_chart, ChartFiles};
pub use results::ResultsTree;
pub use simulator::Simulator;
pub use template::Template;

pub use topology::{ClusterShape, Family, LayoutParams, Topology};
