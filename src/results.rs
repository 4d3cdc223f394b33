//! Loaded simulation results
//!
//! Shape of `stats_merged.json`: run id -> node id -> metric name -> number
//! or null. The run `aggregate-stats` and the nodes `global-stats` and `1`
//! (the gateway) are summary rows and are skipped by the iterators here.

use crate::error::{CampaignError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reserved run holding cross-run summaries
pub const AGGREGATE_RUN: &str = "aggregate-stats";
/// Reserved node holding per-run network summaries
pub const GLOBAL_STATS_NODE: &str = "global-stats";
/// The gateway; a non-representative outlier for per-node metrics
pub const GATEWAY_NODE: &str = "1";

/// Merged statistics file written by the simulator
pub const RESULTS_FILE: &str = "stats_merged.json";

#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    Number(f64),
    /// Present but not measured (e.g. node never joined)
    Null,
    /// Strings, arrays or objects; not usable as a metric
    NonNumeric,
}

impl From<&Value> for MetricValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => MetricValue::Null,
            Value::Number(n) => n.as_f64().map(MetricValue::Number).unwrap_or(MetricValue::NonNumeric),
            _ => MetricValue::NonNumeric,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeStats {
    pub id: String,
    metrics: BTreeMap<String, MetricValue>,
}

impl NodeStats {
    pub fn metric(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    fn is_summary(&self) -> bool {
        self.id == GLOBAL_STATS_NODE || self.id == GATEWAY_NODE
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunResults {
    pub id: String,
    nodes: Vec<NodeStats>,
}

impl RunResults {
    /// Simulated leaf/relay nodes in file order, summary rows excluded
    pub fn nodes(&self) -> impl Iterator<Item = &NodeStats> {
        self.nodes.iter().filter(|n| !n.is_summary())
    }

    /// Every node row, including the gateway and `global-stats`
    pub fn all_nodes(&self) -> &[NodeStats] {
        &self.nodes
    }
}

/// Results of every run of one experiment
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsTree {
    runs: Vec<RunResults>,
    aggregate: Option<Value>,
}

impl ResultsTree {
    /// Read `<results_dir>/stats_merged.json`. A missing file means the run
    /// did not complete and is reported as `ResultsUnavailable`.
    pub fn load(results_dir: &Path, experiment: &str) -> Result<Self> {
        let path = results_dir.join(RESULTS_FILE);
        if !path.is_file() {
            return Err(CampaignError::ResultsUnavailable {
                experiment: experiment.to_string(),
                path,
            });
        }
        let text = fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(&text).map_err(|source| CampaignError::ResultsParse {
            path: path.clone(),
            source,
        })?;
        let tree = Self::from_json(&value)?;
        debug!("loaded {} runs from {}", tree.runs.len(), path.display());
        Ok(tree)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let root = as_object(value, "results root")?;
        let mut tree = ResultsTree::default();

        for (run_id, run) in root {
            if run_id == AGGREGATE_RUN {
                tree.aggregate = Some(run.clone());
                continue;
            }
            let nodes_obj = as_object(run, &format!("run {}", run_id))?;
            let mut nodes = Vec::with_capacity(nodes_obj.len());
            for (node_id, node) in nodes_obj {
                let metrics = match node {
                    Value::Object(m) => m
                        .iter()
                        .map(|(k, v)| (k.clone(), MetricValue::from(v)))
                        .collect(),
                    // summary rows may use any shape
                    _ if node_id == GLOBAL_STATS_NODE || node_id == GATEWAY_NODE => BTreeMap::new(),
                    _ => {
                        return Err(CampaignError::ResultsShape(format!(
                            "node {} in run {} is not an object",
                            node_id, run_id
                        )))
                    }
                };
                nodes.push(NodeStats {
                    id: node_id.clone(),
                    metrics,
                });
            }
            tree.runs.push(RunResults {
                id: run_id.clone(),
                nodes,
            });
        }
        Ok(tree)
    }

    /// Per-trial runs in file order, `aggregate-stats` excluded
    pub fn runs(&self) -> impl Iterator<Item = &RunResults> {
        self.runs.iter()
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// The raw `aggregate-stats` entry, if the simulator wrote one
    pub fn aggregate(&self) -> Option<&Value> {
        self.aggregate.as_ref()
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| CampaignError::ResultsShape(format!("{} is not an object", what)))
}
