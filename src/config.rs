//! Campaign configuration
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! describes the stock campaign: static clusters {3,5} x {1,3,10}, one hour
//! of simulated time, and the five standard charts.

use crate::aggregate::{Aggregate, Combine, MetricQuery};
use crate::chart::ChartSpec;
use crate::error::{CampaignError, Result};
use crate::experiment;
use crate::options::Options;
use crate::simulator::Simulator;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use topology::{ClusterShape, Family, LayoutParams};

pub const DEFAULT_SIM_DURATION_SEC: u64 = 3600;

/// Template file per topology family
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatePaths {
    #[serde(rename = "static")]
    pub static_family: PathBuf,
    pub mobile: PathBuf,
}

impl Default for TemplatePaths {
    fn default() -> Self {
        Self {
            static_family: PathBuf::from("config.json.tmpl"),
            mobile: PathBuf::from("mobile-config.json.tmpl"),
        }
    }
}

impl TemplatePaths {
    pub fn for_family(&self, family: Family) -> &Path {
        match family {
            Family::Static => &self.static_family,
            Family::Mobile => &self.mobile,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Simulator launcher, relative paths resolve against `work_dir`
    pub simulator: PathBuf,
    /// Where configs are written and the simulator runs
    pub work_dir: PathBuf,
    /// Where charts are written, relative to `work_dir`
    pub output_dir: PathBuf,
    /// Template paths, relative to `work_dir`
    pub templates: TemplatePaths,
    pub families: Vec<Family>,
    pub sim_duration_sec: u64,
    /// Partial objects are layered onto the family preset
    #[serde(deserialize_with = "static_layout")]
    pub static_layout: LayoutParams,
    #[serde(deserialize_with = "mobile_layout")]
    pub mobile_layout: LayoutParams,
    pub matrix: Vec<ClusterShape>,
    /// Caller overrides, applied on top of everything else
    pub options: Options,
    /// `None` selects the standard chart set
    pub charts: Option<Vec<ChartSpec>>,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            simulator: Simulator::default_program(),
            work_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            templates: TemplatePaths::default(),
            families: vec![Family::Static],
            sim_duration_sec: DEFAULT_SIM_DURATION_SEC,
            static_layout: LayoutParams::static_clusters(),
            mobile_layout: LayoutParams::mobile_clusters(),
            matrix: default_matrix(),
            options: Options::new(),
            charts: None,
        }
    }
}

fn static_layout<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<LayoutParams, D::Error> {
    layered_layout(deserializer, Family::Static)
}

fn mobile_layout<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<LayoutParams, D::Error> {
    layered_layout(deserializer, Family::Mobile)
}

fn layered_layout<'de, D: Deserializer<'de>>(
    deserializer: D,
    family: Family,
) -> std::result::Result<LayoutParams, D::Error> {
    use serde::de::Error;

    let patch = Value::deserialize(deserializer)?;
    let mut merged = serde_json::to_value(LayoutParams::preset(family)).map_err(D::Error::custom)?;
    merge_json(&mut merged, patch);
    serde_json::from_value(merged).map_err(D::Error::custom)
}

/// Objects merge key by key, anything else replaces
fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Clusters {3, 5} x nodes per cluster {1, 3, 10}
pub fn default_matrix() -> Vec<ClusterShape> {
    let mut matrix = Vec::new();
    for clusters in [3, 5] {
        for per_cluster in [1, 3, 10] {
            matrix.push(ClusterShape::new(clusters, per_cluster));
        }
    }
    matrix
}

/// The five standard charts; routing join time defaults to the whole
/// simulated duration for nodes that never joined.
pub fn default_charts(sim_duration_sec: u64) -> Vec<ChartSpec> {
    vec![
        ChartSpec::new(
            "Application PDR, %",
            MetricQuery::paired("app_num_lost", "app_num_endpoint_rx", Combine::Pdr),
        ),
        ChartSpec::new(
            "Link layer PAR, %",
            MetricQuery::paired("mac_parent_acked", "mac_parent_tx_unicast", Combine::Par),
        ),
        ChartSpec::new(
            "TSCH joining time, seconds",
            MetricQuery::single("tsch_join_time_sec", DEFAULT_SIM_DURATION_SEC as f64),
        ),
        ChartSpec::new(
            "RPL parent switches",
            MetricQuery::single("routing_num_parent_changes", 0.0),
        ),
        ChartSpec::new(
            "Routing join time",
            MetricQuery::single("routing_join_time_sec", sim_duration_sec as f64),
        )
        .with_aggregate(Aggregate::Max),
    ]
}

/// Energy charts, not part of the standard set
pub fn energy_charts() -> Vec<ChartSpec> {
    vec![
        ChartSpec::new(
            "Average current consumption, uA",
            MetricQuery::single("avg_current_joined_uA", 0.0),
        ),
        ChartSpec::new("Radio duty cycle, %", MetricQuery::single("radio_duty_cycle_joined", 0.0)),
    ]
}

impl CampaignConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: CampaignConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.families.is_empty() {
            return Err(CampaignError::Config("no topology family selected".into()));
        }
        if self.matrix.is_empty() {
            return Err(CampaignError::Config("experiment matrix is empty".into()));
        }
        for shape in &self.matrix {
            shape.validate()?;
        }
        if self.sim_duration_sec == 0 {
            return Err(CampaignError::Config("sim_duration_sec must be positive".into()));
        }
        if let Some(key) = experiment::derived_override(&self.options) {
            return Err(CampaignError::Config(format!(
                "options: {} is derived per experiment and cannot be overridden",
                key
            )));
        }

        let charts = self.charts();
        let mut titles = HashSet::new();
        for chart in &charts {
            if !titles.insert(chart.title.as_str()) {
                return Err(CampaignError::Config(format!("duplicate chart title '{}'", chart.title)));
            }
        }
        Ok(())
    }

    pub fn charts(&self) -> Vec<ChartSpec> {
        self.charts
            .clone()
            .unwrap_or_else(|| default_charts(self.sim_duration_sec))
    }

    pub fn layout(&self, family: Family) -> &LayoutParams {
        match family {
            Family::Static => &self.static_layout,
            Family::Mobile => &self.mobile_layout,
        }
    }

    /// Template path resolved against the working directory
    pub fn template_path(&self, family: Family) -> PathBuf {
        self.work_dir.join(self.templates.for_family(family))
    }

    /// Built-in defaults of a family; topology-derived values and
    /// `options` are layered on top per experiment
    pub fn base_options(&self, family: Family) -> Options {
        let options = Options::new().with("SIMULATION_DURATION_SEC", self.sim_duration_sec);
        match family {
            Family::Static => options.with("NUM_NODES", 1i64),
            Family::Mobile => options
                .with("NUM_ROUTER_NODES", 1i64)
                .with("NUM_STATIC_LEAF_NODES", 1i64)
                .with("NUM_MOBILE_LEAF_NODES", 1i64)
                .with("RANGE_X", 100i64)
                .with("RANGE_Y", 100i64),
        }
    }

    pub fn chart_dir(&self) -> PathBuf {
        self.work_dir.join(&self.output_dir)
    }

    pub fn simulator(&self) -> Simulator {
        Simulator::new(&self.simulator, &self.work_dir)
    }
}
