//! One experiment of a campaign
//!
//! An experiment is identified by its name, which is derived from the
//! topology family and shape. It owns its options, its results directory and
//! (after `load_results`) its results.

use crate::error::{CampaignError, Result};
use crate::options::Options;
use crate::results::ResultsTree;
use crate::simulator::Simulator;
use crate::template::{self, Template};
use std::path::{Path, PathBuf};
use topology::{ClusterShape, Family, LayoutParams, Topology};
use tracing::info;

/// Keys computed from the topology and the experiment name. Overriding
/// them would let experiments share a results directory or disagree
/// with the generated node numbering.
pub const DERIVED_KEYS: &[&str] = &[
    "RESULTS_DIR",
    "CONNECTIONS",
    "POSITIONS",
    "NUM_NODES",
    "NUM_ROUTER_NODES",
    "NUM_STATIC_LEAF_NODES",
    "NUM_MOBILE_LEAF_NODES",
];

/// The first topology-derived key among `overrides`, if any
pub fn derived_override(overrides: &Options) -> Option<&'static str> {
    DERIVED_KEYS.iter().copied().find(|k| overrides.contains_key(k))
}

#[derive(Clone, Debug)]
pub struct Experiment {
    name: String,
    family: Family,
    shape: ClusterShape,
    options: Options,
    results_dir: PathBuf,
    results: Option<ResultsTree>,
}

impl Experiment {
    /// Build an experiment, layering `defaults < topology-derived < overrides`
    pub fn new(
        family: Family,
        shape: ClusterShape,
        params: &LayoutParams,
        defaults: &Options,
        overrides: &Options,
    ) -> Result<Self> {
        let name = Self::name_for(family, shape);
        if let Some(key) = derived_override(overrides) {
            return Err(CampaignError::Config(format!(
                "{} is derived from the topology and cannot be overridden ({})",
                key, name
            )));
        }
        let results_dir = PathBuf::from(format!("./results-{}", name));
        let topology = Topology::generate(family, shape, params)?;

        let derived = derived_options(&topology, &results_dir);
        let options = Options::layered(&[defaults, &derived, overrides]);

        Ok(Self {
            name,
            family,
            shape,
            options,
            results_dir,
            results: None,
        })
    }

    /// `<clusters>_clusters_<per_cluster>_nodes`, suffixed `_mobile` for the
    /// mobile family
    pub fn name_for(family: Family, shape: ClusterShape) -> String {
        match family {
            Family::Static => format!("{}_clusters_{}_nodes", shape.clusters, shape.per_cluster),
            Family::Mobile => format!("{}_clusters_{}_nodes_mobile", shape.clusters, shape.per_cluster),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn shape(&self) -> ClusterShape {
        self.shape
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Results directory relative to the campaign working directory
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Render the template and write `config-<name>.json` into `work_dir`
    pub fn write_config(&self, template: &Template, work_dir: &Path) -> Result<PathBuf> {
        let contents = template.render(&self.options)?;
        template::write_config(work_dir, &self.name, &contents)
    }

    /// Write the config and run the simulator on it, blocking until it exits.
    /// Returns the path of the config that was used.
    pub fn run(&self, template: &Template, simulator: &Simulator) -> Result<PathBuf> {
        let path = self.write_config(template, simulator.work_dir())?;
        info!("running {}", self.name);
        simulator.run(Path::new(&template::config_file_name(&self.name)))?;
        Ok(path)
    }

    /// Load `stats_merged.json` from the results directory under `work_dir`
    pub fn load_results(&mut self, work_dir: &Path) -> Result<()> {
        let dir = work_dir.join(&self.results_dir);
        let tree = ResultsTree::load(&dir, &self.name)?;
        info!("loaded {} runs for {}", tree.run_count(), self.name);
        self.results = Some(tree);
        Ok(())
    }

    /// Attach results obtained some other way
    pub fn set_results(&mut self, results: ResultsTree) {
        self.results = Some(results);
    }

    pub fn results(&self) -> Result<&ResultsTree> {
        self.results
            .as_ref()
            .ok_or_else(|| CampaignError::ResultsNotLoaded(self.name.clone()))
    }

    pub fn has_results(&self) -> bool {
        self.results.is_some()
    }
}

/// Options computed from the generated topology
fn derived_options(topology: &Topology, results_dir: &Path) -> Options {
    let shape = topology.shape;
    let options = Options::new()
        .with("RESULTS_DIR", results_dir.display().to_string())
        .with("CONNECTIONS", topology.connections_block())
        .with("POSITIONS", topology.positions_block());

    match topology.family {
        Family::Static => options.with("NUM_NODES", topology.node_count().to_string()),
        Family::Mobile => options
            .with("NUM_ROUTER_NODES", (1 + shape.clusters).to_string())
            .with("NUM_STATIC_LEAF_NODES", topology.static_member_count().to_string())
            .with("NUM_MOBILE_LEAF_NODES", topology.mobile_member_count().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionValue;

    fn static_experiment(overrides: &Options) -> Experiment {
        let defaults = Options::new()
            .with("SIMULATION_DURATION_SEC", 3600i64)
            .with("NUM_NODES", "1");
        Experiment::new(
            Family::Static,
            ClusterShape::new(3, 3),
            &LayoutParams::static_clusters(),
            &defaults,
            overrides,
        )
        .unwrap()
    }

    #[test]
    fn test_names() {
        assert_eq!(Experiment::name_for(Family::Static, ClusterShape::new(3, 10)), "3_clusters_10_nodes");
        assert_eq!(
            Experiment::name_for(Family::Mobile, ClusterShape::new(5, 1)),
            "5_clusters_1_nodes_mobile"
        );
    }

    #[test]
    fn test_static_options() {
        let exp = static_experiment(&Options::new());
        assert_eq!(exp.name(), "3_clusters_3_nodes");
        assert_eq!(exp.results_dir(), Path::new("./results-3_clusters_3_nodes"));

        let opts = exp.options();
        // derived beats default
        assert_eq!(opts.get("NUM_NODES"), Some(&OptionValue::Text("13".into())));
        assert_eq!(opts.get("SIMULATION_DURATION_SEC"), Some(&OptionValue::Integer(3600)));
        assert_eq!(
            opts.get("RESULTS_DIR"),
            Some(&OptionValue::Text("./results-3_clusters_3_nodes".into()))
        );
        assert!(opts.get("CONNECTIONS").unwrap().is_block());
        assert!(opts.get("POSITIONS").unwrap().is_block());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Options::new()
            .with("SIMULATION_DURATION_SEC", 60i64)
            .with("APP_PACKET_PERIOD_SEC", 30i64);
        let exp = static_experiment(&overrides);
        assert_eq!(exp.options().get("SIMULATION_DURATION_SEC"), Some(&OptionValue::Integer(60)));
        assert_eq!(exp.options().get("APP_PACKET_PERIOD_SEC"), Some(&OptionValue::Integer(30)));
        assert_eq!(exp.options().get("NUM_NODES"), Some(&OptionValue::Text("13".into())));
    }

    #[test]
    fn test_derived_keys_cannot_be_overridden() {
        for key in DERIVED_KEYS {
            let overrides = Options::new().with(*key, "./shared");
            let err = Experiment::new(
                Family::Static,
                ClusterShape::new(3, 3),
                &LayoutParams::static_clusters(),
                &Options::new(),
                &overrides,
            )
            .unwrap_err();
            assert!(matches!(err, CampaignError::Config(ref msg) if msg.contains(key)));
        }
    }

    #[test]
    fn test_mobile_options() {
        let exp = Experiment::new(
            Family::Mobile,
            ClusterShape::new(5, 10),
            &LayoutParams::mobile_clusters(),
            &Options::new(),
            &Options::new(),
        )
        .unwrap();
        let opts = exp.options();
        assert_eq!(opts.get("NUM_ROUTER_NODES"), Some(&OptionValue::Text("6".into())));
        assert_eq!(opts.get("NUM_STATIC_LEAF_NODES"), Some(&OptionValue::Text("30".into())));
        assert_eq!(opts.get("NUM_MOBILE_LEAF_NODES"), Some(&OptionValue::Text("20".into())));
        assert!(opts.get("NUM_NODES").is_none());
    }

    #[test]
    fn test_results_not_loaded() {
        let exp = static_experiment(&Options::new());
        assert!(!exp.has_results());
        assert!(matches!(exp.results(), Err(CampaignError::ResultsNotLoaded(_))));
    }

    #[test]
    fn test_load_results_missing_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut exp = static_experiment(&Options::new());
        let err = exp.load_results(dir.path()).unwrap_err();
        assert!(matches!(err, CampaignError::ResultsUnavailable { .. }));
        assert!(!exp.has_results());
    }
}
