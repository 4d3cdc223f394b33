//! Campaign driver: construct, run, load, plot
//!
//! Strictly sequential. Each simulator run blocks until the process exits
//! and experiments never share files, since every file name is derived
//! from the experiment name.

use crate::chart::{ChartData, ChartSpec};
use crate::config::CampaignConfig;
use crate::error::{CampaignError, Result};
use crate::experiment::Experiment;
use crate::plots::{self, ChartFiles};
use crate::template::Template;
use std::path::PathBuf;
use topology::Family;
use tracing::{error, info, warn};

/// Outcome of a per-experiment step that keeps going past failures
#[derive(Debug, Default)]
pub struct RunReport {
    pub completed: Vec<String>,
    pub failed: Vec<(String, CampaignError)>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record<T>(&mut self, experiment: &str, outcome: Result<T>) {
        match outcome {
            Ok(_) => self.completed.push(experiment.to_string()),
            Err(e) => {
                error!("{}: {}", experiment, e);
                self.failed.push((experiment.to_string(), e));
            }
        }
    }
}

pub struct Campaign {
    config: CampaignConfig,
    experiments: Vec<Experiment>,
}

impl Campaign {
    /// Build every (family, shape) experiment of the matrix
    pub fn new(config: CampaignConfig) -> Result<Self> {
        config.validate()?;
        info!("constructing experiments...");

        let mut experiments = Vec::new();
        for &family in &config.families {
            let defaults = config.base_options(family);
            for &shape in &config.matrix {
                experiments.push(Experiment::new(
                    family,
                    shape,
                    config.layout(family),
                    &defaults,
                    &config.options,
                )?);
            }
        }
        Ok(Self { config, experiments })
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    pub fn experiments_of(&self, family: Family) -> Vec<&Experiment> {
        self.experiments.iter().filter(|e| e.family() == family).collect()
    }

    fn template(&self, family: Family) -> Result<Template> {
        Template::load(&self.config.template_path(family))
    }

    /// Write `config-<name>.json` for every experiment without running anything
    pub fn generate_configs(&self) -> RunReport {
        let mut report = RunReport::default();
        for exp in &self.experiments {
            let outcome = self
                .template(exp.family())
                .and_then(|t| exp.write_config(&t, &self.config.work_dir));
            report.record(exp.name(), outcome);
        }
        report
    }

    /// Run the simulator once per experiment, in order. A config error
    /// aborts only the affected experiment.
    pub fn run_all(&self) -> RunReport {
        info!("running experiments...");
        let simulator = self.config.simulator();
        let mut report = RunReport::default();
        for exp in &self.experiments {
            info!("   {}...", exp.name());
            let outcome = self
                .template(exp.family())
                .and_then(|t| exp.run(&t, &simulator));
            report.record(exp.name(), outcome);
        }
        report
    }

    /// Load every experiment's results; the first missing or malformed
    /// results file is returned as the error.
    pub fn load_all(&mut self) -> Result<()> {
        info!("loading experiment results...");
        let work_dir = self.config.work_dir.clone();
        for exp in &mut self.experiments {
            exp.load_results(&work_dir)?;
        }
        Ok(())
    }

    /// Chart summaries of every family in the campaign. Mobile titles are
    /// suffixed so both families can share an output directory.
    pub fn summaries(&self) -> Result<Vec<ChartData>> {
        let mut out = Vec::new();
        for &family in &self.config.families {
            let experiments = self.experiments_of(family);
            if experiments.is_empty() {
                continue;
            }
            for chart in self.config.charts() {
                let titled = ChartSpec {
                    title: family_title(&chart.title, family),
                    ..chart
                };
                out.push(titled.summarize(experiments.iter().copied())?);
            }
        }
        Ok(out)
    }

    pub fn plot_all(&self) -> Result<Vec<ChartFiles>> {
        info!("plotting experiment results...");
        let outdir = self.config.chart_dir();
        let mut files = Vec::new();
        for data in self.summaries()? {
            files.push(plots::export_chart(&data, &outdir)?);
        }
        Ok(files)
    }

    /// The whole campaign: run, load, plot.
    pub fn execute(&mut self) -> Result<Vec<ChartFiles>> {
        let report = self.run_all();
        if !report.is_success() {
            warn!(
                "{} of {} experiments failed to run",
                report.failed.len(),
                self.experiments.len()
            );
        }
        self.load_all()?;
        self.plot_all()
    }

    pub fn config_paths(&self) -> Vec<PathBuf> {
        self.experiments
            .iter()
            .map(|e| self.config.work_dir.join(crate::template::config_file_name(e.name())))
            .collect()
    }
}

fn family_title(title: &str, family: Family) -> String {
    match family {
        Family::Static => title.to_string(),
        Family::Mobile => format!("{} (mobile)", title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::ResultsTree;
    use serde_json::json;
    use std::fs;
    use topology::ClusterShape;

    fn config_in(dir: &std::path::Path) -> CampaignConfig {
        CampaignConfig {
            work_dir: dir.to_path_buf(),
            matrix: vec![ClusterShape::new(2, 1), ClusterShape::new(2, 3)],
            ..CampaignConfig::default()
        }
    }

    #[test]
    fn test_construction_order() {
        let mut config = CampaignConfig::default();
        config.families = vec![Family::Static, Family::Mobile];
        let campaign = Campaign::new(config).unwrap();
        let names: Vec<&str> = campaign.experiments().iter().map(|e| e.name()).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "3_clusters_1_nodes");
        assert_eq!(names[5], "5_clusters_10_nodes");
        assert_eq!(names[6], "3_clusters_1_nodes_mobile");
        assert_eq!(campaign.experiments_of(Family::Mobile).len(), 6);
    }

    #[test]
    fn test_generate_configs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json.tmpl"),
            "{\"n\": %NUM_NODES%, \"d\": %SIMULATION_DURATION_SEC%, \"r\": %RESULTS_DIR%,\n\"c\": %CONNECTIONS%, \"p\": %POSITIONS%}\n",
        )
        .unwrap();

        let campaign = Campaign::new(config_in(dir.path())).unwrap();
        let report = campaign.generate_configs();
        assert!(report.is_success());
        assert_eq!(report.completed.len(), 2);

        let text = fs::read_to_string(dir.path().join("config-2_clusters_3_nodes.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["n"], "9");
        assert_eq!(value["d"], 3600);
        assert_eq!(value["r"], "./results-2_clusters_3_nodes");
        assert_eq!(value["p"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn test_template_errors_are_per_experiment() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json.tmpl"), "%UNKNOWN_KEY%").unwrap();

        let campaign = Campaign::new(config_in(dir.path())).unwrap();
        let report = campaign.generate_configs();
        assert_eq!(report.failed.len(), 2);
        assert!(matches!(
            report.failed[0].1,
            CampaignError::UnresolvedPlaceholders { .. }
        ));
        assert!(!dir.path().join("config-2_clusters_1_nodes.json").exists());
    }

    #[test]
    fn test_load_all_propagates_missing_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut campaign = Campaign::new(config_in(dir.path())).unwrap();
        assert!(matches!(
            campaign.load_all(),
            Err(CampaignError::ResultsUnavailable { .. })
        ));
    }

    #[test]
    fn test_summaries_per_family() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.families = vec![Family::Static, Family::Mobile];
        config.charts = Some(vec![ChartSpec::new(
            "RPL parent switches",
            crate::aggregate::MetricQuery::single("routing_num_parent_changes", 0.0),
        )]);
        let mut campaign = Campaign::new(config).unwrap();

        let results = ResultsTree::from_json(&json!({
            "0": {"2": {"routing_num_parent_changes": 2}},
            "1": {"2": {"routing_num_parent_changes": 4}}
        }))
        .unwrap();
        for exp in &mut campaign.experiments {
            exp.set_results(results.clone());
        }

        let charts = campaign.summaries().unwrap();
        let titles: Vec<&str> = charts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["RPL parent switches", "RPL parent switches (mobile)"]);
        assert_eq!(charts[0].bars.len(), 2);
        assert_eq!(charts[0].bars[0].mean, 3.0);
        assert_eq!(charts[0].y_min, 0.0);
        assert_eq!(charts[0].y_max, 5.0);
    }
}
