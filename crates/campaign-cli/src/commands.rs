//! CLI command implementations for the campaign tool
//!
//! Kept out of main.rs so the config handling can be unit tested.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::path::Path;
use topology::Family;
use tracing::info;
use tschcampaign::{Campaign, CampaignConfig, RunReport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FamilyArg {
    Static,
    Mobile,
    Both,
}

impl FamilyArg {
    pub fn families(self) -> Vec<Family> {
        match self {
            FamilyArg::Static => vec![Family::Static],
            FamilyArg::Mobile => vec![Family::Mobile],
            FamilyArg::Both => vec![Family::Static, Family::Mobile],
        }
    }
}

/// Built-in defaults, or the given file, with `--family` applied on top
pub fn load_config(path: Option<&Path>, family: Option<FamilyArg>) -> Result<CampaignConfig> {
    let mut config = match path {
        Some(path) => CampaignConfig::load(path)
            .with_context(|| format!("Failed to load campaign config {}", path.display()))?,
        None => CampaignConfig::default(),
    };
    if let Some(family) = family {
        config.families = family.families();
    }
    Ok(config)
}

fn check_report(report: &RunReport, what: &str) -> Result<()> {
    if !report.is_success() {
        let names: Vec<&str> = report.failed.iter().map(|(name, _)| name.as_str()).collect();
        bail!("{} failed for {} experiment(s): {}", what, names.len(), names.join(", "));
    }
    Ok(())
}

/// Implementation of the 'run' command - the whole campaign
pub fn cmd_run(config: CampaignConfig) -> Result<()> {
    let mut campaign = Campaign::new(config).context("Failed to construct experiments")?;
    let files = campaign.execute().context("Campaign failed")?;
    for f in &files {
        println!("{}", f.svg.display());
    }
    info!("campaign finished, {} charts written", files.len());
    Ok(())
}

/// Implementation of the 'generate' command - configs only
pub fn cmd_generate(config: CampaignConfig) -> Result<()> {
    let campaign = Campaign::new(config).context("Failed to construct experiments")?;
    let report = campaign.generate_configs();
    check_report(&report, "Config generation")?;
    for path in campaign.config_paths() {
        println!("{}", path.display());
    }
    Ok(())
}

/// Implementation of the 'plot' command - charts from existing results
pub fn cmd_plot(config: CampaignConfig) -> Result<()> {
    let mut campaign = Campaign::new(config).context("Failed to construct experiments")?;
    campaign.load_all().context("Failed to load results")?;
    for f in campaign.plot_all().context("Failed to plot results")? {
        println!("{}", f.svg.display());
    }
    Ok(())
}

/// Implementation of the 'list' command - shows the experiment matrix
pub fn cmd_list(config: CampaignConfig) -> Result<()> {
    let campaign = Campaign::new(config).context("Failed to construct experiments")?;

    println!("Experiments:");
    println!("============");
    for exp in campaign.experiments() {
        println!(
            "  {:<32} {:<7} {:>4} nodes",
            exp.name(),
            exp.family().to_string(),
            exp.shape().node_count()
        );
    }

    println!("\nCharts:");
    for chart in campaign.config().charts() {
        println!("  {}", chart.title);
    }
    Ok(())
}
