//! TSCH simulation campaign CLI
//!
//! Without a subcommand the whole campaign runs: configs are generated, the
//! simulator is run once per experiment, results are loaded and charted.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{cmd_generate, cmd_list, cmd_plot, cmd_run, load_config, FamilyArg};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tsch-campaign", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Campaign configuration file (JSON); built-in defaults otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Topology family to run
    #[arg(long, value_enum, global = true)]
    family: Option<FamilyArg>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate configs, run every experiment, load results and plot
    Run,

    /// Write config-<experiment>.json files without running the simulator
    Generate,

    /// Plot from existing results directories
    Plot,

    /// List the experiments and charts of the campaign
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins when set
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref(), cli.family)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cmd_run(config)?,
        Commands::Generate => cmd_generate(config)?,
        Commands::Plot => cmd_plot(config)?,
        Commands::List => cmd_list(config)?,
    }

    Ok(())
}
