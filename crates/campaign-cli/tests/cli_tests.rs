//! CLI tests covering help, list, generate and config errors

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

/// Helper function to create a command instance for the tsch-campaign binary
fn cli_command() -> Command {
    Command::cargo_bin("tsch-campaign").expect("Failed to find tsch-campaign binary")
}

fn copy_templates(dir: &Path) {
    let templates = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates");
    for name in ["config.json.tmpl", "mobile-config.json.tmpl"] {
        fs::copy(templates.join(name), dir.join(name)).unwrap();
    }
}

#[test]
fn test_cli_help_and_version() {
    let mut cmd = cli_command();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("CLI tool for running TSCH simulation campaigns"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("--family"));

    let mut cmd = cli_command();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tsch-campaign"));
}

#[test]
fn test_subcommand_help() {
    let subcommands = vec![
        ("run", "run every experiment"),
        ("generate", "without running the simulator"),
        ("plot", "existing results"),
        ("list", "List the experiments"),
    ];

    for (cmd, description) in subcommands {
        let mut command = cli_command();
        command.args([cmd, "--help"]);
        command
            .assert()
            .success()
            .stdout(predicate::str::contains(description));
    }
}

#[test]
fn test_cli_invalid_command() {
    let mut cmd = cli_command();
    cmd.arg("invalid-command");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_cli_list_default_matrix() {
    let mut cmd = cli_command();
    cmd.arg("list");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Experiments:"))
        .stdout(predicate::str::contains("3_clusters_1_nodes"))
        .stdout(predicate::str::contains("5_clusters_10_nodes"))
        .stdout(predicate::str::contains("56 nodes"))
        .stdout(predicate::str::contains("Application PDR, %"))
        .stdout(predicate::str::contains("Routing join time"))
        .stdout(predicate::str::contains("_mobile").not());
}

#[test]
fn test_cli_list_both_families() {
    let mut cmd = cli_command();
    cmd.args(["--family", "both", "list"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("3_clusters_3_nodes_mobile"));
}

#[test]
fn test_cli_generate() {
    let dir = tempfile::tempdir().unwrap();
    copy_templates(dir.path());

    let mut cmd = cli_command();
    cmd.current_dir(dir.path()).args(["--family", "both", "generate"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("config-3_clusters_1_nodes.json"))
        .stdout(predicate::str::contains("config-5_clusters_10_nodes_mobile.json"));

    let text = fs::read_to_string(dir.path().join("config-3_clusters_10_nodes.json")).unwrap();
    let config: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(config["SIMULATION_DURATION_SEC"], 3600);
    assert_eq!(config["POSITIONS"].as_array().unwrap().len(), 34);
}

#[test]
fn test_cli_generate_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    copy_templates(dir.path());
    fs::write(
        dir.path().join("campaign.json"),
        r#"{"sim_duration_sec": 120, "matrix": [{"clusters": 2, "per_cluster": 2}]}"#,
    )
    .unwrap();

    let mut cmd = cli_command();
    cmd.current_dir(dir.path()).args(["--config", "campaign.json", "generate"]);
    cmd.assert().success();

    let text = fs::read_to_string(dir.path().join("config-2_clusters_2_nodes.json")).unwrap();
    let config: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(config["SIMULATION_DURATION_SEC"], 120);
    assert!(!dir.path().join("config-3_clusters_1_nodes.json").exists());
}

#[test]
fn test_cli_generate_without_template_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = cli_command();
    cmd.current_dir(dir.path()).arg("generate");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Config generation failed"))
        .stderr(predicate::str::contains("config.json.tmpl"));
}

#[test]
fn test_cli_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.json"), r#"{"matrix": [{"clusters": 0, "per_cluster": 1}]}"#).unwrap();

    let mut cmd = cli_command();
    cmd.current_dir(dir.path()).args(["--config", "bad.json", "list"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load campaign config"));
}

#[test]
fn test_cli_plot_without_results_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = cli_command();
    cmd.current_dir(dir.path()).arg("plot");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load results"));
}
