//! External simulator invocation
//!
//! The simulator is a black box: it takes the generated config file as its
//! only argument and writes a results directory. The call blocks until the
//! process exits; stdout is discarded and nothing is retried. Whether a run
//! succeeded is only known later, from the presence of its results file.

use crate::error::{CampaignError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct Simulator {
    program: PathBuf,
    work_dir: PathBuf,
}

impl Simulator {
    /// `program` is resolved against `work_dir` when it is a relative path
    /// with more than one component (e.g. `../../tsch-sim.sh`).
    pub fn new(program: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
        }
    }

    /// Stock launcher location, two levels above the campaign directory
    pub fn default_program() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(r"..\..\tsch-sim-windows.bat")
        } else {
            PathBuf::from("../../tsch-sim.sh")
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn resolved_program(&self) -> PathBuf {
        if self.program.is_relative() && self.program.components().count() > 1 {
            self.work_dir.join(&self.program)
        } else {
            self.program.clone()
        }
    }

    /// Run one simulation to completion.
    ///
    /// Only a failure to start the process is an error. A non-zero exit is
    /// logged and returned; it surfaces later as missing results.
    pub fn run(&self, config: &Path) -> Result<ExitStatus> {
        let program = self.resolved_program();
        debug!("launching {} {}", program.display(), config.display());

        let status = Command::new(&program)
            .arg(config)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|source| CampaignError::SimulatorLaunch {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            warn!("simulator exited with {} for {}", status, config.display());
        }
        Ok(status)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_passes_config_as_sole_argument() {
        let dir = tempfile::tempdir().unwrap();
        let sim = script(dir.path(), "sim.sh", "echo \"$#:$1\" > args.txt; echo noise");

        let status = Simulator::new(&sim, dir.path())
            .run(Path::new("config-a.json"))
            .unwrap();
        assert!(status.success());
        assert_eq!(fs::read_to_string(dir.path().join("args.txt")).unwrap(), "1:config-a.json\n");
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sim = script(dir.path(), "fail.sh", "exit 3");

        let status = Simulator::new(&sim, dir.path()).run(Path::new("c.json")).unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Simulator::new("./no-such-sim.sh", dir.path())
            .run(Path::new("c.json"))
            .unwrap_err();
        assert!(matches!(err, CampaignError::SimulatorLaunch { .. }));
    }

    #[test]
    fn test_relative_program_resolves_against_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        script(dir.path(), "tsch-sim.sh", "touch ran");

        let status = Simulator::new("../../tsch-sim.sh", &nested)
            .run(Path::new("c.json"))
            .unwrap();
        assert!(status.success());
        assert!(nested.join("ran").exists());
    }
}
