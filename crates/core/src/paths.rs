// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data directory layout. One [`DataDir`] per supervised user; every file
//! the supervisor reads or writes is named here so the rest of the
//! workspace never hand-builds a path.

use crate::error::CoreError;
use std::path::{Path, PathBuf};

/// Env var overriding the data directory root. Checked before the
/// `XDG_STATE_HOME`-style fallback.
pub const STATE_DIR_ENV: &str = "STIGMER_STATE_DIR";

/// A resolved, owned data directory root plus every file/subdirectory
/// path within it that the supervisor manages.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the data directory root: `STIGMER_STATE_DIR` env var if
    /// set, else `XDG_STATE_HOME/stigmer` if set, else `<home>/.stigmer`.
    pub fn resolve() -> Result<Self, CoreError> {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(Self { root: PathBuf::from(dir) });
            }
        }
        if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
            if !xdg.is_empty() {
                return Ok(Self { root: PathBuf::from(xdg).join("stigmer") });
            }
        }
        let home = dirs::home_dir().ok_or(CoreError::NoHomeDir)?;
        Ok(Self { root: home.join(".stigmer") })
    }

    /// Build a `DataDir` rooted at an explicit path, used by tests to
    /// point every file at a `tempfile::TempDir`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and its fixed subdirectories if absent.
    pub fn ensure_exists(&self) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.bin_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.temporal_data_dir())?;
        std::fs::create_dir_all(self.workspace_dir())?;
        Ok(())
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn version_marker(&self) -> PathBuf {
        self.bin_dir().join(".version")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn temporal_data_dir(&self) -> PathBuf {
        self.root.join("temporal-data")
    }

    pub fn workspace_dir(&self) -> PathBuf {
        self.root.join("workspace")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.root.join("daemon.lock")
    }

    pub fn cookbook_file(&self) -> PathBuf {
        self.root.join("startup-config.json")
    }

    pub fn api_server_pid_file(&self) -> PathBuf {
        self.root.join("daemon.pid")
    }

    pub fn worker_pid_file(&self) -> PathBuf {
        self.root.join("workflow-runner.pid")
    }

    pub fn engine_pid_file(&self) -> PathBuf {
        self.root.join("temporal.pid")
    }

    pub fn agent_container_id_file(&self) -> PathBuf {
        self.root.join("agent-runner-container.id")
    }

    pub fn log_path(&self, base_name: &str) -> PathBuf {
        self.logs_dir().join(format!("{base_name}.log"))
    }

    pub fn err_log_path(&self, base_name: &str) -> PathBuf {
        self.logs_dir().join(format!("{base_name}.err"))
    }

    /// Directory the supervisor's own rotating operational log is
    /// written under, distinct from the per-component child log files
    /// above (`logs_dir()`), which the children's own stdout/stderr fill.
    pub fn supervisor_log_dir(&self) -> PathBuf {
        self.logs_dir()
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
