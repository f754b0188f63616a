// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to open log file: {0}")]
    LogOpenFailed(#[source] std::io::Error),

    #[error("failed to spawn child process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("spawned child reported no PID")]
    NoPid,

    #[error("failed to write PID file: {0}")]
    PidFileWriteFailed(#[source] std::io::Error),

    #[error("container command failed: {0}")]
    ContainerCommandFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    /// True when the failure means "no usable container runtime", as
    /// opposed to a runtime that is present but rejected this particular
    /// command: either the `docker` binary itself is absent, or `docker`
    /// ran but reported its daemon is unreachable.
    pub fn is_container_runtime_unavailable(&self) -> bool {
        match self {
            ProcessError::SpawnFailed(io_err) => io_err.kind() == std::io::ErrorKind::NotFound,
            ProcessError::ContainerCommandFailed(stderr) => crate::container::is_daemon_unreachable(stderr),
            _ => false,
        }
    }
}
