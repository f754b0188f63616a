// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("process {0} is not alive")]
    NotAlive(i32),

    #[error("timed out after {0:?} waiting on probe")]
    TimedOut(std::time::Duration),

    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    #[error("container command failed: {0}")]
    CommandFailed(String),

    #[error("container {0} is not running")]
    ContainerNotRunning(String),

    #[error("container {0} reports unhealthy")]
    ContainerUnhealthy(String),

    #[error("uptime {elapsed:?} below required minimum {required:?}")]
    UptimeTooLow { elapsed: std::time::Duration, required: std::time::Duration },

    #[error("failed to spawn container CLI: {0}")]
    Io(#[from] std::io::Error),
}
