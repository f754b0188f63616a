// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orphan sweep. One-shot cleanup of whatever a prior supervisor left
//! behind: for each known PID/container-id file whose referent is still
//! alive, terminate it and remove the file.

use crate::config::SupervisorConfig;
use std::time::Duration;
use stg_core::DataDir;

/// SIGTERM-then-SIGKILL gap used only during reap, distinct from the
/// longer grace period `stop()` gives a component it is deliberately
/// shutting down.
const REAP_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Tear down anything a prior supervisor left running. Best-effort:
/// failures to stop one component never prevent reaping the rest, since
/// the goal is a clean slate for the fresh spawn sequence that follows.
pub async fn reap_orphans(data_dir: &DataDir, _config: &SupervisorConfig) {
    if let Err(e) = stg_process::stop_native(&data_dir.worker_pid_file(), REAP_GRACE_PERIOD).await {
        tracing::warn!(error = %e, "failed to reap orphaned worker");
    }
    if let Err(e) = stg_process::stop_native(&data_dir.engine_pid_file(), REAP_GRACE_PERIOD).await {
        tracing::warn!(error = %e, "failed to reap orphaned engine");
    }
    if let Err(e) = stg_process::stop_native(&data_dir.api_server_pid_file(), REAP_GRACE_PERIOD).await {
        tracing::warn!(error = %e, "failed to reap orphaned API server");
    }
    if let Err(e) = stg_process::stop_container(&data_dir.agent_container_id_file(), REAP_GRACE_PERIOD).await {
        tracing::warn!(error = %e, "failed to reap orphaned agent container");
    }
}

#[cfg(test)]
#[path = "reap_tests.rs"]
mod tests;
