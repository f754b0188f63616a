// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Public error taxonomy: every variant maps to a distinct CLI exit code
/// via [`SupervisorError::exit_code`].
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("a supervisor already holds the daemon lock for this data directory")]
    AlreadyRunning,

    #[error("no supervised components are running in this data directory")]
    NotRunning,

    #[error("timed out acquiring daemon.lock within the caller's deadline")]
    LockContention,

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("required companion binary missing: {0}")]
    BinaryMissing(String),

    #[error("container runtime is not installed or not reachable")]
    ContainerRuntimeMissing,

    #[error("workflow engine did not become ready within the startup timeout")]
    EngineStartTimeout,

    #[error("API server did not become ready within the startup timeout")]
    ApiServerStartTimeout,

    #[error("component {0} exceeded its restart-rate budget")]
    RestartBudgetExceeded(String),

    #[error("failed to read or write the restart cookbook: {0}")]
    Cookbook(String),

    #[error("failed to read supervisor configuration: {0}")]
    Config(String),

    #[error("failed to read a required secret: {0}")]
    Secret(String),

    #[error(transparent)]
    Provision(#[from] stg_provisioner::ProvisionError),

    #[error(transparent)]
    Process(#[from] stg_process::ProcessError),

    #[error(transparent)]
    Probe(#[from] stg_probe::ProbeError),

    #[error(transparent)]
    Core(#[from] stg_core::CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SupervisorError {
    /// Exit code mapping for the CLI boundary: exit codes map 1:1 from
    /// `SupervisorError` variants. `0` is reserved for success by the CLI
    /// itself and never returned here.
    pub fn exit_code(&self) -> i32 {
        match self {
            SupervisorError::AlreadyRunning => 10,
            SupervisorError::NotRunning => 11,
            SupervisorError::LockContention => 12,
            SupervisorError::UnsupportedPlatform(_) => 13,
            SupervisorError::BinaryMissing(_) => 14,
            SupervisorError::ContainerRuntimeMissing => 15,
            SupervisorError::EngineStartTimeout => 16,
            SupervisorError::ApiServerStartTimeout => 17,
            SupervisorError::RestartBudgetExceeded(_) => 18,
            SupervisorError::Cookbook(_) => 19,
            SupervisorError::Config(_) => 20,
            SupervisorError::Secret(_) => 21,
            SupervisorError::Provision(_) => 22,
            SupervisorError::Process(_) => 23,
            SupervisorError::Probe(_) => 24,
            SupervisorError::Core(_) => 25,
            SupervisorError::Io(_) => 1,
        }
    }
}
