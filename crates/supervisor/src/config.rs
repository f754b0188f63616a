// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor tunables: constructible programmatically (the common case)
//! or loaded from a small TOML file for standalone use and tests.

use crate::error::SupervisorError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use stg_health::RestartConfig;

/// Fixed ports: API server gRPC, engine gRPC, engine web UI, and the
/// local LLM server when the provider is Ollama.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ports {
    pub api_server_grpc: u16,
    pub engine_grpc: u16,
    pub engine_web_ui: u16,
    pub llm_local: u16,
}

impl Default for Ports {
    fn default() -> Self {
        Self { api_server_grpc: 7234, engine_grpc: 7233, engine_web_ui: 8233, llm_local: 11434 }
    }
}

/// LLM provider selection: only Anthropic and OpenAI need a secret
/// gathered; Ollama runs against the local server and needs none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LlmProvider {
    Ollama,
    Anthropic,
    OpenAi,
}

/// Whether the workflow engine is installed and spawned by this
/// supervisor ("managed") or already running externally at a
/// caller-supplied address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineMode {
    Managed,
    External { address: String },
}

/// Everything `ensure_running`/`stop` need beyond the data directory
/// itself. The LLM/engine/container fields are the resolved output of
/// the YAML config loader (out of scope for this crate), supplied by the
/// caller rather than read from disk here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    pub ports: Ports,
    /// How often the watchdog ticks over every registered component.
    pub watchdog_tick_interval: Duration,
    /// Restart policy applied to every component unless a per-component
    /// override is introduced later; one default covers all four today.
    pub restart: RestartConfig,
    /// Deadline for acquiring `daemon.lock`.
    pub lock_wait: Duration,
    /// Deadline for the engine TCP-port poll.
    pub engine_start_timeout: Duration,
    /// Deadline for the API-server blocking gRPC dial.
    pub api_server_start_timeout: Duration,
    /// Grace period given to a child between `SIGTERM` and `SIGKILL`, and
    /// between `docker stop` and `docker kill`.
    pub stop_grace_period: Duration,
    pub log_retention_days: u64,
    pub engine_mode: EngineMode,
    pub llm_provider: LlmProvider,
    pub llm_model: String,
    pub llm_base_url: String,
    pub container_image: String,
    pub pull_image: bool,
    pub cleanup_on_stop: bool,
    pub ttl: Option<Duration>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            ports: Ports::default(),
            watchdog_tick_interval: Duration::from_secs(10),
            restart: RestartConfig::default(),
            lock_wait: Duration::from_secs(30),
            engine_start_timeout: Duration::from_secs(10),
            api_server_start_timeout: Duration::from_secs(10),
            stop_grace_period: Duration::from_secs(10),
            log_retention_days: 7,
            engine_mode: EngineMode::Managed,
            llm_provider: LlmProvider::Ollama,
            llm_model: "llama3.1".to_string(),
            llm_base_url: "http://localhost:11434".to_string(),
            container_image: "stigmer/agent-runner:latest".to_string(),
            pull_image: false,
            cleanup_on_stop: false,
            ttl: None,
        }
    }
}

impl SupervisorConfig {
    /// Load overrides from a TOML file; any field left unset in the file
    /// keeps its default (`#[serde(default)]` is struct-level, so a
    /// partial file is valid).
    pub fn load_toml(path: &Path) -> Result<Self, SupervisorError> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| SupervisorError::Config(e.to_string()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
