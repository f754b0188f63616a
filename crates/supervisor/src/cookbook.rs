// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart cookbook: the persisted record of how to (re)spawn each
//! component. Captures derived, non-secret configuration only — secrets
//! are always re-solicited, never cached here or anywhere else on disk.

use crate::config::{EngineMode, LlmProvider, SupervisorConfig};
use crate::error::SupervisorError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stg_core::DataDir;

/// Written by `ensure_running` step 12 and read back by a future
/// supervisor process that needs to know how this system was last
/// brought up (e.g. to re-display `status`, or to respawn after a reap).
/// Every value here is non-secret and derived — a fresh supervisor must
/// be able to respawn every component from this document alone, without
/// re-reading live CLI flags or environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartCookbook {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub engine_address: String,
    pub engine_mode: EngineMode,
    pub llm_provider: LlmProvider,
    pub llm_model: String,
    pub llm_base_url: String,
    pub container_image: String,
    pub pull_image: bool,
    pub cleanup_on_stop: bool,
    pub ttl_secs: Option<u64>,
    pub api_server_pid: Option<u32>,
    pub worker_pid: Option<u32>,
    pub engine_pid: Option<u32>,
    pub agent_container_id: Option<String>,
}

impl RestartCookbook {
    pub fn from_config(data_dir: &DataDir, config: &SupervisorConfig, engine_address: &str) -> Self {
        Self {
            data_dir: data_dir.root().to_path_buf(),
            log_dir: data_dir.logs_dir(),
            engine_address: engine_address.to_string(),
            engine_mode: config.engine_mode.clone(),
            llm_provider: config.llm_provider,
            llm_model: config.llm_model.clone(),
            llm_base_url: config.llm_base_url.clone(),
            container_image: config.container_image.clone(),
            pull_image: config.pull_image,
            cleanup_on_stop: config.cleanup_on_stop,
            ttl_secs: config.ttl.map(|d| d.as_secs()),
            api_server_pid: None,
            worker_pid: None,
            engine_pid: None,
            agent_container_id: None,
        }
    }

    pub fn write(&self, data_dir: &DataDir) -> Result<(), SupervisorError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| SupervisorError::Cookbook(e.to_string()))?;
        std::fs::write(data_dir.cookbook_file(), json)?;
        Ok(())
    }

    pub fn read(data_dir: &DataDir) -> Result<Option<Self>, SupervisorError> {
        match std::fs::read_to_string(data_dir.cookbook_file()) {
            Ok(contents) => {
                let cookbook = serde_json::from_str(&contents)
                    .map_err(|e| SupervisorError::Cookbook(e.to_string()))?;
                Ok(Some(cookbook))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn remove(data_dir: &DataDir) {
        let _ = std::fs::remove_file(data_dir.cookbook_file());
    }
}

#[cfg(test)]
#[path = "cookbook_tests.rs"]
mod tests;
