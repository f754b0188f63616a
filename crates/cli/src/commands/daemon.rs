// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stigmer daemon` - local backend lifecycle commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use stg_core::DataDir;
use stg_supervisor::{ensure_running, status, stop, SupervisorConfig};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Ensure the local backend is running (idempotent)
    Start {
        /// Path to a supervisor.toml overriding the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Stop every supervised component
    Stop {
        /// Path to a supervisor.toml overriding the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Report the state of each supervised component
    Status {
        /// Path to a supervisor.toml overriding the defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub async fn daemon(args: DaemonArgs) -> Result<()> {
    match args.command {
        DaemonCommand::Start { config } => start(config).await,
        DaemonCommand::Stop { config } => stop_cmd(config).await,
        DaemonCommand::Status { config, json } => status_cmd(config, json).await,
    }
}

async fn start(config_path: Option<PathBuf>) -> Result<()> {
    let data_dir = DataDir::resolve().context("could not determine the data directory")?;
    let config = load_config(config_path)?;

    ensure_running(&data_dir, &config).await?;
    println!("backend running at {}", data_dir.root().display());
    Ok(())
}

async fn stop_cmd(config_path: Option<PathBuf>) -> Result<()> {
    let data_dir = DataDir::resolve().context("could not determine the data directory")?;
    let config = load_config(config_path)?;

    stop(&data_dir, &config).await?;
    println!("backend stopped");
    Ok(())
}

async fn status_cmd(config_path: Option<PathBuf>, json: bool) -> Result<()> {
    let data_dir = DataDir::resolve().context("could not determine the data directory")?;
    let config = load_config(config_path)?;

    let statuses = status(&data_dir, &config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    for component in &statuses {
        let error_suffix = component.last_error.as_deref().map(|e| format!(" ({e})")).unwrap_or_default();
        println!(
            "{:<18} {:<10} uptime={}s{}",
            component.name.as_str(),
            component.state.to_string(),
            component.uptime_secs,
            error_suffix
        );
    }
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<SupervisorConfig> {
    match path {
        Some(path) => Ok(SupervisorConfig::load_toml(&path)?),
        None => Ok(SupervisorConfig::default()),
    }
}
