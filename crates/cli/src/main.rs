// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stigmer` - single-binary developer tool. Every subcommand calls
//! straight into `stg-supervisor`; there is no separate daemon process
//! to dial, so each invocation runs its own orchestration and exits.

mod commands;

use clap::{Parser, Subcommand};
use commands::daemon::{self, DaemonArgs};
use stg_core::DataDir;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "stigmer", version, about = "Local developer backend supervisor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the local backend (API server, workflow engine, worker,
    /// agent runner container)
    Daemon(DaemonArgs),
}

#[tokio::main]
async fn main() {
    // The file-appender guard must outlive every `tracing` call in this
    // process, so it stays bound in `main` rather than inside `init_tracing`.
    let _file_guard = init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Daemon(args) => daemon::daemon(args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(exit_code_for(&e));
    }
}

/// Installs two layers: human-readable events on stderr (what an
/// interactive caller sees) and a daily-rotating `supervisor.log` under
/// the data directory (what a later `stigmer daemon status` failure gets
/// debugged from). Falls back to stderr-only if the data directory can't
/// be resolved yet, rather than failing the whole process over logging.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = || tracing_subscriber::EnvFilter::from_default_env();
    let stderr_layer = tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr);

    let Ok(data_dir) = DataDir::resolve() else {
        tracing_subscriber::registry().with(env_filter()).with(stderr_layer).init();
        return None;
    };
    if data_dir.ensure_exists().is_err() {
        tracing_subscriber::registry().with(env_filter()).with(stderr_layer).init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(data_dir.supervisor_log_dir(), "supervisor.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking);

    tracing_subscriber::registry().with(env_filter()).with(stderr_layer).with(file_layer).init();
    Some(guard)
}

/// Unwraps a chained `anyhow::Error` back down to the `SupervisorError`
/// it was built from, if any, so the process exit code still maps 1:1
/// from the error taxonomy even though command handlers use `anyhow` at
/// the CLI boundary.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<stg_supervisor::SupervisorError>().map(|e| e.exit_code()).unwrap_or(1)
}
