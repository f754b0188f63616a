// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::ProcessError;
use crate::pidfile::{read_pid_file, remove_pid_file, write_pid_file};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Everything needed to bring up one native child: the argv, the
/// environment to inject, and where its rotated logs/PID file live.
pub struct NativeSpawn<'a> {
    pub argv: &'a [String],
    pub env: &'a [(String, String)],
    pub log_base_name: &'a str,
    pub logs_dir: &'a Path,
    pub pid_file: &'a Path,
}

/// Spawn a detached native child: open its log files (append+create),
/// spawn into its own process group (POSIX) / as a detached process
/// (Windows), write a PID file, and reap its exit status on a background
/// task. On any error after `exec`, the child is killed and the PID file
/// removed.
pub async fn spawn_native(spawn: NativeSpawn<'_>) -> Result<u32, ProcessError> {
    let log_path = spawn.logs_dir.join(format!("{}.log", spawn.log_base_name));
    let err_path = spawn.logs_dir.join(format!("{}.err", spawn.log_base_name));

    let stdout = open_append(&log_path).map_err(ProcessError::LogOpenFailed)?;
    let stderr = open_append(&err_path).map_err(ProcessError::LogOpenFailed)?;

    let mut cmd = Command::new(&spawn.argv[0]);
    cmd.args(&spawn.argv[1..]);
    for (key, value) in spawn.env {
        cmd.env(key, value);
    }
    cmd.stdin(Stdio::null()).stdout(stdout).stderr(stderr);
    detach(&mut cmd);

    let mut child = cmd.spawn().map_err(ProcessError::SpawnFailed)?;
    let pid = child.id().ok_or(ProcessError::NoPid)?;

    if let Err(e) = write_pid_file(spawn.pid_file, pid) {
        let _ = child.start_kill();
        return Err(ProcessError::PidFileWriteFailed(e));
    }

    let log_base_name = spawn.log_base_name.to_string();
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => tracing::info!(pid, component = %log_base_name, ?status, "child exited"),
            Err(e) => tracing::warn!(pid, component = %log_base_name, error = %e, "failed to reap child"),
        }
    });

    Ok(pid)
}

/// Read the PID; if the process is not alive, remove the file and
/// return. Otherwise `SIGTERM`, poll at 500 ms up to `grace_period`, then
/// `SIGKILL`; the PID file is removed in every success path. Idempotent:
/// stopping an already-stopped component is not an error.
pub async fn stop_native(pid_file: &Path, grace_period: Duration) -> Result<(), ProcessError> {
    let pid = match read_pid_file(pid_file)? {
        Some(pid) => pid,
        None => return Ok(()),
    };

    if kill(Pid::from_raw(pid), None).is_err() {
        remove_pid_file(pid_file);
        return Ok(());
    }

    let _ = kill(Pid::from_raw(pid), Signal::SIGTERM);

    let deadline = Instant::now() + grace_period;
    loop {
        if kill(Pid::from_raw(pid), None).is_err() {
            break;
        }
        if Instant::now() >= deadline {
            let _ = kill(Pid::from_raw(pid), Signal::SIGKILL);
            break;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    remove_pid_file(pid_file);
    Ok(())
}

fn open_append(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    // New process group so a SIGINT to this process's group does not
    // also reach the child; stop_native uses an explicit SIGTERM/SIGKILL
    // sequence instead.
    cmd.process_group(0);
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP | DETACHED_PROCESS);
}

#[cfg(test)]
#[path = "native_tests.rs"]
mod tests;
