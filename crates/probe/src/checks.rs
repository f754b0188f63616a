// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::ProbeError;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::process::Command;

/// A boxed, ready-to-await probe check, the unit [`all`] composes over.
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ProbeError>> + Send + 'a>>;

/// Send a null signal to `pid`; "process not found" is the only signal
/// treated as dead. On platforms where find-by-PID always succeeds this
/// is the only authoritative liveness test — see `stg-core`'s design
/// notes on PID recycling: callers must combine this with a
/// protocol-level check before trusting it.
pub async fn alive(pid: i32) -> Result<(), ProbeError> {
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => Ok(()),
        Err(nix::errno::Errno::ESRCH) => Err(ProbeError::NotAlive(pid)),
        // Any other errno (e.g. EPERM) means the PID is occupied by
        // *something* — treat as alive, matching the "null-signal test
        // only tells you presence, not ownership" contract.
        Err(_) => Ok(()),
    }
}

/// Attempt a blocking connect with a caller-supplied timeout.
pub async fn tcp_listening(addr: &str, timeout: Duration) -> Result<(), ProbeError> {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(ProbeError::ConnectFailed(e)),
        Err(_) => Err(ProbeError::TimedOut(timeout)),
    }
}

/// Attempt a blocking dial; a connected socket counts as reachable
/// regardless of any response — this deliberately does not perform a
/// gRPC handshake, only a TCP-level reachability check.
pub async fn grpc_reachable(addr: &str, timeout: Duration) -> Result<(), ProbeError> {
    tcp_listening(addr, timeout).await
}

/// `docker ps -q --filter name=^<name>$`; non-empty stdout is "running".
pub async fn container_running(name: &str, timeout: Duration) -> Result<(), ProbeError> {
    let filter = format!("name=^{name}$");
    let output = run_docker(&["ps", "-q", "--filter", &filter], timeout).await?;
    if output.trim().is_empty() {
        return Err(ProbeError::ContainerNotRunning(name.to_string()));
    }
    Ok(())
}

/// Inspect the container's health field; `unhealthy` fails, anything
/// else (including absent health check) passes.
pub async fn container_healthy(name: &str, timeout: Duration) -> Result<(), ProbeError> {
    let output = run_docker(
        &["inspect", "--format", "{{if .State.Health}}{{.State.Health.Status}}{{end}}", name],
        timeout,
    )
    .await?;
    if output.trim() == "unhealthy" {
        return Err(ProbeError::ContainerUnhealthy(name.to_string()));
    }
    Ok(())
}

/// Guards against crash-loop false-positives: a component must have been
/// up for at least `min` before its uptime is considered established.
pub fn uptime_at_least(start: Instant, now: Instant, min: Duration) -> Result<(), ProbeError> {
    let elapsed = now.saturating_duration_since(start);
    if elapsed < min {
        return Err(ProbeError::UptimeTooLow { elapsed, required: min });
    }
    Ok(())
}

/// Fails on first error; used to build per-kind checks, e.g. the
/// API-server liveness is `all([alive(pid), grpc_reachable(addr)])`.
pub async fn all(checks: Vec<ProbeFuture<'_>>) -> Result<(), ProbeError> {
    for check in checks {
        check.await?;
    }
    Ok(())
}

async fn run_docker(args: &[&str], timeout: Duration) -> Result<String, ProbeError> {
    let fut = Command::new("docker").args(args).output();
    let output = match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result?,
        Err(_) => return Err(ProbeError::TimedOut(timeout)),
    };
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(ProbeError::CommandFailed(stderr));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
#[path = "checks_tests.rs"]
mod tests;
