// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::ProcessError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Everything needed to bring up the containerized agent runner.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub env: Vec<(String, String)>,
    /// `(host_path, container_path)` bind-mount for the workspace.
    pub workspace_mount: (PathBuf, String),
}

/// `docker run -d --name <fixed> --network host --restart unless-stopped
/// --log-opt max-size=10m --log-opt max-file=3` with the given `ContainerSpec`'s
/// env, image, and workspace bind-mount. Any container by that name is
/// force-removed first. The returned ID is persisted to `id_file`.
pub async fn spawn_container(spec: &ContainerSpec, id_file: &Path) -> Result<String, ProcessError> {
    let _ = run_docker(&["rm", "-f", &spec.name]).await;

    let mount = format!("{}:{}", spec.workspace_mount.0.display(), spec.workspace_mount.1);
    let mut args: Vec<String> = vec![
        "run".into(),
        "-d".into(),
        "--name".into(),
        spec.name.clone(),
        "--network".into(),
        "host".into(),
        "--restart".into(),
        "unless-stopped".into(),
        "--log-opt".into(),
        "max-size=10m".into(),
        "--log-opt".into(),
        "max-file=3".into(),
    ];
    for (key, value) in &spec.env {
        args.push("-e".into());
        args.push(format!("{key}={value}"));
    }
    args.push("-v".into());
    args.push(mount);
    args.push(spec.image.clone());

    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = run_docker(&refs).await?;
    let id = output.trim().to_string();

    std::fs::write(id_file, &id)?;
    Ok(id)
}

/// `docker stop`, then `docker kill` on failure; always `docker rm`;
/// remove the id file. Idempotent: stopping an absent container is not
/// an error.
pub async fn stop_container(id_file: &Path, grace_period: Duration) -> Result<(), ProcessError> {
    let id = match std::fs::read_to_string(id_file) {
        Ok(contents) => contents.trim().to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let secs = grace_period.as_secs().to_string();
    if run_docker(&["stop", "-t", &secs, &id]).await.is_err() {
        let _ = run_docker(&["kill", &id]).await;
    }
    let _ = run_docker(&["rm", &id]).await;
    let _ = std::fs::remove_file(id_file);
    Ok(())
}

async fn run_docker(args: &[&str]) -> Result<String, ProcessError> {
    let output =
        Command::new("docker").args(args).output().await.map_err(ProcessError::SpawnFailed)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(ProcessError::ContainerCommandFailed(stderr));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `docker`'s own wording for "the CLI is installed but its daemon is
/// not running" — distinct from a command failing for some other reason
/// (bad image, name conflict, ...).
pub(crate) fn is_daemon_unreachable(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("cannot connect to the docker daemon") || lower.contains("is the docker daemon running")
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
