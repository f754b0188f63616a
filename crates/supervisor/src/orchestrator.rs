// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Orchestrator (L5): `ensure_running` and `stop`, the only two
//! entry points the rest of the system calls. Everything else in this
//! crate exists to support these two functions.

use crate::config::{EngineMode, LlmProvider, SupervisorConfig};
use crate::cookbook::RestartCookbook;
use crate::engine;
use crate::error::SupervisorError;
use crate::lock;
use crate::reap;
use crate::secrets;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stg_core::id::ComponentKind;
use stg_core::platform::Platform;
use stg_core::{Clock, ComponentName, DataDir, SystemClock};
use stg_health::{ComponentSpec, ComponentState, ComponentStatus, HealthSupervisor, ProbeDescriptor};
use stg_process::{ContainerSpec, NativeSpawn, ProcessError};
use stg_provisioner::Binaries;

const AGENT_CONTAINER_NAME: &str = "stigmer-agent-runner";
const WORKFLOW_TASK_QUEUE: &str = "workflow_runner";
const ACTIVITY_TASK_QUEUE: &str = "activity_runner";
const AGENT_TASK_QUEUE: &str = "agent_execution_runner";

/// Idempotently ensure every supervised component is running. On
/// success the backend is reachable at the configured ports; the caller
/// may exit immediately afterwards — the children are detached and
/// outlive this process.
pub async fn ensure_running(data_dir: &DataDir, config: &SupervisorConfig) -> Result<(), SupervisorError> {
    data_dir.ensure_exists()?;

    // Step 1: acquire daemon.lock, held over every step below.
    let _lock = lock::acquire(data_dir, config.lock_wait).await?;

    // Step 2: fast path.
    if fast_path_healthy(data_dir, config.ports.api_server_grpc).await {
        tracing::info!("API server already healthy, returning via fast path");
        return Ok(());
    }

    // Step 3: reap orphans left by a prior supervisor.
    reap::reap_orphans(data_dir, config).await;

    let platform = Platform::current();
    if !platform.is_supported() {
        return Err(SupervisorError::UnsupportedPlatform(platform.to_string()));
    }

    // Step 4: ensure data dir (already done above) + run the provisioner.
    let binaries = stg_provisioner::ensure_binaries(data_dir, &platform).await?;

    // Step 5: rotate logs.
    let log_retention = Duration::from_secs(config.log_retention_days * 24 * 3600);
    stg_process::rotate_logs(
        &data_dir.logs_dir(),
        &["api-server", "workflow-worker", "workflow-engine"],
        log_retention,
    );

    // Step 6: resolve engine address (configuration itself is an
    // external collaborator's job; we take the resolved values as input).
    let engine_address = match &config.engine_mode {
        EngineMode::External { address } => address.clone(),
        EngineMode::Managed => format!("127.0.0.1:{}", config.ports.engine_grpc),
    };

    // Step 7: gather provider-specific secrets, in-memory only.
    let secret = secrets::gather(config.llm_provider)?;
    let secret_env: Vec<(String, String)> =
        secret.into_iter().map(|s| (s.env_var.to_string(), s.value)).collect();

    // Step 8: managed engine install + spawn + readiness poll.
    if matches!(config.engine_mode, EngineMode::Managed) {
        let engine_path = engine::ensure_engine_binary(&data_dir.bin_dir(), &platform).await?;
        spawn_engine(data_dir, config, &engine_path).await?;
        wait_tcp_ready(&engine_address, config.engine_start_timeout)
            .await
            .map_err(|_| SupervisorError::EngineStartTimeout)?;
    }

    // Step 9: spawn API server, wait for blocking gRPC dial readiness.
    spawn_api_server(data_dir, config, &binaries).await?;
    let api_addr = format!("127.0.0.1:{}", config.ports.api_server_grpc);
    wait_grpc_ready(&api_addr, config.api_server_start_timeout)
        .await
        .map_err(|_| SupervisorError::ApiServerStartTimeout)?;

    // Step 10: spawn the workflow worker.
    spawn_worker(data_dir, config, &binaries, &engine_address).await?;

    // Step 11: spawn the agent runner container.
    spawn_agent_container(data_dir, config, &engine_address, &secret_env).await?;

    // Step 12: write the restart cookbook.
    let mut cookbook = RestartCookbook::from_config(data_dir, config, &engine_address);
    cookbook.api_server_pid = stg_process::read_pid_file(&data_dir.api_server_pid_file())?.map(|p| p as u32);
    cookbook.worker_pid = stg_process::read_pid_file(&data_dir.worker_pid_file())?.map(|p| p as u32);
    cookbook.engine_pid = stg_process::read_pid_file(&data_dir.engine_pid_file())?.map(|p| p as u32);
    cookbook.agent_container_id =
        std::fs::read_to_string(data_dir.agent_container_id_file()).ok().map(|s| s.trim().to_string());
    cookbook.write(data_dir)?;

    // Step 13: register with the Health Supervisor and start the watchdog.
    spawn_health_supervisor(data_dir, config, &binaries, &engine_address, &secret_env);

    Ok(())
}

/// Reverse-order teardown. Every step is idempotent; stopping an
/// already-stopped component is not an error.
pub async fn stop(data_dir: &DataDir, config: &SupervisorConfig) -> Result<(), SupervisorError> {
    let _lock = lock::acquire(data_dir, config.lock_wait).await?;

    // "Stop watchdog": a no-op here, since the watchdog only ever lives
    // inside the process that called `ensure_running` and dies with it.
    stg_process::stop_native(&data_dir.worker_pid_file(), config.stop_grace_period).await?;
    stg_process::stop_container(&data_dir.agent_container_id_file(), config.stop_grace_period).await?;
    stg_process::stop_native(&data_dir.engine_pid_file(), config.stop_grace_period).await?;
    stg_process::stop_native(&data_dir.api_server_pid_file(), config.stop_grace_period).await?;
    RestartCookbook::remove(data_dir);
    Ok(())
}

/// Reconstructed from the filesystem and a live probe, not from any
/// in-process registry — a `status` call runs in a fresh process that
/// never saw the `HealthSupervisor` `ensure_running` registered.
pub async fn status(data_dir: &DataDir, config: &SupervisorConfig) -> Result<Vec<ComponentStatus>, SupervisorError> {
    let cookbook = RestartCookbook::read(data_dir)?;
    if cookbook.is_none() && !data_dir.api_server_pid_file().exists() {
        return Err(SupervisorError::NotRunning);
    }

    let mut statuses = vec![
        probe_native_status(
            ComponentName::new("api-server"),
            ComponentKind::ApiServer,
            &data_dir.api_server_pid_file(),
            Some(config.ports.api_server_grpc),
        )
        .await,
        probe_native_status(
            ComponentName::new("workflow-worker"),
            ComponentKind::WorkflowWorker,
            &data_dir.worker_pid_file(),
            None,
        )
        .await,
    ];

    if matches!(config.engine_mode, EngineMode::Managed) {
        statuses.push(
            probe_native_status(
                ComponentName::new("workflow-engine"),
                ComponentKind::WorkflowEngine,
                &data_dir.engine_pid_file(),
                Some(config.ports.engine_grpc),
            )
            .await,
        );
    }

    statuses.push(probe_container_status(data_dir).await);
    Ok(statuses)
}

async fn fast_path_healthy(data_dir: &DataDir, api_server_port: u16) -> bool {
    let pid_file = data_dir.api_server_pid_file();
    let pid_alive = match stg_process::read_pid_file(&pid_file) {
        Ok(Some(pid)) => {
            if stg_probe::alive(pid).await.is_ok() {
                true
            } else {
                stg_process::remove_pid_file(&pid_file);
                false
            }
        }
        Ok(None) => false,
        Err(_) => false,
    };

    let dial_reachable = stg_probe::grpc_reachable(
        &format!("127.0.0.1:{api_server_port}"),
        Duration::from_secs(1),
    )
    .await
    .is_ok();

    pid_alive || dial_reachable
}

async fn wait_tcp_ready(addr: &str, deadline: Duration) -> Result<(), ()> {
    let start = Instant::now();
    loop {
        if stg_probe::tcp_listening(addr, Duration::from_millis(300)).await.is_ok() {
            return Ok(());
        }
        if start.elapsed() >= deadline {
            return Err(());
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

async fn wait_grpc_ready(addr: &str, deadline: Duration) -> Result<(), ()> {
    let start = Instant::now();
    loop {
        if stg_probe::grpc_reachable(addr, Duration::from_millis(300)).await.is_ok() {
            return Ok(());
        }
        if start.elapsed() >= deadline {
            return Err(());
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

async fn spawn_engine(data_dir: &DataDir, config: &SupervisorConfig, engine_path: &Path) -> Result<u32, SupervisorError> {
    let argv = vec![engine_path.to_string_lossy().into_owned()];
    let env = vec![
        ("DATA_DIR".to_string(), data_dir.temporal_data_dir().to_string_lossy().into_owned()),
        ("GRPC_PORT".to_string(), config.ports.engine_grpc.to_string()),
        ("WEB_UI_PORT".to_string(), config.ports.engine_web_ui.to_string()),
    ];
    let pid_file = data_dir.engine_pid_file();
    let pid = stg_process::spawn_native(NativeSpawn {
        argv: &argv,
        env: &env,
        log_base_name: "workflow-engine",
        logs_dir: &data_dir.logs_dir(),
        pid_file: &pid_file,
    })
    .await?;
    Ok(pid)
}

async fn spawn_api_server(
    data_dir: &DataDir,
    config: &SupervisorConfig,
    binaries: &Binaries,
) -> Result<u32, SupervisorError> {
    let argv = vec![binaries.api_server.to_string_lossy().into_owned()];
    let env = vec![
        ("DATA_DIR".to_string(), data_dir.root().to_string_lossy().into_owned()),
        ("GRPC_PORT".to_string(), config.ports.api_server_grpc.to_string()),
    ];
    let pid_file = data_dir.api_server_pid_file();
    let pid = stg_process::spawn_native(NativeSpawn {
        argv: &argv,
        env: &env,
        log_base_name: "api-server",
        logs_dir: &data_dir.logs_dir(),
        pid_file: &pid_file,
    })
    .await?;
    Ok(pid)
}

async fn spawn_worker(
    data_dir: &DataDir,
    config: &SupervisorConfig,
    binaries: &Binaries,
    engine_address: &str,
) -> Result<u32, SupervisorError> {
    let argv = vec![binaries.worker.to_string_lossy().into_owned()];
    let env = vec![
        ("EXECUTION_MODE".to_string(), "worker".to_string()),
        ("ENGINE_ADDRESS".to_string(), engine_address.to_string()),
        ("ENGINE_NAMESPACE".to_string(), "default".to_string()),
        ("WORKFLOW_TASK_QUEUE".to_string(), WORKFLOW_TASK_QUEUE.to_string()),
        ("ACTIVITY_TASK_QUEUE".to_string(), ACTIVITY_TASK_QUEUE.to_string()),
        ("AGENT_TASK_QUEUE".to_string(), AGENT_TASK_QUEUE.to_string()),
        ("BACKEND_ENDPOINT".to_string(), format!("localhost:{}", config.ports.api_server_grpc)),
        ("LOG_LEVEL".to_string(), "DEBUG".to_string()),
    ];
    let pid_file = data_dir.worker_pid_file();
    let pid = stg_process::spawn_native(NativeSpawn {
        argv: &argv,
        env: &env,
        log_base_name: "workflow-worker",
        logs_dir: &data_dir.logs_dir(),
        pid_file: &pid_file,
    })
    .await?;
    Ok(pid)
}

async fn spawn_agent_container(
    data_dir: &DataDir,
    config: &SupervisorConfig,
    engine_address: &str,
    secret_env: &[(String, String)],
) -> Result<String, SupervisorError> {
    let mut env = vec![
        ("MODE".to_string(), "local".to_string()),
        ("BACKEND_URL".to_string(), format!("http://localhost:{}", config.ports.api_server_grpc)),
        ("ENGINE_ADDRESS".to_string(), engine_address.to_string()),
        ("TASK_QUEUE".to_string(), AGENT_TASK_QUEUE.to_string()),
        ("SANDBOX_TYPE".to_string(), "filesystem".to_string()),
        ("WORKSPACE_ROOT".to_string(), "/workspace".to_string()),
        ("LLM_PROVIDER".to_string(), llm_provider_str(config.llm_provider).to_string()),
        ("LLM_MODEL".to_string(), config.llm_model.clone()),
        ("LLM_BASE_URL".to_string(), config.llm_base_url.clone()),
    ];
    env.extend(secret_env.iter().cloned());

    let spec = ContainerSpec {
        name: AGENT_CONTAINER_NAME.to_string(),
        image: config.container_image.clone(),
        env,
        workspace_mount: (data_dir.workspace_dir(), "/workspace".to_string()),
    };
    let id_file = data_dir.agent_container_id_file();
    stg_process::spawn_container(&spec, &id_file).await.map_err(map_container_error)
}

/// Both a missing `docker` binary and a `docker` binary whose daemon is
/// unreachable (installed but not running) map to `ContainerRuntimeMissing`;
/// every other container failure is a generic process error rather than
/// silently downgrading the container runtime's absence.
fn map_container_error(e: ProcessError) -> SupervisorError {
    if e.is_container_runtime_unavailable() {
        return SupervisorError::ContainerRuntimeMissing;
    }
    SupervisorError::Process(e)
}

fn llm_provider_str(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Ollama => "ollama",
        LlmProvider::Anthropic => "anthropic",
        LlmProvider::OpenAi => "openai",
    }
}

fn spawn_health_supervisor(
    data_dir: &DataDir,
    config: &SupervisorConfig,
    binaries: &Binaries,
    engine_address: &str,
    secret_env: &[(String, String)],
) {
    let supervisor = Arc::new(HealthSupervisor::new().with_tick_interval(config.watchdog_tick_interval));

    supervisor.register(ComponentSpec {
        name: ComponentName::new("api-server"),
        kind: ComponentKind::ApiServer,
        startup_probe: native_probe(data_dir.api_server_pid_file(), Some(config.ports.api_server_grpc)),
        liveness_probe: native_probe(data_dir.api_server_pid_file(), Some(config.ports.api_server_grpc)),
        readiness_probe: None,
        restart: config.restart,
        restart_fn: {
            let data_dir = data_dir.clone();
            let config = config.clone();
            let binaries = binaries.clone();
            Arc::new(move || {
                let data_dir = data_dir.clone();
                let config = config.clone();
                let binaries = binaries.clone();
                async move {
                    stg_process::stop_native(&data_dir.api_server_pid_file(), config.stop_grace_period)
                        .await
                        .map_err(|e| e.to_string())?;
                    spawn_api_server(&data_dir, &config, &binaries).await.map_err(|e| e.to_string())?;
                    Ok(())
                }
            })
        },
    });

    supervisor.register(ComponentSpec {
        name: ComponentName::new("workflow-worker"),
        kind: ComponentKind::WorkflowWorker,
        startup_probe: native_probe(data_dir.worker_pid_file(), None),
        liveness_probe: native_probe(data_dir.worker_pid_file(), None),
        readiness_probe: None,
        restart: config.restart,
        restart_fn: {
            let data_dir = data_dir.clone();
            let config = config.clone();
            let binaries = binaries.clone();
            let engine_address = engine_address.to_string();
            Arc::new(move || {
                let data_dir = data_dir.clone();
                let config = config.clone();
                let binaries = binaries.clone();
                let engine_address = engine_address.clone();
                async move {
                    stg_process::stop_native(&data_dir.worker_pid_file(), config.stop_grace_period)
                        .await
                        .map_err(|e| e.to_string())?;
                    spawn_worker(&data_dir, &config, &binaries, &engine_address).await.map_err(|e| e.to_string())?;
                    Ok(())
                }
            })
        },
    });

    if matches!(config.engine_mode, EngineMode::Managed) {
        supervisor.register(ComponentSpec {
            name: ComponentName::new("workflow-engine"),
            kind: ComponentKind::WorkflowEngine,
            startup_probe: native_probe(data_dir.engine_pid_file(), Some(config.ports.engine_grpc)),
            liveness_probe: native_probe(data_dir.engine_pid_file(), Some(config.ports.engine_grpc)),
            readiness_probe: None,
            restart: config.restart,
            restart_fn: {
                let data_dir = data_dir.clone();
                let config = config.clone();
                Arc::new(move || {
                    let data_dir = data_dir.clone();
                    let config = config.clone();
                    async move {
                        let engine_path = data_dir.bin_dir().join(engine::ENGINE_BINARY_NAME);
                        stg_process::stop_native(&data_dir.engine_pid_file(), config.stop_grace_period)
                            .await
                            .map_err(|e| e.to_string())?;
                        spawn_engine(&data_dir, &config, &engine_path).await.map_err(|e| e.to_string())?;
                        Ok(())
                    }
                })
            },
        });
    }

    supervisor.register(ComponentSpec {
        name: ComponentName::new("agent-container"),
        kind: ComponentKind::AgentContainer,
        startup_probe: container_probe(),
        liveness_probe: container_probe(),
        readiness_probe: None,
        restart: config.restart,
        restart_fn: {
            let data_dir = data_dir.clone();
            let config = config.clone();
            let engine_address = engine_address.to_string();
            let secret_env = secret_env.to_vec();
            Arc::new(move || {
                let data_dir = data_dir.clone();
                let config = config.clone();
                let engine_address = engine_address.clone();
                let secret_env = secret_env.clone();
                async move {
                    stg_process::stop_container(&data_dir.agent_container_id_file(), config.stop_grace_period)
                        .await
                        .map_err(|e| e.to_string())?;
                    spawn_agent_container(&data_dir, &config, &engine_address, &secret_env)
                        .await
                        .map_err(|e| e.to_string())?;
                    Ok(())
                }
            })
        },
    });

    tokio::spawn(async move {
        supervisor.run_watchdog().await;
    });
}

fn native_probe(pid_file: std::path::PathBuf, port: Option<u16>) -> ProbeDescriptor {
    ProbeDescriptor::new(move || {
        let pid_file = pid_file.clone();
        async move {
            let pid = stg_process::read_pid_file(&pid_file)?.ok_or(stg_probe::ProbeError::NotAlive(0))?;
            stg_probe::alive(pid).await?;
            if let Some(port) = port {
                stg_probe::grpc_reachable(&format!("127.0.0.1:{port}"), Duration::from_millis(500)).await?;
            }
            Ok(())
        }
    })
}

fn container_probe() -> ProbeDescriptor {
    ProbeDescriptor::new(|| async {
        stg_probe::container_running(AGENT_CONTAINER_NAME, Duration::from_secs(2)).await?;
        stg_probe::container_healthy(AGENT_CONTAINER_NAME, Duration::from_secs(2)).await
    })
}

async fn probe_native_status(
    name: ComponentName,
    kind: ComponentKind,
    pid_file: &Path,
    port: Option<u16>,
) -> ComponentStatus {
    let pid = stg_process::read_pid_file(pid_file).ok().flatten();
    let (state, last_error) = match pid {
        None => (ComponentState::Stopped, None),
        Some(pid) => match stg_probe::alive(pid).await {
            Err(e) => (ComponentState::Stopped, Some(e.to_string())),
            Ok(()) => match port {
                None => (ComponentState::Running, None),
                Some(port) => {
                    match stg_probe::grpc_reachable(&format!("127.0.0.1:{port}"), Duration::from_millis(500)).await {
                        Ok(()) => (ComponentState::Running, None),
                        Err(e) => (ComponentState::Unhealthy, Some(e.to_string())),
                    }
                }
            },
        },
    };

    ComponentStatus {
        name,
        kind,
        state,
        uptime_secs: file_age_secs(pid_file),
        consec_fails: 0,
        consec_ok: 0,
        restart_count: 0,
        last_error,
        observed_at_epoch_ms: SystemClock.epoch_ms(),
    }
}

async fn probe_container_status(data_dir: &DataDir) -> ComponentStatus {
    let id_file = data_dir.agent_container_id_file();
    let id = std::fs::read_to_string(&id_file).ok();
    let (state, last_error) = match id {
        None => (ComponentState::Stopped, None),
        Some(_) => match stg_probe::container_running(AGENT_CONTAINER_NAME, Duration::from_secs(2)).await {
            Err(e) => (ComponentState::Stopped, Some(e.to_string())),
            Ok(()) => match stg_probe::container_healthy(AGENT_CONTAINER_NAME, Duration::from_secs(2)).await {
                Ok(()) => (ComponentState::Running, None),
                Err(e) => (ComponentState::Unhealthy, Some(e.to_string())),
            },
        },
    };

    ComponentStatus {
        name: ComponentName::new("agent-container"),
        kind: ComponentKind::AgentContainer,
        state,
        uptime_secs: file_age_secs(&id_file),
        consec_fails: 0,
        consec_ok: 0,
        restart_count: 0,
        last_error,
        observed_at_epoch_ms: SystemClock.epoch_ms(),
    }
}

/// Best-effort uptime proxy for a status reconstructed without an
/// in-process record: how long ago the PID/id file was last written.
fn file_age_secs(path: &Path) -> u64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| std::time::SystemTime::now().duration_since(modified).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
