// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Health Supervisor (L4): a registry of per-component state machines
//! plus a single watchdog loop that ticks over all of them.

use crate::policy::{RestartAction, RestartConfig, RestartPolicy};
use crate::probe_descriptor::ProbeDescriptor;
use crate::record::{ComponentRecord, ComponentSnapshot};
use crate::state::ComponentState;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use stg_core::id::ComponentKind;
use stg_core::{Clock, ComponentName, SystemClock};
use tokio_util::sync::CancellationToken;

/// How to (re)spawn a component. Implementors wrap the L3 `spawn_*`
/// calls; the supervisor never spawns children directly.
#[async_trait]
pub trait RestartFn: Send + Sync {
    async fn restart(&self) -> Result<(), String>;
}

#[async_trait]
impl<F, Fut> RestartFn for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<(), String>> + Send,
{
    async fn restart(&self) -> Result<(), String> {
        (self)().await
    }
}

/// Everything the watchdog needs to manage one component.
pub struct ComponentSpec {
    pub name: ComponentName,
    pub kind: ComponentKind,
    pub startup_probe: ProbeDescriptor,
    pub liveness_probe: ProbeDescriptor,
    /// Readiness probes never cause a restart; they only mark
    /// "ready-to-accept-work" and are not scheduled by this watchdog.
    pub readiness_probe: Option<ProbeDescriptor>,
    pub restart: RestartConfig,
    pub restart_fn: Arc<dyn RestartFn>,
}

struct Entry {
    spec: ComponentSpec,
    record: RwLock<ComponentRecord>,
    /// Serializes restart attempts so at most one `restart_fn` call per
    /// component is ever in flight. The state machine already prevents a
    /// second kickoff while `Restarting`; this lock is a belt-and-suspenders
    /// guard against that invariant ever slipping.
    restart_lock: tokio::sync::Mutex<()>,
}

/// Registry of component records plus the watchdog that drives their
/// state machines. Generic over [`Clock`] so tests can drive time
/// deterministically with `stg_core::FakeClock`.
pub struct HealthSupervisor<C: Clock = SystemClock> {
    clock: C,
    components: RwLock<HashMap<ComponentName, Arc<Entry>>>,
    tick_interval: Duration,
    cancellation: CancellationToken,
}

impl HealthSupervisor<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for HealthSupervisor<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> HealthSupervisor<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            components: RwLock::new(HashMap::new()),
            tick_interval: Duration::from_secs(10),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Register a component. Always starts in `Starting` — this is the
    /// only way a component leaves `Failed` — that transition requires an
    /// external stop + start.
    pub fn register(&self, spec: ComponentSpec) {
        let name = spec.name.clone();
        let record = ComponentRecord::new(spec.name.clone(), spec.kind, self.clock.now());
        let entry =
            Arc::new(Entry { spec, record: RwLock::new(record), restart_lock: tokio::sync::Mutex::new(()) });
        self.components.write().insert(name, entry);
    }

    /// Remove a component from supervision entirely (used by `stop`).
    pub fn unregister(&self, name: &ComponentName) {
        self.components.write().remove(name);
    }

    pub fn status(&self, name: &ComponentName) -> Option<ComponentSnapshot> {
        let components = self.components.read();
        let entry = components.get(name)?;
        let now = self.clock.now();
        Some(entry.record.read().to_snapshot(now, self.clock.epoch_ms()))
    }

    pub fn status_all(&self) -> Vec<ComponentSnapshot> {
        let now = self.clock.now();
        let epoch = self.clock.epoch_ms();
        let components = self.components.read();
        let mut snapshots: Vec<_> =
            components.values().map(|e| e.record.read().to_snapshot(now, epoch)).collect();
        snapshots.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        snapshots
    }

    /// Run one watchdog tick: every registered component's currently
    /// active probe runs concurrently (one task per component per tick).
    /// Returns once every probe has reported and any resulting restart
    /// has been *kicked off* — the restart itself (backoff sleep +
    /// `restart_fn` call) runs detached so a slow restart on one
    /// component never delays the next tick for the others.
    pub async fn tick_once(&self) {
        let entries: Vec<Arc<Entry>> = self.components.read().values().cloned().collect();
        let mut handles = Vec::with_capacity(entries.len());
        for entry in entries {
            let clock = self.clock.clone();
            let cancellation = self.cancellation.clone();
            handles.push(tokio::spawn(async move {
                probe_one(entry, clock, cancellation).await;
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Spawn the periodic watchdog loop. Runs until [`Self::shutdown`] is
    /// called; callers typically `tokio::spawn` this as part of
    /// orchestrator bring-up.
    pub async fn run_watchdog(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick_once().await,
                _ = self.cancellation.cancelled() => return,
            }
        }
    }

    /// Cancel the watchdog loop and any in-flight probe/backoff sleeps
    /// that haven't already passed their cancellation check. Best-effort:
    /// a restart whose `restart_fn` call is already running completes.
    pub fn shutdown(&self) {
        self.cancellation.cancel();
    }
}

async fn probe_one<C: Clock>(entry: Arc<Entry>, clock: C, cancellation: CancellationToken) {
    let active_probe = {
        let record = entry.record.read();
        if record.state.is_terminal() {
            None
        } else if record.startup_complete {
            Some(entry.spec.liveness_probe.clone())
        } else {
            Some(entry.spec.startup_probe.clone())
        }
    };
    let Some(probe) = active_probe else { return };

    let result = tokio::select! {
        r = probe.run() => r,
        _ = cancellation.cancelled() => return,
    };

    let now = clock.now();
    let kickoff = {
        let mut record = entry.record.write();
        match result {
            Ok(()) => {
                record.record_probe_success(now);
                if !record.startup_complete && record.consec_ok >= probe.success_threshold {
                    record.startup_complete = true;
                    record.state = ComponentState::Running;
                    tracing::info!(component = %record.name, "startup probe succeeded, component running");
                }
            }
            Err(e) => {
                record.record_probe_failure(now, e.to_string());
                if record.state == ComponentState::Running
                    && record.consec_fails >= probe.failure_threshold
                {
                    record.state = ComponentState::Unhealthy;
                    tracing::warn!(component = %record.name, error = %e, "liveness probe failed, marking unhealthy");
                }
            }
        }

        match decide_restart_action(&mut record, &entry.spec.restart, now) {
            RestartAction::NoAction => None,
            RestartAction::Fail => {
                record.state = ComponentState::Failed;
                tracing::error!(component = %record.name, "restart budget exceeded, entering Failed");
                None
            }
            RestartAction::Restart => {
                record.state = ComponentState::Restarting;
                Some(entry.spec.restart.backoff_for(record.restart_history.len() as u32))
            }
        }
    };

    if let Some(backoff) = kickoff {
        spawn_restart(entry, clock, cancellation, backoff);
    }
}

/// Pure decision of what the watchdog should do about an `Unhealthy`
/// component, given its current record and restart policy. Mutates the
/// record only to prune `restart_history` as a side effect of reading
/// it, never the state — callers apply the returned action's state
/// transition themselves, keeping this function trivially unit-testable.
pub fn decide_restart_action(
    record: &mut ComponentRecord,
    config: &RestartConfig,
    now: std::time::Instant,
) -> RestartAction {
    if record.state != ComponentState::Unhealthy {
        return RestartAction::NoAction;
    }
    if config.policy == RestartPolicy::Never {
        return RestartAction::NoAction;
    }
    if record.restart_budget_exceeded(now, config) {
        return RestartAction::Fail;
    }
    RestartAction::Restart
}

fn spawn_restart<C: Clock>(entry: Arc<Entry>, clock: C, cancellation: CancellationToken, backoff: Duration) {
    tokio::spawn(async move {
        let _permit = entry.restart_lock.lock().await;

        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            _ = cancellation.cancelled() => return,
        }

        let outcome =
            tokio::time::timeout(Duration::from_secs(30), entry.spec.restart_fn.restart()).await;

        let now = clock.now();
        let mut record = entry.record.write();
        match outcome {
            Ok(Ok(())) => {
                record.record_restart(now);
                tracing::info!(component = %record.name, restart_count = record.restart_count, "component restarted");
            }
            Ok(Err(e)) => {
                record.state = ComponentState::Failed;
                record.last_error = Some(e.clone());
                tracing::error!(component = %record.name, error = %e, "restart failed, entering Failed");
            }
            Err(_) => {
                record.state = ComponentState::Failed;
                record.last_error = Some("restart timed out after 30s".to_string());
                tracing::error!(component = %record.name, "restart timed out, entering Failed");
            }
        }
    });
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
