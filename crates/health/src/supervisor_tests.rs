// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::policy::RestartConfig;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use stg_core::FakeClock;
use stg_probe::ProbeError;

fn always_ok() -> ProbeDescriptor {
    ProbeDescriptor::new(|| async { Ok::<(), ProbeError>(()) })
        .with_success_threshold(1)
        .with_timeout(Duration::from_millis(50))
}

fn flag_controlled(flag: Arc<AtomicBool>) -> ProbeDescriptor {
    ProbeDescriptor::new(move || {
        let flag = flag.clone();
        async move {
            if flag.load(Ordering::SeqCst) {
                Ok::<(), ProbeError>(())
            } else {
                Err(ProbeError::NotAlive(0))
            }
        }
    })
    .with_failure_threshold(1)
    .with_success_threshold(1)
    .with_timeout(Duration::from_millis(50))
}

fn fast_restart_config() -> RestartConfig {
    RestartConfig {
        policy: RestartPolicy::Always,
        max_restarts: 3,
        rate_window: Duration::from_secs(60),
        min_uptime: Duration::from_secs(0),
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        backoff_multiplier: 2.0,
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn startup_probe_success_transitions_to_running() {
    let supervisor = HealthSupervisor::with_clock(FakeClock::new());
    let always_succeeding = Arc::new(|| async { Ok::<(), String>(()) });
    supervisor.register(ComponentSpec {
        name: ComponentName::new("api-server"),
        kind: ComponentKind::ApiServer,
        startup_probe: always_ok(),
        liveness_probe: always_ok(),
        readiness_probe: None,
        restart: fast_restart_config(),
        restart_fn: always_succeeding,
    });

    supervisor.tick_once().await;

    let status = supervisor.status(&ComponentName::new("api-server")).expect("registered");
    assert_eq!(status.state, ComponentState::Running);
}

#[tokio::test]
async fn liveness_failure_marks_unhealthy_and_restarts() {
    let name = ComponentName::new("workflow-worker");
    let supervisor = HealthSupervisor::with_clock(FakeClock::new());
    let alive = Arc::new(AtomicBool::new(true));
    let restart_calls = Arc::new(AtomicU32::new(0));
    let restart_calls_clone = restart_calls.clone();
    let alive_for_restart = alive.clone();
    let restart_fn = Arc::new(move || {
        restart_calls_clone.fetch_add(1, Ordering::SeqCst);
        alive_for_restart.store(true, Ordering::SeqCst);
        async { Ok::<(), String>(()) }
    });

    supervisor.register(ComponentSpec {
        name: name.clone(),
        kind: ComponentKind::WorkflowWorker,
        startup_probe: always_ok(),
        liveness_probe: flag_controlled(alive.clone()),
        readiness_probe: None,
        restart: fast_restart_config(),
        restart_fn,
    });

    // First tick: startup probe succeeds, component becomes Running.
    supervisor.tick_once().await;
    assert_eq!(supervisor.status(&name).unwrap().state, ComponentState::Running);

    // Flip the liveness probe to failing and tick again.
    alive.store(false, Ordering::SeqCst);
    supervisor.tick_once().await;
    settle().await;

    let status = supervisor.status(&name).unwrap();
    assert_eq!(status.restart_count, 1, "one restart should have been kicked off and completed");
    assert_eq!(restart_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn crash_loop_trips_restart_budget_and_enters_failed() {
    let name = ComponentName::new("agent-container");
    let supervisor = HealthSupervisor::with_clock(FakeClock::new());
    // Liveness probe always fails: this component never stays healthy,
    // tripping the restart-rate budget tick after tick.
    let always_failing = ProbeDescriptor::new(|| async { Err(ProbeError::NotAlive(0)) })
        .with_failure_threshold(1)
        .with_timeout(Duration::from_millis(50));
    let restart_calls = Arc::new(AtomicU32::new(0));
    let restart_calls_clone = restart_calls.clone();
    let restart_fn = Arc::new(move || {
        restart_calls_clone.fetch_add(1, Ordering::SeqCst);
        async { Ok::<(), String>(()) }
    });

    supervisor.register(ComponentSpec {
        name: name.clone(),
        kind: ComponentKind::AgentContainer,
        startup_probe: always_ok(),
        liveness_probe: always_failing,
        readiness_probe: None,
        restart: fast_restart_config(), // max_restarts = 3
        restart_fn,
    });

    // Startup succeeds -> Running.
    supervisor.tick_once().await;
    assert_eq!(supervisor.status(&name).unwrap().state, ComponentState::Running);

    // Each subsequent tick: Running -> Unhealthy -> Restarting -> (restart
    // succeeds) -> Starting -> (startup probe is the always-failing one
    // too on this spec, so it never reaches Running again — but that's
    // fine, the budget check only cares about Unhealthy transitions,
    // which require Running first). Use a fresh startup probe stand-in:
    // re-register is unnecessary since startup_probe is `always_ok`, so
    // after a restart the component returns to Running on the very next
    // tick, then fails liveness again on the tick after.
    for _ in 0..8 {
        supervisor.tick_once().await;
        settle().await;
    }

    let status = supervisor.status(&name).unwrap();
    assert_eq!(status.state, ComponentState::Failed);
    assert_eq!(status.restart_count, 3, "exactly max_restarts restarts before Failed");
    assert_eq!(restart_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failed_is_terminal_until_explicit_stop_and_register() {
    let name = ComponentName::new("workflow-engine");
    let supervisor = HealthSupervisor::with_clock(FakeClock::new());
    let always_failing = ProbeDescriptor::new(|| async { Err(ProbeError::NotAlive(0)) })
        .with_failure_threshold(1)
        .with_timeout(Duration::from_millis(50));
    let restart_fn = Arc::new(|| async { Err::<(), String>("boom".to_string()) });

    supervisor.register(ComponentSpec {
        name: name.clone(),
        kind: ComponentKind::WorkflowEngine,
        startup_probe: always_ok(),
        liveness_probe: always_failing,
        readiness_probe: None,
        restart: fast_restart_config(),
        restart_fn,
    });

    supervisor.tick_once().await; // -> Running
    supervisor.tick_once().await; // -> Unhealthy -> Restarting
    settle().await; // restart_fn fails -> Failed

    assert_eq!(supervisor.status(&name).unwrap().state, ComponentState::Failed);

    // Further ticks must not change anything: Failed is terminal.
    for _ in 0..3 {
        supervisor.tick_once().await;
        settle().await;
    }
    assert_eq!(supervisor.status(&name).unwrap().state, ComponentState::Failed);

    // Explicit stop + register cycle is the only way out.
    supervisor.unregister(&name);
    assert!(supervisor.status(&name).is_none());
    supervisor.register(ComponentSpec {
        name: name.clone(),
        kind: ComponentKind::WorkflowEngine,
        startup_probe: always_ok(),
        liveness_probe: always_ok(),
        readiness_probe: None,
        restart: fast_restart_config(),
        restart_fn: Arc::new(|| async { Ok(()) }),
    });
    assert_eq!(supervisor.status(&name).unwrap().state, ComponentState::Starting);
}

#[tokio::test]
async fn restart_policy_never_leaves_component_unhealthy() {
    let name = ComponentName::new("api-server");
    let supervisor = HealthSupervisor::with_clock(FakeClock::new());
    let always_failing = ProbeDescriptor::new(|| async { Err(ProbeError::NotAlive(0)) })
        .with_failure_threshold(1)
        .with_timeout(Duration::from_millis(50));
    let restart_calls = Arc::new(AtomicU32::new(0));
    let restart_calls_clone = restart_calls.clone();
    let restart_fn = Arc::new(move || {
        restart_calls_clone.fetch_add(1, Ordering::SeqCst);
        async { Ok::<(), String>(()) }
    });

    let mut restart = fast_restart_config();
    restart.policy = RestartPolicy::Never;

    supervisor.register(ComponentSpec {
        name: name.clone(),
        kind: ComponentKind::ApiServer,
        startup_probe: always_ok(),
        liveness_probe: always_failing,
        readiness_probe: None,
        restart,
        restart_fn,
    });

    supervisor.tick_once().await; // -> Running
    supervisor.tick_once().await; // -> Unhealthy, but policy is Never
    settle().await;

    assert_eq!(supervisor.status(&name).unwrap().state, ComponentState::Unhealthy);
    assert_eq!(restart_calls.load(Ordering::SeqCst), 0, "Never policy must not restart");
}

#[yare::parameterized(
    always_on_unhealthy = { RestartPolicy::Always, ComponentState::Unhealthy, RestartAction::Restart },
    on_failure_on_unhealthy = { RestartPolicy::OnFailure, ComponentState::Unhealthy, RestartAction::Restart },
    never_on_unhealthy = { RestartPolicy::Never, ComponentState::Unhealthy, RestartAction::NoAction },
    always_on_running = { RestartPolicy::Always, ComponentState::Running, RestartAction::NoAction },
    always_on_starting = { RestartPolicy::Always, ComponentState::Starting, RestartAction::NoAction },
    always_on_failed = { RestartPolicy::Always, ComponentState::Failed, RestartAction::NoAction },
)]
fn decide_restart_action_follows_policy_and_state(
    policy: RestartPolicy,
    state: ComponentState,
    expected: RestartAction,
) {
    let clock = FakeClock::new();
    let mut record =
        ComponentRecord::new(ComponentName::new("api-server"), ComponentKind::ApiServer, clock.now());
    record.state = state;
    let config = RestartConfig { policy, ..fast_restart_config() };

    assert_eq!(decide_restart_action(&mut record, &config, clock.now()), expected);
}

#[test]
fn decide_restart_action_prunes_history_older_than_rate_window() {
    let clock = FakeClock::new();
    let mut record = ComponentRecord::new(
        ComponentName::new("api-server"),
        ComponentKind::ApiServer,
        clock.now(),
    );
    record.state = ComponentState::Unhealthy;
    let config = RestartConfig { max_restarts: 1, rate_window: Duration::from_secs(60), ..fast_restart_config() };

    record.restart_history.push_back(clock.now());
    clock.advance(Duration::from_secs(120));

    let action = decide_restart_action(&mut record, &config, clock.now());
    assert_eq!(action, RestartAction::Restart, "stale history entry should have been pruned");
    assert!(record.restart_history.is_empty());
}
