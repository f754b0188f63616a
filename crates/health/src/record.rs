// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-component record: the mutable state the watchdog owns and mutates
//! under a per-component lock, plus the serializable snapshot handed out
//! to status callers.

use crate::policy::RestartConfig;
use crate::state::ComponentState;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use stg_core::id::ComponentKind;
use stg_core::ComponentName;

/// Per-component state the watchdog owns. Timestamps are `Instant`s
/// driven by the supervisor's [`stg_core::Clock`], not wall-clock
/// `SystemTime`, so tests can advance time deterministically.
#[derive(Debug, Clone)]
pub struct ComponentRecord {
    pub name: ComponentName,
    pub kind: ComponentKind,
    pub state: ComponentState,
    pub start_time: Instant,
    pub last_probe_at: Option<Instant>,
    pub consec_fails: u32,
    pub consec_ok: u32,
    pub restart_count: u32,
    pub last_restart: Option<Instant>,
    /// Bounded to the sliding rate window; pruned on every read, never
    /// reset: history is pruned on every read but never cleared wholesale.
    pub restart_history: VecDeque<Instant>,
    pub last_error: Option<String>,
    /// Whether the startup probe has reached `successThreshold` consecutive
    /// passes yet; while `false` the watchdog runs the startup probe,
    /// otherwise the liveness probe.
    pub startup_complete: bool,
}

impl ComponentRecord {
    pub fn new(name: ComponentName, kind: ComponentKind, now: Instant) -> Self {
        Self {
            name,
            kind,
            state: ComponentState::Starting,
            start_time: now,
            last_probe_at: None,
            consec_fails: 0,
            consec_ok: 0,
            restart_count: 0,
            last_restart: None,
            restart_history: VecDeque::new(),
            last_error: None,
            startup_complete: false,
        }
    }

    /// Drop restart history entries older than `rate_window` relative to
    /// `now`. Called on every read.
    pub fn prune_restart_history(&mut self, now: Instant, rate_window: Duration) {
        while let Some(&oldest) = self.restart_history.front() {
            if now.saturating_duration_since(oldest) > rate_window {
                self.restart_history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Whether the restart-rate budget is already exhausted, pruning
    /// first. Must be checked *before* a restart attempt starts.
    pub fn restart_budget_exceeded(&mut self, now: Instant, config: &RestartConfig) -> bool {
        self.prune_restart_history(now, config.rate_window);
        self.restart_history.len() as u32 >= config.max_restarts
    }

    pub fn record_probe_success(&mut self, now: Instant) {
        self.last_probe_at = Some(now);
        self.consec_ok += 1;
        self.consec_fails = 0;
        self.last_error = None;
    }

    pub fn record_probe_failure(&mut self, now: Instant, error: String) {
        self.last_probe_at = Some(now);
        self.consec_fails += 1;
        self.consec_ok = 0;
        self.last_error = Some(error);
    }

    /// Apply a successful restart: reset probe counters, mark startup
    /// incomplete again, and append to the (never-reset) restart history.
    pub fn record_restart(&mut self, now: Instant) {
        self.restart_count += 1;
        self.last_restart = Some(now);
        self.restart_history.push_back(now);
        self.consec_ok = 0;
        self.consec_fails = 0;
        self.startup_complete = false;
        self.start_time = now;
        self.state = ComponentState::Starting;
    }

    pub fn to_snapshot(&self, now: Instant, epoch_ms_now: u64) -> ComponentSnapshot {
        ComponentSnapshot {
            name: self.name.clone(),
            kind: self.kind,
            state: self.state,
            uptime_secs: now.saturating_duration_since(self.start_time).as_secs(),
            consec_fails: self.consec_fails,
            consec_ok: self.consec_ok,
            restart_count: self.restart_count,
            last_error: self.last_error.clone(),
            observed_at_epoch_ms: epoch_ms_now,
        }
    }
}

/// Serializable, user-facing snapshot of one component's status: name,
/// the last probe error, and the current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    pub name: ComponentName,
    pub kind: ComponentKind,
    pub state: ComponentState,
    pub uptime_secs: u64,
    pub consec_fails: u32,
    pub consec_ok: u32,
    pub restart_count: u32,
    pub last_error: Option<String>,
    pub observed_at_epoch_ms: u64,
}

/// Same shape as [`ComponentSnapshot`], named separately for callers (the
/// orchestrator's `status()`) where "status" rather than "point-in-time
/// internal sample" is the clearer name.
pub type ComponentStatus = ComponentSnapshot;

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_history_ages(ages: &[Duration]) -> (ComponentRecord, Instant) {
        let now = Instant::now() + Duration::from_secs(365 * 24 * 3600);
        let mut record = ComponentRecord::new(ComponentName::new("x"), ComponentKind::ApiServer, now);
        for age in ages {
            record.restart_history.push_back(now - *age);
        }
        (record, now)
    }

    proptest::proptest! {
        /// For an arbitrary set of ages and an arbitrary window, every
        /// surviving entry must be within the window and every pruned
        /// entry must have been outside it.
        #[test]
        fn prune_restart_history_keeps_exactly_the_entries_within_the_window(
            ages in proptest::collection::vec(0u64..600_000, 0..20),
            window_ms in 1u64..600_000,
        ) {
            // `restart_history` is always populated in chronological order
            // (oldest at the front, ages decreasing towards the back) —
            // sort descending so this synthetic history respects the same
            // invariant `prune_restart_history`'s front-pop loop relies on.
            let mut ages: Vec<Duration> = ages.into_iter().map(Duration::from_millis).collect();
            ages.sort_by(|a, b| b.cmp(a));
            let window = Duration::from_millis(window_ms);
            let (mut record, now) = record_with_history_ages(&ages);

            record.prune_restart_history(now, window);

            let expected_survivors = ages.iter().filter(|age| **age <= window).count();
            proptest::prop_assert_eq!(record.restart_history.len(), expected_survivors);
            for entry in &record.restart_history {
                proptest::prop_assert!(now.saturating_duration_since(*entry) <= window);
            }
        }
    }
}
