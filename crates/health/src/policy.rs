// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When the Health Supervisor should attempt to restart an unhealthy
/// component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    Always,
    OnFailure,
    Never,
}

/// Restart policy knobs, defaulting to `{always, 10, 10 min, 10 s, 1 s,
/// 60 s, 2.0}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestartConfig {
    pub policy: RestartPolicy,
    pub max_restarts: u32,
    pub rate_window: Duration,
    pub min_uptime: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            policy: RestartPolicy::Always,
            max_restarts: 10,
            rate_window: Duration::from_secs(10 * 60),
            min_uptime: Duration::from_secs(10),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RestartConfig {
    /// `min(maxBackoff, initialBackoff × multiplier^(k−1))` where `k` is
    /// the current entry count in the (already-pruned) restart history.
    /// `k == 0` (no restarts yet) still yields `initialBackoff`, matching
    /// the first restart attempt.
    pub fn backoff_for(&self, restart_history_len: u32) -> Duration {
        let k = restart_history_len.max(1);
        let multiplier = self.backoff_multiplier.powi((k - 1) as i32);
        let scaled = self.initial_backoff.mul_f64(multiplier);
        scaled.min(self.max_backoff)
    }
}

/// What the watchdog decided to do after observing a probe result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartAction {
    NoAction,
    Restart,
    Fail,
}
