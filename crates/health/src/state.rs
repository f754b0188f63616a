// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-component state machine:
///
/// ```text
///            register()
/// Stopped ─────────────► Starting
///   ▲                       │ startup probe OK (successThreshold consec.)
///   │                       ▼
///   │                    Running
///   │                       │ liveness probe FAIL (failureThreshold consec.)
///   │                       ▼
///   │                   Unhealthy
///   │                       │ backoff + restart()
///   │                       ▼
///   │                   Restarting
///   │      restart OK ──────┤──── restart limit exceeded ──► Failed
///   │                       ▼
///   └──── stop() ──────── Starting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    Stopped,
    Starting,
    Running,
    Unhealthy,
    Restarting,
    Failed,
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentState::Stopped => "stopped",
            ComponentState::Starting => "starting",
            ComponentState::Running => "running",
            ComponentState::Unhealthy => "unhealthy",
            ComponentState::Restarting => "restarting",
            ComponentState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl ComponentState {
    /// A component in `Failed` is never auto-restarted; only an explicit
    /// stop + register cycle moves it out.
    pub fn is_terminal(self) -> bool {
        matches!(self, ComponentState::Failed)
    }
}
