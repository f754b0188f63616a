// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process Probe (L1): pure, side-effect-free-except-observation checks,
//! each composable into larger checks via [`all`].

mod checks;
mod error;

pub use checks::{
    alive, all, container_healthy, container_running, grpc_reachable, tcp_listening,
    uptime_at_least, ProbeFuture,
};
pub use error::ProbeError;
