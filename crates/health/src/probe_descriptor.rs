// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use stg_probe::ProbeError;

/// A single bounded probe, e.g. `all([alive(pid), grpc_reachable(addr)])`
/// composed ahead of time and handed to the supervisor as one check.
#[async_trait]
pub trait ProbeCheck: Send + Sync {
    async fn check(&self) -> Result<(), ProbeError>;
}

#[async_trait]
impl<F, Fut> ProbeCheck for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<(), ProbeError>> + Send,
{
    async fn check(&self) -> Result<(), ProbeError> {
        (self)().await
    }
}

/// `{checkFn, interval, timeout, failureThreshold, successThreshold}`.
/// One descriptor for the startup phase, one for the liveness phase; the
/// watchdog runs whichever is currently active.
#[derive(Clone)]
pub struct ProbeDescriptor {
    pub check: Arc<dyn ProbeCheck>,
    pub interval: Duration,
    pub timeout: Duration,
    pub failure_threshold: u32,
    pub success_threshold: u32,
}

impl ProbeDescriptor {
    pub fn new(check: impl ProbeCheck + 'static) -> Self {
        Self {
            check: Arc::new(check),
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(5),
            failure_threshold: 3,
            success_threshold: 1,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    pub async fn run(&self) -> Result<(), ProbeError> {
        match tokio::time::timeout(self.timeout, self.check.check()).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::TimedOut(self.timeout)),
        }
    }
}
