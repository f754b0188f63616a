// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `daemon.lock` acquisition, serializing supervisors across processes.
//! The lock is released automatically when the returned handle is dropped
//! (the OS releases an `flock` when its file descriptor closes), so
//! holding it across every bring-up step is just a matter of keeping the
//! handle alive.

use crate::error::SupervisorError;
use fs2::FileExt;
use std::fs::File;
use std::time::{Duration, Instant};
use stg_core::DataDir;

/// An exclusively-held `daemon.lock`. Dropping this releases the lock.
pub struct DaemonLock {
    _file: File,
}

/// How often to retry a non-blocking lock attempt while polling the
/// caller's deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Acquire `daemon.lock`, blocking up to `deadline`; fails if contention
/// exceeds the deadline. Uses non-truncating open-then-lock so a
/// contending process never sees a truncated file.
pub async fn acquire(data_dir: &DataDir, deadline: Duration) -> Result<DaemonLock, SupervisorError> {
    let file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(data_dir.lock_file())?;

    let start = Instant::now();
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(DaemonLock { _file: file }),
            Err(_) if start.elapsed() >= deadline => return Err(SupervisorError::LockContention),
            Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
