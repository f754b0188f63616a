// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

/// Write a fresh PID file. Every spawn writes this before detaching;
/// inability to write it kills the just-spawned child.
pub fn write_pid_file(path: &Path, pid: u32) -> std::io::Result<()> {
    std::fs::write(path, format!("{pid}\n"))
}

/// Read a PID file, if present. Returns `Ok(None)` when the file does
/// not exist rather than an error — a missing PID file is not a failure
/// condition for any caller in this crate.
pub fn read_pid_file(path: &Path) -> std::io::Result<Option<i32>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(contents.trim().parse::<i32>().ok()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn remove_pid_file(path: &Path) {
    let _ = std::fs::remove_file(path);
}
