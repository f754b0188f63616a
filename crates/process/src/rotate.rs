// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Default retention when a caller has no configured override.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(7 * 24 * 3600);

/// For each known log base name, if `<base>.log` is non-empty, rename it
/// to `<base>.log.<UTC-timestamp>`; then delete any rotated log older
/// than `retention`. Rotation errors are logged and ignored — they must
/// never block startup.
pub fn rotate_logs(logs_dir: &Path, base_names: &[&str], retention: Duration) {
    let stamp = Utc::now().format("%Y-%m-%d-%H%M%S").to_string();

    for base in base_names {
        let log_path = logs_dir.join(format!("{base}.log"));
        match std::fs::metadata(&log_path) {
            Ok(meta) if meta.len() > 0 => {
                let rotated = logs_dir.join(format!("{base}.log.{stamp}"));
                if let Err(e) = std::fs::rename(&log_path, &rotated) {
                    tracing::warn!(base, error = %e, "failed to rotate log, leaving in place");
                }
            }
            Ok(_) => {} // empty, nothing to rotate
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(base, error = %e, "failed to stat log for rotation"),
        }
    }

    prune_old_rotated_logs(logs_dir, retention);
}

fn prune_old_rotated_logs(logs_dir: &Path, retention: Duration) {
    let entries = match std::fs::read_dir(logs_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "failed to list logs dir for pruning");
            return;
        }
    };

    let now = SystemTime::now();
    for entry in entries.flatten() {
        let path = entry.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        // Rotated files look like `<base>.log.<stamp>`; a bare `<base>.log`
        // or `<base>.err` is the active file and is never pruned here.
        if !is_rotated(name) {
            continue;
        }
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };
        let age = now.duration_since(modified).unwrap_or_default();
        if age > retention {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(file = name, error = %e, "failed to prune rotated log");
            }
        }
    }
}

fn is_rotated(name: &str) -> bool {
    name.contains(".log.")
}

#[cfg(test)]
#[path = "rotate_tests.rs"]
mod tests;
