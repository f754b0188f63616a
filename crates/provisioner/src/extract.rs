// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::{embed, ProvisionError, REQUIRED_BINARIES};
use stg_core::{platform::Platform, DataDir};
use std::path::Path;

/// Remove `bin/` atomically (rename-to-sibling, then delete), recreate
/// it, write each embedded blob with mode 0755, `fsync` the directory,
/// write a new `.version` marker.
pub async fn extract_all(data_dir: &DataDir, platform: &Platform) -> Result<(), ProvisionError> {
    let bin_dir = data_dir.bin_dir();

    if bin_dir.exists() {
        let sibling = sibling_path(&bin_dir);
        std::fs::rename(&bin_dir, &sibling)
            .map_err(|e| ProvisionError::ExtractionFailed(format!("rename bin/ aside: {e}")))?;
        std::fs::remove_dir_all(&sibling)
            .map_err(|e| ProvisionError::ExtractionFailed(format!("remove old bin/: {e}")))?;
    }
    std::fs::create_dir_all(&bin_dir)?;

    for name in REQUIRED_BINARIES {
        if let Some(bytes) = embed::get(name) {
            write_binary(&bin_dir.join(name), &bytes)?;
        } else {
            // Not embedded for this build: `ensure_binaries` falls
            // through to the download fallback once it notices the
            // file is still missing after extraction.
            tracing::debug!(binary = name, "no embedded blob for this build");
        }
    }

    fsync_dir(&bin_dir)?;

    let marker = data_dir.version_marker();
    std::fs::write(&marker, format!("{}\n", platform.version))?;

    Ok(())
}

fn write_binary(path: &Path, bytes: &[u8]) -> Result<(), ProvisionError> {
    std::fs::write(path, bytes)?;
    set_executable(path)?;
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

fn sibling_path(bin_dir: &Path) -> std::path::PathBuf {
    let mut name = bin_dir.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".old");
    bin_dir.with_file_name(name)
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
