// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Managed workflow engine install. Unlike the two companion binaries in
//! `stg-provisioner`, the engine is never embedded
//! — it is always fetched from the same versioned release archive shape
//! the provisioner's download fallback uses, mirrored here since the
//! engine is not one of `stg_provisioner::REQUIRED_BINARIES`.

use crate::error::SupervisorError;
use flate2::read::GzDecoder;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use stg_core::platform::Platform;
use stg_provisioner::{ProvisionError, DEFAULT_RELEASE_BASE};

pub const ENGINE_BINARY_NAME: &str = "stigmer-engine";
const RELEASE_BASE_ENV: &str = "STIGMER_RELEASE_BASE";

fn release_base() -> String {
    std::env::var(RELEASE_BASE_ENV).unwrap_or_else(|_| DEFAULT_RELEASE_BASE.to_string())
}

/// Ensure the engine binary exists in `bin_dir`, downloading it if not.
/// Returns its path.
pub async fn ensure_engine_binary(bin_dir: &Path, platform: &Platform) -> Result<PathBuf, SupervisorError> {
    let path = bin_dir.join(ENGINE_BINARY_NAME);
    if path.exists() {
        return Ok(path);
    }
    download_engine(bin_dir, platform).await?;
    Ok(path)
}

async fn download_engine(bin_dir: &Path, platform: &Platform) -> Result<(), SupervisorError> {
    let url =
        format!("{}/{}/{}/{}.tar.gz", release_base(), platform.version, platform.release_segment(), ENGINE_BINARY_NAME);

    tracing::info!(%url, "downloading workflow engine binary");

    let response = reqwest::get(&url).await.map_err(|e| {
        SupervisorError::Provision(ProvisionError::DownloadFailed {
            name: ENGINE_BINARY_NAME.to_string(),
            source: e.to_string(),
        })
    })?;

    if !response.status().is_success() {
        return Err(SupervisorError::Provision(ProvisionError::DownloadFailed {
            name: ENGINE_BINARY_NAME.to_string(),
            source: format!("HTTP {}", response.status()),
        }));
    }

    let bytes = response.bytes().await.map_err(|e| {
        SupervisorError::Provision(ProvisionError::DownloadFailed {
            name: ENGINE_BINARY_NAME.to_string(),
            source: e.to_string(),
        })
    })?;

    let decoder = GzDecoder::new(Cursor::new(bytes));
    let mut archive = tar::Archive::new(decoder);

    let tmp_path = bin_dir.join(format!(".{ENGINE_BINARY_NAME}.download"));
    let final_path = bin_dir.join(ENGINE_BINARY_NAME);
    let mut found = false;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();
        if entry_path.file_name().and_then(|n| n.to_str()) == Some(ENGINE_BINARY_NAME) {
            let mut out = std::fs::File::create(&tmp_path)?;
            std::io::copy(&mut entry, &mut out)?;
            found = true;
            break;
        }
    }

    if !found {
        return Err(SupervisorError::Provision(ProvisionError::VerificationFailed(ENGINE_BINARY_NAME.to_string())));
    }

    set_executable(&tmp_path)?;
    std::fs::rename(&tmp_path, &final_path)?;
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
