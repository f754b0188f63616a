// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fallback HTTP download of a companion binary that is neither embedded
//! nor already extracted, from a versioned release archive.

use crate::{ProvisionError, DEFAULT_RELEASE_BASE};
use flate2::read::GzDecoder;
use stg_core::platform::Platform;
use std::io::Cursor;
use std::path::Path;

/// Env var overriding the release base URL, for internal mirrors and
/// tests that point at a local fixture server.
pub const RELEASE_BASE_ENV: &str = "STIGMER_RELEASE_BASE";

fn release_base() -> String {
    std::env::var(RELEASE_BASE_ENV).unwrap_or_else(|_| DEFAULT_RELEASE_BASE.to_string())
}

/// Download `<release-base>/<version>/<platform>/<name>.tar.gz`, extract
/// the single executable entry matching `name`, and write it into
/// `bin_dir` via a tmp-then-rename, mode 0755.
pub async fn download_binary(bin_dir: &Path, platform: &Platform, name: &str) -> Result<(), ProvisionError> {
    let url = format!(
        "{}/{}/{}/{}.tar.gz",
        release_base(),
        platform.version,
        platform.release_segment(),
        name
    );

    tracing::info!(%url, binary = name, "downloading companion binary");

    let response = reqwest::get(&url).await.map_err(|e| ProvisionError::DownloadFailed {
        name: name.to_string(),
        source: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(ProvisionError::DownloadFailed {
            name: name.to_string(),
            source: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| ProvisionError::DownloadFailed {
        name: name.to_string(),
        source: e.to_string(),
    })?;

    let decoder = GzDecoder::new(Cursor::new(bytes));
    let mut archive = tar::Archive::new(decoder);

    let tmp_path = bin_dir.join(format!(".{name}.download"));
    let final_path = bin_dir.join(name);
    let mut found = false;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();
        if entry_path.file_name().and_then(|n| n.to_str()) == Some(name) {
            let mut out = std::fs::File::create(&tmp_path)?;
            std::io::copy(&mut entry, &mut out)?;
            found = true;
            break;
        }
    }

    if !found {
        return Err(ProvisionError::VerificationFailed(name.to_string()));
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
