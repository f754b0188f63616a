// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Binary Provisioner (L2): guarantees that, for the current platform
//! and build version, the companion executables are present, executable,
//! and match the shipped build.

mod download;
mod embed;
mod error;
mod extract;

pub use error::ProvisionError;

use stg_core::{platform::Platform, DataDir};
use std::path::PathBuf;

/// The companion binaries this supervisor requires at each bring-up.
pub const REQUIRED_BINARIES: &[&str] = &["stigmer-api-server", "stigmer-worker"];

/// Base URL template for the fallback download:
/// `<release-base>/<version>/<platform>/<name>`. Overridable via
/// `STIGMER_RELEASE_BASE` for internal mirrors and tests.
pub const DEFAULT_RELEASE_BASE: &str = "https://releases.stigmer.dev";

/// Absolute paths of each required binary, returned once provisioning
/// has guaranteed they exist and are executable.
#[derive(Debug, Clone)]
pub struct Binaries {
    pub api_server: PathBuf,
    pub worker: PathBuf,
}

impl Binaries {
    fn from_bin_dir(bin_dir: &std::path::Path) -> Self {
        Self {
            api_server: bin_dir.join("stigmer-api-server"),
            worker: bin_dir.join("stigmer-worker"),
        }
    }
}

/// Entry point: ensure the companion binaries are present and up to
/// date, re-extracting or downloading as needed, then return their
/// paths.
pub async fn ensure_binaries(data_dir: &DataDir, platform: &Platform) -> Result<Binaries, ProvisionError> {
    if !platform.is_supported() {
        return Err(ProvisionError::UnsupportedPlatform(platform.to_string()));
    }

    if needs_extraction(data_dir, platform)? {
        extract::extract_all(data_dir, platform).await?;
    }

    let bin_dir = data_dir.bin_dir();
    for name in REQUIRED_BINARIES {
        let path = bin_dir.join(name);
        if !path.exists() {
            download::download_binary(&bin_dir, platform, name).await?;
        }
    }

    Ok(Binaries::from_bin_dir(&bin_dir))
}

/// Compare the `.version` marker against the current build version;
/// absent, mismatched, or any required binary missing schedules
/// re-extraction. `dev` builds always need extraction.
pub fn needs_extraction(data_dir: &DataDir, platform: &Platform) -> Result<bool, ProvisionError> {
    if platform.is_dev() {
        return Ok(true);
    }

    let marker = data_dir.version_marker();
    let marker_version = match std::fs::read_to_string(&marker) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e.into()),
    };

    if marker_version.trim() != platform.version {
        return Ok(true);
    }

    for name in REQUIRED_BINARIES {
        if embed::get(name).is_some() && !data_dir.bin_dir().join(name).exists() {
            return Ok(true);
        }
    }

    Ok(false)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
