// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform identity used by the Binary Provisioner to key its cache and
//! decide whether extracted companion binaries match the running build.

use std::fmt;

/// The running build's version, as embedded at compile time.
///
/// `dev` is a sentinel, not a version: the provisioner re-extracts on
/// every call when it sees this value (see `stg-provisioner`).
pub const BUILD_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

/// Sentinel build version that forces unconditional re-extraction.
pub const DEV_SENTINEL: &str = "dev";

/// `{os, arch, version}` triple that drives the provisioner's cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
    pub version: String,
}

impl Platform {
    /// The platform of the binary currently executing.
    pub fn current() -> Self {
        Self { os: std::env::consts::OS, arch: std::env::consts::ARCH, version: BUILD_VERSION.to_string() }
    }

    /// Platform with an explicit version override, used by tests that
    /// simulate a version upgrade without rebuilding.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self { os: std::env::consts::OS, arch: std::env::consts::ARCH, version: version.into() }
    }

    /// Whether this platform is one the provisioner knows how to serve a
    /// companion binary for. Kept intentionally narrow: the two embedded
    /// binaries only ship for the platforms CI actually produces them for.
    pub fn is_supported(&self) -> bool {
        matches!(
            (self.os, self.arch),
            ("macos", "aarch64")
                | ("macos", "x86_64")
                | ("linux", "x86_64")
                | ("linux", "aarch64")
                | ("windows", "x86_64")
        )
    }

    /// `dev` builds force re-extraction every call.
    pub fn is_dev(&self) -> bool {
        self.version == DEV_SENTINEL
    }

    /// The path segment this platform maps to in the release URL
    /// (`<release-base>/<version>/<platform>/<name>`).
    pub fn release_segment(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}@{}", self.os, self.arch, self.version)
    }
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
