// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only builders and proptest strategies shared across the
//! workspace's other crates. Gated behind `test-support` so downstream
//! crates can pull these in without dragging `proptest` into a release
//! build.

use crate::paths::DataDir;
use tempfile::TempDir;

/// A [`DataDir`] rooted at a freshly created temp directory, with every
/// fixed subdirectory already created. Keeping the `TempDir` alive
/// alongside the `DataDir` is the caller's responsibility; dropping it
/// deletes the directory.
pub fn temp_data_dir() -> (TempDir, DataDir) {
    let tmp = TempDir::new().expect("create temp dir for test data dir");
    let dd = DataDir::at(tmp.path());
    dd.ensure_exists().expect("create fixed subdirectories");
    (tmp, dd)
}

#[cfg(feature = "test-support")]
pub mod strategies {
    use proptest::prelude::*;
    use std::time::Duration;

    /// Arbitrary small backoff-like durations, used by `stg-health`'s
    /// backoff monotonicity property test.
    pub fn small_duration() -> impl Strategy<Value = Duration> {
        (0u64..120_000).prop_map(Duration::from_millis)
    }
}
