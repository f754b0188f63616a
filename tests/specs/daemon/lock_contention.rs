//! `daemon.lock` contention: a second supervisor invocation against an
//! already-locked data directory fails fast with the matching exit code
//! instead of blocking for the full deadline.

use crate::prelude::IsolatedState;
use assert_cmd::prelude::*;
use fs2::FileExt;
use std::fs::OpenOptions;

#[test]
#[serial_test::serial]
fn start_against_an_already_locked_data_dir_exits_with_lock_contention() {
    let state = IsolatedState::new();

    let lock_path = state.dir.path().join("daemon.lock");
    let lock_file =
        OpenOptions::new().write(true).create(true).truncate(false).open(&lock_path).expect("open lock file");
    lock_file.lock_exclusive().expect("hold the lock for the duration of the test");

    let config_path = state.dir.path().join("supervisor.toml");
    std::fs::write(&config_path, "lock_wait = { secs = 1, nanos = 0 }\n").expect("write config");

    state.stigmer().args(["daemon", "start", "--config"]).arg(&config_path).assert().code(12);

    lock_file.unlock().expect("release lock");
}
