//! Smoke tests for the CLI's help output — the only interface surface
//! stable enough to assert on without a live backend.

use crate::prelude::IsolatedState;
use assert_cmd::prelude::*;
use predicates::prelude::*;

#[test]
fn top_level_help_lists_the_daemon_subcommand() {
    let state = IsolatedState::new();

    state.stigmer().arg("--help").assert().success().stdout(predicate::str::contains("daemon"));
}

#[test]
fn daemon_help_lists_start_stop_and_status() {
    let state = IsolatedState::new();

    state
        .stigmer()
        .args(["daemon", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("stop"))
        .stdout(predicate::str::contains("status"));
}
