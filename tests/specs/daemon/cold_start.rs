//! Stateless status/stop reconstruction on a data directory that has
//! never been touched by `ensure_running`.

use crate::prelude::IsolatedState;
use assert_cmd::prelude::*;
use predicates::prelude::*;

#[test]
fn status_on_a_cold_data_dir_exits_not_running() {
    let state = IsolatedState::new();

    state
        .stigmer()
        .args(["daemon", "status"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("no supervised components are running"));
}

#[test]
fn stop_on_a_cold_data_dir_is_a_noop() {
    let state = IsolatedState::new();

    state
        .stigmer()
        .args(["daemon", "stop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backend stopped"));
}

#[test]
fn status_json_on_a_cold_data_dir_still_exits_not_running() {
    let state = IsolatedState::new();

    state.stigmer().args(["daemon", "status", "--json"]).assert().code(11);
}
