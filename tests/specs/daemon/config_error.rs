//! A `--config` path that cannot be read surfaces as a typed config
//! error, with the matching exit code from the taxonomy.

use crate::prelude::IsolatedState;
use assert_cmd::prelude::*;

#[test]
fn missing_config_file_exits_with_the_config_error_code() {
    let state = IsolatedState::new();
    let missing = state.dir.path().join("nonexistent-supervisor.toml");

    state
        .stigmer()
        .args(["daemon", "status", "--config"])
        .arg(&missing)
        .assert()
        .code(20);
}
