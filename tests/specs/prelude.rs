//! Shared scaffolding for the root integration specs.

use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated `STIGMER_STATE_DIR`, torn down with the `TempDir`.
pub struct IsolatedState {
    pub dir: TempDir,
}

impl IsolatedState {
    pub fn new() -> Self {
        Self { dir: TempDir::new().expect("tempdir") }
    }

    /// A `stigmer` subprocess pointed at this isolated state directory.
    pub fn stigmer(&self) -> Command {
        let mut cmd = Command::cargo_bin("stigmer").expect("stigmer binary");
        cmd.env("STIGMER_STATE_DIR", self.dir.path());
        cmd
    }
}
