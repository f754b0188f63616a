// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error building blocks shared by every supervisor layer crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("could not determine the current user's home directory")]
    NoHomeDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
