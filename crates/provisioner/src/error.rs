// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("failed to extract companion binaries: {0}")]
    ExtractionFailed(String),

    #[error("failed to download companion binary {name}: {source}")]
    DownloadFailed { name: String, source: String },

    #[error("downloaded archive for {0} failed verification")]
    VerificationFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
