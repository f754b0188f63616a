// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two companion binaries, embedded into this crate at compile time.

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "companion-bin/"]
pub struct CompanionAssets;

/// Look up an embedded companion binary's bytes by its target filename.
pub fn get(name: &str) -> Option<std::borrow::Cow<'static, [u8]>> {
    CompanionAssets::get(name).map(|file| file.data)
}
