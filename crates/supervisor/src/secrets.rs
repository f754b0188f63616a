// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret gathering: provider-specific API keys are read from the
//! environment if present, else solicited interactively with echo
//! disabled. Never written to disk, never logged, never cached — the
//! cookbook in `crate::cookbook` deliberately has no field for any of
//! this.

use crate::config::LlmProvider;
use crate::error::SupervisorError;
use dialoguer::Password;

const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// One gathered secret, named by the env var the child process expects it
/// under (`ANTHROPIC_API_KEY` or `OPENAI_API_KEY`).
pub struct GatheredSecret {
    pub env_var: &'static str,
    pub value: String,
}

/// `Ollama` needs no secret; `Anthropic`/`OpenAI` need exactly one,
/// env-or-prompt.
pub fn gather(provider: LlmProvider) -> Result<Option<GatheredSecret>, SupervisorError> {
    match provider {
        LlmProvider::Ollama => Ok(None),
        LlmProvider::Anthropic => Ok(Some(env_or_prompt(ANTHROPIC_API_KEY_ENV, "Anthropic API key")?)),
        LlmProvider::OpenAi => Ok(Some(env_or_prompt(OPENAI_API_KEY_ENV, "OpenAI API key")?)),
    }
}

fn env_or_prompt(env_var: &'static str, prompt: &str) -> Result<GatheredSecret, SupervisorError> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Ok(GatheredSecret { env_var, value });
        }
    }

    let value = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(false)
        .interact()
        .map_err(|e| SupervisorError::Secret(e.to_string()))?;
    Ok(GatheredSecret { env_var, value })
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
