// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn ollama_requires_no_secret() {
    let result = gather(LlmProvider::Ollama);
    assert!(matches!(result, Ok(None)));
}

#[test]
#[serial]
fn anthropic_prefers_the_env_var_over_prompting() {
    std::env::set_var(ANTHROPIC_API_KEY_ENV, "test-key-123");
    let result = gather(LlmProvider::Anthropic);
    std::env::remove_var(ANTHROPIC_API_KEY_ENV);

    let secret = result.unwrap().expect("anthropic always gathers a secret");
    assert_eq!(secret.env_var, ANTHROPIC_API_KEY_ENV);
    assert_eq!(secret.value, "test-key-123");
}

#[test]
#[serial]
fn openai_prefers_the_env_var_over_prompting() {
    std::env::set_var(OPENAI_API_KEY_ENV, "sk-test-456");
    let result = gather(LlmProvider::OpenAi);
    std::env::remove_var(OPENAI_API_KEY_ENV);

    let secret = result.unwrap().expect("openai always gathers a secret");
    assert_eq!(secret.env_var, OPENAI_API_KEY_ENV);
    assert_eq!(secret.value, "sk-test-456");
}
