// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks ranges and shapes serde cannot express. All failures are collected
//! so the user sees every problem in one run.

use crate::diagnostic::ConfigError;
use crate::model::MnemoConfig;

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &MnemoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let temperature = config.llm.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        fail(format!(
            "llm.temperature must be between 0 and 2, got {temperature}"
        ));
    }

    if config.llm.max_tokens == 0 {
        fail("llm.max_tokens must be greater than 0".to_string());
    }

    if config.llm.base_url.trim().is_empty() {
        fail("llm.base_url must not be empty".to_string());
    }

    if let Some(url) = &config.embedding.base_url {
        if url.trim().is_empty() {
            fail("embedding.base_url must not be empty when set".to_string());
        }
    }

    if config.embedding.model.trim().is_empty() {
        fail("embedding.model must not be empty".to_string());
    }

    // The user name is spliced into file and directory names.
    let user_name = &config.agent.user_name;
    if user_name.trim().is_empty() {
        fail("agent.user_name must not be empty".to_string());
    } else if user_name.contains(['/', '\\']) || user_name == "." || user_name == ".." {
        fail(format!(
            "agent.user_name `{user_name}` must not contain path separators"
        ));
    }

    if config.memory.retrieval_k == 0 {
        fail("memory.retrieval_k must be greater than 0".to_string());
    }

    if config.memory.short_term_max_turns == Some(0) {
        fail("memory.short_term_max_turns must be greater than 0 when set".to_string());
    }

    if config.memory.data_dir.trim().is_empty() {
        fail("memory.data_dir must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Return the configured API key, or the fatal `MissingKey` diagnostic.
pub fn require_api_key(config: &MnemoConfig) -> Result<&str, ConfigError> {
    match config.llm.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(ConfigError::MissingKey {
            key: "llm.api_key".to_string(),
            env: Some("API_KEY".to_string()),
        }),
    }
}
