// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Mnemo assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Mnemo configuration.
///
/// Built once at process start and passed by reference to every component
/// that needs it. All sections are optional and default to sensible values,
/// except `llm.api_key` which must be supplied before a session starts.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemoConfig {
    /// User identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Chat-completions API settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embeddings API settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Memory tiers and consolidation settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name of the user the assistant serves. Keys the profile and the index.
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            user_name: default_user_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_user_name() -> String {
    "chenkx".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI-compatible chat-completions configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// API key. Required; `None` is a fatal startup error.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier used for both replies and extraction.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_llm_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    120
}

/// Embeddings API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Base URL for the embeddings endpoint. Falls back to `llm.base_url`.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            base_url: None,
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// How consolidation runs relative to the chat turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsolidationMode {
    /// Queued on a background worker, one in flight at a time, in order.
    #[default]
    Background,
    /// Awaited before `chat` returns; blocks the next turn.
    Inline,
}

/// Memory tier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Directory holding profile documents and index directories.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Prefix of the per-user similarity collection name.
    #[serde(default = "default_collection_prefix")]
    pub collection_prefix: String,

    /// Prefix of the per-user index persistence directory.
    #[serde(default = "default_index_dir_prefix")]
    pub index_dir_prefix: String,

    /// Number of long-term memories retrieved per turn.
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,

    /// Maximum number of exchanges (user/assistant pairs) kept in short-term
    /// memory. `None` = unbounded.
    #[serde(default)]
    pub short_term_max_turns: Option<usize>,

    /// Consolidation scheduling.
    #[serde(default)]
    pub consolidation: ConsolidationMode,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            collection_prefix: default_collection_prefix(),
            index_dir_prefix: default_index_dir_prefix(),
            retrieval_k: default_retrieval_k(),
            short_term_max_turns: None,
            consolidation: ConsolidationMode::default(),
        }
    }
}

impl MemoryConfig {
    /// Path of the persisted profile document for `user_name`.
    pub fn profile_path(&self, user_name: &str) -> PathBuf {
        PathBuf::from(&self.data_dir).join(format!("user_profile_{user_name}.json"))
    }

    /// Persistence directory of the similarity index for `user_name`.
    pub fn index_dir(&self, user_name: &str) -> PathBuf {
        PathBuf::from(&self.data_dir).join(format!("{}{user_name}", self.index_dir_prefix))
    }

    /// Similarity collection name for `user_name`.
    pub fn collection_name(&self, user_name: &str) -> String {
        format!("{}{user_name}", self.collection_prefix)
    }
}

fn default_data_dir() -> String {
    ".".to_string()
}

fn default_collection_prefix() -> String {
    "memory_".to_string()
}

fn default_index_dir_prefix() -> String {
    "chroma_db_".to_string()
}

fn default_retrieval_k() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_user_paths_are_derived_from_user_name() {
        let memory = MemoryConfig {
            data_dir: "/var/lib/mnemo".to_string(),
            ..MemoryConfig::default()
        };
        assert_eq!(
            memory.profile_path("alice"),
            PathBuf::from("/var/lib/mnemo/user_profile_alice.json")
        );
        assert_eq!(
            memory.index_dir("alice"),
            PathBuf::from("/var/lib/mnemo/chroma_db_alice")
        );
        assert_eq!(memory.collection_name("alice"), "memory_alice");
    }

    #[test]
    fn consolidation_mode_parses_lowercase() {
        let config: MnemoConfig = toml::from_str("[memory]\nconsolidation = \"inline\"\n").unwrap();
        assert_eq!(config.memory.consolidation, ConsolidationMode::Inline);
        assert_eq!(MnemoConfig::default().memory.consolidation, ConsolidationMode::Background);
    }
}
