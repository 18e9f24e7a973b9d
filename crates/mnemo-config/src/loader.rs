// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./mnemo.toml` > `~/.config/mnemo/mnemo.toml` > `/etc/mnemo/mnemo.toml`
//! with environment variable overrides via the `MNEMO_` prefix and the plain
//! variables (`API_KEY`, `BASE_URL`, `LLM_MODEL`, ...) used by `.env` files.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MnemoConfig;

/// Config sections addressable through `MNEMO_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &["agent", "llm", "embedding", "memory"];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mnemo/mnemo.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "mnemo.toml";

/// Path of the per-user XDG config file, if a config dir is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mnemo/mnemo.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mnemo/mnemo.toml` (system-wide)
/// 3. `~/.config/mnemo/mnemo.toml` (user XDG config)
/// 4. `./mnemo.toml` (local directory)
/// 5. `MNEMO_*` environment variables
/// 6. Plain environment variables (`API_KEY`, `BASE_URL`, ...)
pub fn load_config() -> Result<MnemoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MnemoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MnemoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::file(path))
        .merge(prefixed_env_provider())
        .merge(plain_env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(prefixed_env_provider())
        .merge(plain_env_provider())
}

/// `MNEMO_LLM_MAX_TOKENS` -> `llm.max_tokens`.
///
/// Only the first underscore after a known section becomes a dot, so
/// underscore-containing keys survive intact. Unknown sections pass through
/// unchanged and are rejected by `deny_unknown_fields`.
pub fn map_prefixed_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

/// Map one of the plain environment variable names onto its config key.
pub fn map_plain_key(key: &str) -> Option<&'static str> {
    match key.to_ascii_lowercase().as_str() {
        "api_key" => Some("llm.api_key"),
        "base_url" => Some("llm.base_url"),
        "llm_model" => Some("llm.model"),
        "llm_temperature" => Some("llm.temperature"),
        "llm_max_tokens" => Some("llm.max_tokens"),
        "embedding_model" => Some("embedding.model"),
        "default_user_name" => Some("agent.user_name"),
        _ => None,
    }
}

fn prefixed_env_provider() -> Env {
    Env::prefixed("MNEMO_").map(|key| map_prefixed_key(key.as_str()).into())
}

fn plain_env_provider() -> Env {
    Env::raw().filter_map(|key| map_plain_key(key.as_str()).map(Into::into))
}
