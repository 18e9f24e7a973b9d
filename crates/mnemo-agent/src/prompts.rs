// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates and `{name}` placeholder rendering.

use mnemo_config::model::AgentConfig;
use mnemo_memory::DEFAULT_EXTRACTION_PROMPT;
use tracing::{info, warn};

/// System prompt of the simple agent. Placeholder: `{user_name}`.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are {user_name}'s AI personal assistant. Keep your replies concise and professional.";

/// System prompt of the memory agent.
/// Placeholders: `{user_name}`, `{user_profile}`, `{relevant_memories}`.
pub const MEMORY_AWARE_SYSTEM_PROMPT: &str = r#"You are {user_name}'s personal AI assistant, with long-term memory.

What you know about {user_name}:
{user_profile}

Relevant memories:
{relevant_memories}

Use this to give personal, thoughtful replies. When the user mentions something new, weave it naturally into the conversation."#;

/// The three templates an agent works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub system_default: String,
    pub system_memory_aware: String,
    pub extraction: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            system_default: DEFAULT_SYSTEM_PROMPT.to_string(),
            system_memory_aware: MEMORY_AWARE_SYSTEM_PROMPT.to_string(),
            extraction: DEFAULT_EXTRACTION_PROMPT.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Defaults, with the configured system prompt (if any) replacing
    /// `system_default`.
    pub async fn from_config(agent: &AgentConfig) -> Self {
        let mut templates = Self::default();
        if let Some(prompt) = load_system_prompt(agent).await {
            templates.set_system_prompt(prompt);
        }
        templates
    }

    /// Replace the simple agent's system template.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_default = prompt.into();
    }
}

/// Configured system prompt override.
///
/// # Resolution
/// 1. `agent.system_prompt_file` if set and readable with non-blank content
/// 2. `agent.system_prompt` if set and non-empty
/// 3. `None`: keep the built-in template
pub async fn load_system_prompt(agent: &AgentConfig) -> Option<String> {
    if let Some(file_path) = &agent.system_prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    info!(path = %file_path, "loaded system prompt from file");
                    return Some(trimmed.to_string());
                }
            }
            Err(e) => {
                warn!(
                    path = %file_path,
                    error = %e,
                    "failed to read system prompt file, falling back"
                );
            }
        }
    }

    match &agent.system_prompt {
        Some(prompt) if !prompt.is_empty() => Some(prompt.clone()),
        _ => None,
    }
}

/// Substitute `{name}` placeholders in one pass.
///
/// Values are inserted verbatim and never rescanned, so a value containing
/// `{...}` text is left as is. Placeholders without a value stay untouched.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
