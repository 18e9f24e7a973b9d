// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestrators for the Mnemo assistant.
//!
//! Both agents implement [`Agent`]. [`SimpleAgent`] keeps a plain transcript;
//! [`MemoryAgent`] adds the user profile, long-term retrieval, and per-turn
//! consolidation. The variant is picked once, at construction, by
//! [`AgentKind`].

pub mod memory_agent;
pub mod prompts;
pub mod simple;

use std::sync::Arc;

use async_trait::async_trait;
use mnemo_config::model::LlmConfig;
use mnemo_config::MnemoConfig;
use mnemo_core::error::MnemoError;
use mnemo_core::traits::{EmbeddingAdapter, ProviderAdapter};
use mnemo_core::types::{ProviderMessage, ProviderRequest};
use mnemo_memory::{Turn, UserProfile};
use strum::{Display, EnumString};
use tracing::info;

pub use memory_agent::MemoryAgent;
pub use prompts::PromptTemplates;
pub use simple::SimpleAgent;

/// Which agent to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AgentKind {
    Simple,
    Memory,
}

/// One conversational assistant bound to one user.
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    fn user_name(&self) -> &str;

    /// Produce a reply to `input` and record the exchange.
    ///
    /// On error nothing is recorded.
    async fn chat(&mut self, input: &str) -> Result<String, MnemoError>;

    /// Forget everything this agent remembers about the user.
    async fn clear_memory(&mut self) -> Result<(), MnemoError>;

    /// The user's profile. `None` for agents that keep no profile.
    async fn profile(&self) -> Option<UserProfile>;

    /// Turns of the current session, oldest first.
    fn history(&self) -> Vec<Turn>;

    /// Replace the default system prompt template.
    fn set_system_prompt(&mut self, prompt: &str);

    /// Finish background work before exit.
    async fn shutdown(&mut self) -> Result<(), MnemoError> {
        Ok(())
    }
}

/// Sampling settings for reply generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatSettings {
    pub fn from_config(llm: &LlmConfig) -> Self {
        Self {
            model: llm.model.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
        }
    }

    pub(crate) fn request(&self, messages: Vec<ProviderMessage>) -> ProviderRequest {
        ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// System message, then the history, then the new user input.
pub(crate) fn assemble_messages(system: String, history: &[Turn], input: &str) -> Vec<ProviderMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ProviderMessage::system(system));
    messages.extend(history.iter().map(|turn| ProviderMessage {
        role: turn.role,
        content: turn.content.clone(),
    }));
    messages.push(ProviderMessage::user(input));
    messages
}

/// Construct the agent selected by `kind` for `user_name`.
pub async fn build_agent(
    kind: AgentKind,
    config: &MnemoConfig,
    user_name: &str,
    provider: Arc<dyn ProviderAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
) -> Result<Box<dyn Agent>, MnemoError> {
    let templates = PromptTemplates::from_config(&config.agent).await;
    let agent: Box<dyn Agent> = match kind {
        AgentKind::Simple => Box::new(SimpleAgent::new(config, user_name, provider, templates)),
        AgentKind::Memory => Box::new(
            MemoryAgent::open(config, user_name, provider, embedder, templates).await?,
        ),
    };
    info!(kind = %kind, user = user_name, "agent ready");
    Ok(agent)
}
