// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain conversational agent: system prompt plus the session transcript.

use std::sync::Arc;

use async_trait::async_trait;
use mnemo_config::MnemoConfig;
use mnemo_core::error::MnemoError;
use mnemo_core::traits::ProviderAdapter;
use mnemo_memory::{ShortTermMemory, Turn, UserProfile};
use tracing::{debug, info};

use crate::prompts::{render, PromptTemplates};
use crate::{assemble_messages, Agent, AgentKind, ChatSettings};

/// Agent with no memory beyond the current session.
pub struct SimpleAgent {
    provider: Arc<dyn ProviderAdapter>,
    templates: PromptTemplates,
    settings: ChatSettings,
    user_name: String,
    history: ShortTermMemory,
}

impl SimpleAgent {
    pub fn new(
        config: &MnemoConfig,
        user_name: &str,
        provider: Arc<dyn ProviderAdapter>,
        templates: PromptTemplates,
    ) -> Self {
        Self {
            provider,
            templates,
            settings: ChatSettings::from_config(&config.llm),
            user_name: user_name.to_string(),
            history: ShortTermMemory::with_capacity_limit(config.memory.short_term_max_turns),
        }
    }

    fn system_prompt(&self) -> String {
        render(&self.templates.system_default, &[("user_name", self.user_name.as_str())])
    }
}

#[async_trait]
impl Agent for SimpleAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Simple
    }

    fn user_name(&self) -> &str {
        &self.user_name
    }

    async fn chat(&mut self, input: &str) -> Result<String, MnemoError> {
        let history = self.history.load();
        let messages = assemble_messages(self.system_prompt(), &history, input);
        debug!(messages = messages.len(), "sending chat request");

        let response = self.provider.complete(self.settings.request(messages)).await?;
        self.history.save(input, &response.content);
        Ok(response.content)
    }

    async fn clear_memory(&mut self) -> Result<(), MnemoError> {
        self.history.clear();
        info!("conversation history cleared");
        Ok(())
    }

    async fn profile(&self) -> Option<UserProfile> {
        None
    }

    fn history(&self) -> Vec<Turn> {
        self.history.load()
    }

    fn set_system_prompt(&mut self, prompt: &str) {
        self.templates.set_system_prompt(prompt);
    }
}
