// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory-aware agent.
//!
//! Each turn:
//! 1. Retrieve the `k` most similar past exchanges
//! 2. Render the profile and memories into the system prompt
//! 3. Ask the model, with the short-term history
//! 4. Record the exchange in short-term memory
//! 5. Hand the exchange to consolidation (background or inline)

use std::sync::Arc;

use async_trait::async_trait;
use mnemo_config::{ConsolidationMode, MnemoConfig};
use mnemo_core::error::MnemoError;
use mnemo_core::traits::{EmbeddingAdapter, ProviderAdapter};
use mnemo_memory::{
    ConsolidationPipeline, ConsolidationWorker, FactExtractor, LongTermMemory, ProfileStore,
    ShortTermMemory, Turn, UserProfile,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::prompts::{render, PromptTemplates};
use crate::{assemble_messages, Agent, AgentKind, ChatSettings};

/// Agent with short-term, long-term, and profile memory.
pub struct MemoryAgent {
    provider: Arc<dyn ProviderAdapter>,
    templates: PromptTemplates,
    settings: ChatSettings,
    user_name: String,
    retrieval_k: usize,
    short_term: ShortTermMemory,
    long_term: Arc<LongTermMemory>,
    profile: Arc<Mutex<ProfileStore>>,
    pipeline: Arc<ConsolidationPipeline>,
    /// `None` in inline mode, or after shutdown.
    worker: Option<ConsolidationWorker>,
}

impl MemoryAgent {
    /// Load the user's profile and index and start consolidation.
    ///
    /// In background mode this must be called inside a tokio runtime.
    pub async fn open(
        config: &MnemoConfig,
        user_name: &str,
        provider: Arc<dyn ProviderAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        templates: PromptTemplates,
    ) -> Result<Self, MnemoError> {
        let profile = ProfileStore::load(config.memory.profile_path(user_name)).await?;
        let profile = Arc::new(Mutex::new(profile));
        let long_term = Arc::new(LongTermMemory::open(config, user_name, embedder).await?);

        let extractor = FactExtractor::new(templates.extraction.clone()).with_sampling(
            config.llm.model.clone(),
            config.llm.temperature,
            config.llm.max_tokens,
        );
        let pipeline = Arc::new(ConsolidationPipeline::new(
            provider.clone(),
            extractor,
            profile.clone(),
            long_term.clone(),
            user_name,
        ));

        let worker = match config.memory.consolidation {
            ConsolidationMode::Background => Some(ConsolidationWorker::spawn(pipeline.clone())),
            ConsolidationMode::Inline => None,
        };

        info!(
            user = user_name,
            memories = long_term.len().await,
            consolidation = ?config.memory.consolidation,
            "memory agent initialized"
        );

        Ok(Self {
            provider,
            templates,
            settings: ChatSettings::from_config(&config.llm),
            user_name: user_name.to_string(),
            retrieval_k: config.memory.retrieval_k,
            short_term: ShortTermMemory::with_capacity_limit(config.memory.short_term_max_turns),
            long_term,
            profile,
            pipeline,
            worker,
        })
    }

    /// Wait for queued consolidations to finish. No-op in inline mode.
    pub async fn flush(&self) -> Result<(), MnemoError> {
        match &self.worker {
            Some(worker) => worker.flush().await,
            None => Ok(()),
        }
    }

    async fn system_prompt(&self, input: &str) -> String {
        let memories = self.long_term.retrieve(input, self.retrieval_k).await;
        let profile = self.profile.lock().await.to_summary_text();
        render(
            &self.templates.system_memory_aware,
            &[
                ("user_name", self.user_name.as_str()),
                ("user_profile", profile.as_str()),
                ("relevant_memories", memories.as_str()),
            ],
        )
    }

    async fn consolidate(&self, input: &str, reply: &str) {
        match &self.worker {
            Some(worker) => {
                if let Err(e) = worker.submit(input, reply) {
                    warn!(error = %e, "failed to queue consolidation, running inline");
                    self.pipeline.consolidate(input, reply).await;
                }
            }
            None => {
                self.pipeline.consolidate(input, reply).await;
            }
        }
    }
}

#[async_trait]
impl Agent for MemoryAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Memory
    }

    fn user_name(&self) -> &str {
        &self.user_name
    }

    async fn chat(&mut self, input: &str) -> Result<String, MnemoError> {
        let system = self.system_prompt(input).await;
        let history = self.short_term.load();
        let messages = assemble_messages(system, &history, input);
        debug!(messages = messages.len(), "sending chat request");

        let response = self.provider.complete(self.settings.request(messages)).await?;
        let reply = response.content;

        self.short_term.save(input, &reply);
        self.consolidate(input, &reply).await;
        Ok(reply)
    }

    async fn clear_memory(&mut self) -> Result<(), MnemoError> {
        // Pending jobs would otherwise repopulate what is cleared below.
        self.flush().await?;
        self.short_term.clear();
        self.long_term.clear().await?;
        self.profile.lock().await.clear().await?;
        info!(user = %self.user_name, "all memory cleared");
        Ok(())
    }

    async fn profile(&self) -> Option<UserProfile> {
        if let Err(e) = self.flush().await {
            warn!(error = %e, "profile may not reflect the latest turns");
        }
        Some(self.profile.lock().await.profile().clone())
    }

    fn history(&self) -> Vec<Turn> {
        self.short_term.load()
    }

    fn set_system_prompt(&mut self, prompt: &str) {
        self.templates.set_system_prompt(prompt);
    }

    async fn shutdown(&mut self) -> Result<(), MnemoError> {
        match self.worker.take() {
            Some(worker) => worker.shutdown().await,
            None => Ok(()),
        }
    }
}
