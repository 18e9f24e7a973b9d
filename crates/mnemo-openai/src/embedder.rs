// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embeddings adapter for OpenAI-compatible `/embeddings` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use mnemo_config::{require_api_key, MnemoConfig};
use mnemo_core::error::MnemoError;
use mnemo_core::traits::{EmbeddingAdapter, PluginAdapter};
use mnemo_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::EmbeddingRequest;

/// Remote embedding adapter implementing [`EmbeddingAdapter`].
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    /// Creates an embedder from `embedding.*`, falling back to `llm.base_url`.
    pub fn new(config: &MnemoConfig) -> Result<Self, MnemoError> {
        let api_key = require_api_key(config).map_err(|e| MnemoError::Config(e.to_string()))?;
        let base_url = config
            .embedding
            .base_url
            .as_deref()
            .unwrap_or(&config.llm.base_url);
        let client = OpenAiClient::new(
            api_key,
            base_url,
            Duration::from_secs(config.llm.timeout_secs),
        )?;

        info!(model = %config.embedding.model, base_url = %client.base_url(), "embedder initialized");
        Ok(Self::with_client(client, config.embedding.model.clone()))
    }

    pub fn with_client(client: OpenAiClient, model: String) -> Self {
        Self { client, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embedding"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemoError> {
        let expected = input.texts.len();
        if expected == 0 {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: input.texts,
        };
        let mut response = self.client.embeddings(&request).await.map_err(|e| match e {
            MnemoError::Provider { message, source } => MnemoError::Embedding { message, source },
            other => other,
        })?;

        if response.data.len() != expected {
            return Err(MnemoError::Embedding {
                message: format!(
                    "expected {expected} embeddings, got {}",
                    response.data.len()
                ),
                source: None,
            });
        }

        // Servers may return data out of input order.
        response.data.sort_by_key(|d| d.index);
        let embeddings: Vec<Vec<f32>> = response.data.into_iter().map(|d| d.embedding).collect();
        let dimensions = embeddings.first().map_or(0, Vec::len);
        debug!(count = embeddings.len(), dimensions, "embeddings received");

        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}
