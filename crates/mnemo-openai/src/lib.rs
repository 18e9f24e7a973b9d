// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider and embedding adapters for the Mnemo assistant.
//!
//! [`OpenAiProvider`] implements [`ProviderAdapter`] against
//! `POST {base_url}/chat/completions`; [`OpenAiEmbedder`] implements
//! [`EmbeddingAdapter`](mnemo_core::EmbeddingAdapter) against
//! `POST {base_url}/embeddings`. Any server speaking this dialect
//! (DeepSeek, OpenAI, vLLM, Ollama's compatibility layer) works.

pub mod client;
pub mod embedder;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use mnemo_config::{require_api_key, MnemoConfig};
use mnemo_core::error::MnemoError;
use mnemo_core::traits::{PluginAdapter, ProviderAdapter};
use mnemo_core::types::{
    AdapterType, HealthStatus, ProviderMessage, ProviderRequest, ProviderResponse, TokenUsage,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatCompletionRequest, ChatMessage};

pub use embedder::OpenAiEmbedder;

/// Chat-completions provider implementing [`ProviderAdapter`].
pub struct OpenAiProvider {
    client: OpenAiClient,
    default_model: String,
}

impl OpenAiProvider {
    /// Creates a provider from `llm.*` settings.
    ///
    /// Fails with [`MnemoError::Config`] when no API key is configured.
    pub fn new(config: &MnemoConfig) -> Result<Self, MnemoError> {
        let api_key = require_api_key(config).map_err(|e| MnemoError::Config(e.to_string()))?;
        let client = OpenAiClient::new(
            api_key,
            &config.llm.base_url,
            Duration::from_secs(config.llm.timeout_secs),
        )?;

        info!(
            model = %config.llm.model,
            base_url = %client.base_url(),
            "chat provider initialized"
        );

        Ok(Self::with_client(client, config.llm.model.clone()))
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: OpenAiClient, default_model: String) -> Self {
        Self {
            client,
            default_model,
        }
    }

    /// Model used when a request leaves `model` empty.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    fn to_chat_request(&self, request: &ProviderRequest) -> ChatCompletionRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        ChatCompletionRequest {
            model,
            messages: request.messages.iter().map(to_chat_message).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

fn to_chat_message(message: &ProviderMessage) -> ChatMessage {
    ChatMessage {
        role: message.role.to_string(),
        content: Some(message.content.clone()),
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        // Completions cost tokens; a constructed client is considered healthy.
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemoError> {
        let api_request = self.to_chat_request(&request);
        debug!(
            model = %api_request.model,
            messages = api_request.messages.len(),
            "sending chat completion"
        );
        let response = self.client.chat_completion(&api_request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MnemoError::provider("response contained no choices"))?;
        let usage = response.usage.unwrap_or_default();

        Ok(ProviderResponse {
            id: response.id,
            content: choice.message.content.unwrap_or_default(),
            model: if response.model.is_empty() {
                api_request.model
            } else {
                response.model
            },
            finish_reason: choice.finish_reason,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiProvider {
        let client =
            OpenAiClient::new("sk-test", &server.uri(), Duration::from_secs(5)).unwrap();
        OpenAiProvider::with_client(client, "deepseek-chat".into())
    }

    fn request(model: &str) -> ProviderRequest {
        ProviderRequest {
            model: model.into(),
            messages: vec![
                ProviderMessage::system("You are helpful."),
                ProviderMessage::user("Hello"),
            ],
            temperature: 0.7,
            max_tokens: 128,
        }
    }

    #[test]
    fn new_without_api_key_is_config_error() {
        let config = MnemoConfig::default();
        let err = OpenAiProvider::new(&config).err().unwrap();
        assert!(matches!(err, MnemoError::Config(_)), "got: {err}");
    }

    #[test]
    fn new_with_api_key_uses_configured_model() {
        let mut config = MnemoConfig::default();
        config.llm.api_key = Some("sk-test".into());
        config.llm.model = "gpt-4o-mini".into();
        let provider = OpenAiProvider::new(&config).unwrap();
        assert_eq!(provider.default_model(), "gpt-4o-mini");
    }

    #[test]
    fn messages_keep_order_and_roles() {
        let client = OpenAiClient::new("k", "http://localhost", Duration::from_secs(1)).unwrap();
        let provider = OpenAiProvider::with_client(client, "m".into());
        let api = provider.to_chat_request(&request(""));
        assert_eq!(api.model, "m");
        assert_eq!(api.messages[0].role, "system");
        assert_eq!(api.messages[1].role, "user");
        assert_eq!(api.messages[1].content.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-chat",
                "max_tokens": 128,
                "messages": [{"role": "system", "content": "You are helpful."}, {"role": "user", "content": "Hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "c1",
                "model": "deepseek-chat",
                "choices": [
                    {"message": {"role": "assistant", "content": "first"}, "finish_reason": "stop"},
                    {"message": {"role": "assistant", "content": "second"}}
                ],
                "usage": {"prompt_tokens": 12, "completion_tokens": 1}
            })))
            .mount(&server)
            .await;

        let resp = provider_for(&server).complete(request("")).await.unwrap();
        assert_eq!(resp.content, "first");
        assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.input_tokens, 12);
    }

    #[tokio::test]
    async fn empty_choices_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).complete(request("x")).await.unwrap_err();
        assert!(err.to_string().contains("no choices"), "got: {err}");
    }
}
