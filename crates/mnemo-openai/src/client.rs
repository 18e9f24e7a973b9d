// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible APIs.
//!
//! [`OpenAiClient`] owns the bearer-authenticated `reqwest::Client` and maps
//! transport failures and API error bodies into [`MnemoError::Provider`].
//! Requests are sent once; failures are returned to the caller as-is.

use std::time::Duration;

use mnemo_core::MnemoError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::types::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest,
    EmbeddingResponse,
};

/// HTTP client for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a client for `base_url` (e.g. `https://api.deepseek.com`).
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, MnemoError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                MnemoError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| MnemoError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /chat/completions`.
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, MnemoError> {
        self.post_json("chat/completions", request).await
    }

    /// `POST /embeddings`.
    pub async fn embeddings(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, MnemoError> {
        self.post_json("embeddings", request).await
    }

    async fn post_json<Req, Resp>(&self, endpoint: &str, body: &Req) -> Result<Resp, MnemoError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| MnemoError::Provider {
                message: format!("HTTP request to {endpoint} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, endpoint, "response received");

        let text = response.text().await.map_err(|e| MnemoError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(api_err) => match api_err.error.type_ {
                    Some(kind) => format!("API error ({kind}): {}", api_err.error.message),
                    None => format!("API error ({status}): {}", api_err.error.message),
                },
                Err(_) => format!("API returned {status}: {text}"),
            };
            return Err(MnemoError::provider(message));
        }

        serde_json::from_str(&text).map_err(|e| MnemoError::Provider {
            message: format!("failed to parse {endpoint} response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
