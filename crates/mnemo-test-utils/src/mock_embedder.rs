// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedding adapters for similarity tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use mnemo_core::traits::{EmbeddingAdapter, PluginAdapter};
use mnemo_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use mnemo_core::MnemoError;

/// Default vector width of [`MockEmbedder`].
pub const MOCK_DIMENSIONS: usize = 64;

/// Hashed bag-of-words embedder.
///
/// Each lowercase alphanumeric token increments one bucket; the vector is
/// L2-normalized. Texts sharing words score a higher cosine similarity than
/// unrelated texts, which is enough to exercise ranking.
pub struct MockEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::with_dimensions(MOCK_DIMENSIONS)
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed` calls served.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Embed a single text.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = fnv1a(&token.to_lowercase()) as usize % self.dimensions;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
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
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| self.vector_for(t)).collect(),
            dimensions: self.dimensions,
        })
    }
}

/// An embedder whose every call fails.
#[derive(Default)]
pub struct FailingEmbedder;

#[async_trait]
impl PluginAdapter for FailingEmbedder {
    fn name(&self) -> &str {
        "failing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(HealthStatus::Unhealthy("always fails".to_string()))
    }
}

#[async_trait]
impl EmbeddingAdapter for FailingEmbedder {
    async fn embed(&self, _input: EmbeddingInput) -> Result<EmbeddingOutput, MnemoError> {
        Err(MnemoError::Embedding {
            message: "embedding backend unavailable".to_string(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn same_text_same_vector() {
        let embedder = MockEmbedder::new();
        assert_eq!(embedder.vector_for("I like hiking"), embedder.vector_for("i LIKE hiking!"));
    }

    #[test]
    fn shared_words_score_higher() {
        let embedder = MockEmbedder::new();
        let query = embedder.vector_for("hiking trip");
        let related = embedder.vector_for("user said: I went hiking");
        let empty = embedder.vector_for("");
        assert!(dot(&query, &related) > dot(&query, &empty));
        assert!(empty.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn failing_embedder_errors() {
        let err = FailingEmbedder
            .embed(EmbeddingInput { texts: vec!["x".into()] })
            .await
            .unwrap_err();
        assert!(matches!(err, MnemoError::Embedding { .. }));
    }
}
