// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory: retrieval over the similarity index.

use std::sync::Arc;

use mnemo_config::MnemoConfig;
use mnemo_core::traits::EmbeddingAdapter;
use mnemo_core::MnemoError;
use tracing::{debug, warn};

use crate::index::{JsonVectorIndex, SimilarityIndex};
use crate::types::MemoryRecord;

/// Text returned by [`LongTermMemory::retrieve`] when there is nothing to show.
pub const NO_MEMORIES_SENTINEL: &str = "No relevant memories yet.";

/// Per-user store of consolidated turns.
pub struct LongTermMemory {
    index: Arc<dyn SimilarityIndex>,
}

impl LongTermMemory {
    pub fn new(index: Arc<dyn SimilarityIndex>) -> Self {
        Self { index }
    }

    /// Open the user's [`JsonVectorIndex`] at the configured location.
    pub async fn open(
        config: &MnemoConfig,
        user_name: &str,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Result<Self, MnemoError> {
        let index = JsonVectorIndex::open(
            embedder,
            config.memory.index_dir(user_name),
            config.memory.collection_name(user_name),
        )
        .await?;
        Ok(Self::new(Arc::new(index)))
    }

    /// Up to `k` relevant records as `- <content>` lines, or the sentinel.
    ///
    /// Search failures are logged and reported as "nothing relevant".
    pub async fn retrieve(&self, query: &str, k: usize) -> String {
        match self.index.similarity_search(query, k).await {
            Ok(records) if !records.is_empty() => {
                debug!(count = records.len(), "retrieved long-term memories");
                records
                    .iter()
                    .map(|r| format!("- {}", r.content))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Ok(_) => NO_MEMORIES_SENTINEL.to_string(),
            Err(e) => {
                warn!(error = %e, "memory retrieval failed");
                NO_MEMORIES_SENTINEL.to_string()
            }
        }
    }

    /// Append one record. No dedup, no decay.
    pub async fn index(&self, record: MemoryRecord) -> Result<(), MnemoError> {
        self.index.add(record.content, record.metadata).await
    }

    pub async fn clear(&self) -> Result<(), MnemoError> {
        self.index.clear().await
    }

    /// Record count; 0 if the index cannot be read.
    pub async fn len(&self) -> usize {
        match self.index.len().await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "failed to count long-term memories");
                0
            }
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
