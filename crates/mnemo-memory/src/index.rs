// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similarity index behind long-term memory.
//!
//! [`JsonVectorIndex`] embeds every record through an [`EmbeddingAdapter`],
//! keeps the vectors in memory, and mirrors them to
//! `<persist_dir>/<collection>.json`. Search is a linear cosine scan, which
//! is plenty for one user's conversation history.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use mnemo_core::traits::EmbeddingAdapter;
use mnemo_core::types::EmbeddingInput;
use mnemo_core::MnemoError;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::persist::{JsonLayout, read_json, write_json_atomic};
use crate::types::{cosine_similarity, MemoryRecord, RecordMetadata};

/// Append-only store of texts searchable by semantic similarity.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Embed and store one text with its metadata.
    async fn add(&self, text: String, metadata: RecordMetadata) -> Result<(), MnemoError>;

    /// Up to `k` stored records, most similar first.
    async fn similarity_search(&self, query: &str, k: usize)
        -> Result<Vec<MemoryRecord>, MnemoError>;

    /// Number of stored records.
    async fn len(&self) -> Result<usize, MnemoError>;

    /// Delete every record, including persisted state.
    async fn clear(&self) -> Result<(), MnemoError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    content: String,
    metadata: RecordMetadata,
    embedding: Vec<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    collection: String,
    entries: Vec<IndexEntry>,
}

/// File-backed vector index.
pub struct JsonVectorIndex {
    embedder: Arc<dyn EmbeddingAdapter>,
    persist_dir: PathBuf,
    collection: String,
    entries: RwLock<Vec<IndexEntry>>,
}

impl JsonVectorIndex {
    /// Open the collection under `persist_dir`, loading any persisted entries.
    pub async fn open(
        embedder: Arc<dyn EmbeddingAdapter>,
        persist_dir: impl Into<PathBuf>,
        collection: impl Into<String>,
    ) -> Result<Self, MnemoError> {
        let persist_dir = persist_dir.into();
        let collection = collection.into();
        let file_path = collection_file(&persist_dir, &collection);

        let entries = read_json::<IndexFile>(&file_path)
            .await?
            .map(|file| file.entries)
            .unwrap_or_default();
        info!(
            collection = %collection,
            records = entries.len(),
            "similarity index opened"
        );

        Ok(Self {
            embedder,
            persist_dir,
            collection,
            entries: RwLock::new(entries),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn persist_dir(&self) -> &Path {
        &self.persist_dir
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MnemoError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        output.embeddings.into_iter().next().ok_or_else(|| MnemoError::Embedding {
            message: "embedding returned no vectors".to_string(),
            source: None,
        })
    }
}

fn collection_file(persist_dir: &Path, collection: &str) -> PathBuf {
    persist_dir.join(format!("{collection}.json"))
}

#[async_trait]
impl SimilarityIndex for JsonVectorIndex {
    async fn add(&self, text: String, metadata: RecordMetadata) -> Result<(), MnemoError> {
        let embedding = self.embed_one(&text).await?;

        let mut entries = self.entries.write().await;
        entries.push(IndexEntry {
            content: text,
            metadata,
            embedding,
        });

        // Written under the lock so the file always reflects insertion order.
        let file = IndexFile {
            collection: self.collection.clone(),
            entries: entries.clone(),
        };
        let path = collection_file(&self.persist_dir, &self.collection);
        if let Err(e) = write_json_atomic(&path, &file, JsonLayout::Compact).await {
            entries.pop();
            return Err(e);
        }
        debug!(collection = %self.collection, records = entries.len(), "record indexed");
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<MemoryRecord>, MnemoError> {
        if k == 0 || self.entries.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = self.embed_one(query).await?;
        let entries = self.entries.read().await;

        let mut scored: Vec<(f32, &IndexEntry)> = entries
            .iter()
            .map(|entry| (cosine_similarity(&query_vec, &entry.embedding), entry))
            .collect();
        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, entry)| MemoryRecord {
                content: entry.content.clone(),
                metadata: entry.metadata.clone(),
            })
            .collect())
    }

    async fn len(&self) -> Result<usize, MnemoError> {
        Ok(self.entries.read().await.len())
    }

    async fn clear(&self) -> Result<(), MnemoError> {
        let mut entries = self.entries.write().await;
        match tokio::fs::remove_dir_all(&self.persist_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(MnemoError::storage(e)),
        }
        entries.clear();
        info!(collection = %self.collection, "similarity index cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordType;
    use mnemo_test_utils::{FailingEmbedder, MockEmbedder};

    fn metadata(input: &str) -> RecordMetadata {
        RecordMetadata {
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
            user_input: input.to_string(),
            record_type: RecordType::Conversation,
        }
    }

    async fn open(dir: &Path) -> JsonVectorIndex {
        JsonVectorIndex::open(Arc::new(MockEmbedder::new()), dir.join("chroma_db_t"), "memory_t")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn empty_index_search_skips_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(MockEmbedder::new());
        let index = JsonVectorIndex::open(embedder.clone(), dir.path(), "c").await.unwrap();
        assert!(index.similarity_search("anything", 3).await.unwrap().is_empty());
        assert_eq!(embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn search_ranks_by_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let index = open(dir.path()).await;
        index.add("I love hiking in the alps".into(), metadata("a")).await.unwrap();
        index.add("my cat is called Tom".into(), metadata("b")).await.unwrap();
        index.add("weekend plans".into(), metadata("c")).await.unwrap();

        let results = index.similarity_search("cat Tom", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metadata.user_input, "b");
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let index = open(dir.path()).await;
        for input in ["first", "second", "third"] {
            index.add("same text".into(), metadata(input)).await.unwrap();
        }
        let results = index.similarity_search("same text", 3).await.unwrap();
        let order: Vec<&str> = results.iter().map(|r| r.metadata.user_input.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let index = open(dir.path()).await;
            index.add("persist me".into(), metadata("x")).await.unwrap();
        }
        let index = open(dir.path()).await;
        assert_eq!(index.len().await.unwrap(), 1);
        assert!(dir.path().join("chroma_db_t/memory_t.json").exists());
    }

    #[tokio::test]
    async fn collection_file_is_written_compact() {
        let dir = tempfile::tempdir().unwrap();
        let index = open(dir.path()).await;
        index.add("one".into(), metadata("a")).await.unwrap();
        index.add("two".into(), metadata("b")).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("chroma_db_t/memory_t.json")).unwrap();
        assert!(!text.contains('\n'));
        assert!(!text.contains("  "));
    }

    #[tokio::test]
    async fn clear_removes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let index = open(dir.path()).await;
        index.add("gone soon".into(), metadata("x")).await.unwrap();
        index.clear().await.unwrap();
        assert_eq!(index.len().await.unwrap(), 0);
        assert!(!dir.path().join("chroma_db_t").exists());
        index.clear().await.unwrap();
    }

    #[tokio::test]
    async fn embedding_failure_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let index = JsonVectorIndex::open(Arc::new(FailingEmbedder), dir.path(), "c")
            .await
            .unwrap();
        assert!(index.add("x".into(), metadata("x")).await.is_err());
        assert_eq!(index.len().await.unwrap(), 0);
    }
}
