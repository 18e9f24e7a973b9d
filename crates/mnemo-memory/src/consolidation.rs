// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory consolidation: turning a finished exchange into durable memory.
//!
//! For each exchange the pipeline asks the model for structured facts,
//! merges them into the user profile, and indexes a record of the exchange.
//! Extraction problems downgrade the record to a raw transcript; they never
//! reach the user. Nothing is retried.
//!
//! [`ConsolidationWorker`] runs the pipeline on a background task. Jobs are
//! handled one at a time in submission order, so at most one consolidation
//! is in flight per user.

use std::sync::Arc;

use mnemo_core::traits::ProviderAdapter;
use mnemo_core::MnemoError;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::extractor::{render_transcript, FactExtractor};
use crate::long_term::LongTermMemory;
use crate::profile::ProfileStore;
use crate::types::{now_timestamp, MemoryRecord, RecordType};

/// What one consolidation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationOutcome {
    pub record_type: RecordType,
    pub profile_changed: bool,
    /// False when writing to the similarity index failed.
    pub indexed: bool,
}

/// Extract, merge, index.
pub struct ConsolidationPipeline {
    provider: Arc<dyn ProviderAdapter>,
    extractor: FactExtractor,
    profile: Arc<Mutex<ProfileStore>>,
    long_term: Arc<LongTermMemory>,
    user_name: String,
}

impl ConsolidationPipeline {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        extractor: FactExtractor,
        profile: Arc<Mutex<ProfileStore>>,
        long_term: Arc<LongTermMemory>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            extractor,
            profile,
            long_term,
            user_name: user_name.into(),
        }
    }

    /// Consolidate one completed exchange.
    pub async fn consolidate(
        &self,
        user_input: &str,
        assistant_response: &str,
    ) -> ConsolidationOutcome {
        let transcript = render_transcript(user_input, assistant_response);
        let timestamp = now_timestamp();

        let extracted = match self
            .extractor
            .extract(self.provider.as_ref(), &self.user_name, &transcript)
            .await
        {
            Ok(facts) if facts.is_empty() => {
                debug!("extraction found nothing, storing raw exchange");
                None
            }
            Ok(facts) => Some(facts),
            Err(e) => {
                warn!(error = %e, "fact extraction failed, storing raw exchange");
                None
            }
        };

        let mut profile_changed = false;
        let record = match extracted {
            Some(facts) => {
                match self.profile.lock().await.merge(&facts).await {
                    Ok(changed) => profile_changed = changed,
                    Err(e) => warn!(error = %e, "failed to persist user profile"),
                }
                MemoryRecord::with_extraction(&timestamp, user_input, &facts)
            }
            None => MemoryRecord::conversation(&timestamp, user_input, assistant_response),
        };

        let record_type = record.metadata.record_type;
        let indexed = match self.long_term.index(record).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to index memory record");
                false
            }
        };

        debug!(%record_type, profile_changed, indexed, "exchange consolidated");
        ConsolidationOutcome {
            record_type,
            profile_changed,
            indexed,
        }
    }
}

enum Job {
    Consolidate {
        user_input: String,
        assistant_response: String,
    },
    Flush(oneshot::Sender<()>),
}

/// Background consolidation queue.
pub struct ConsolidationWorker {
    tx: mpsc::UnboundedSender<Job>,
    handle: JoinHandle<()>,
}

impl ConsolidationWorker {
    /// Spawn the worker task on the current tokio runtime.
    pub fn spawn(pipeline: Arc<ConsolidationPipeline>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        let handle = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    Job::Consolidate {
                        user_input,
                        assistant_response,
                    } => {
                        pipeline.consolidate(&user_input, &assistant_response).await;
                    }
                    Job::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("consolidation worker stopped");
        });

        Self { tx, handle }
    }

    /// Queue an exchange. Returns immediately.
    pub fn submit(&self, user_input: &str, assistant_response: &str) -> Result<(), MnemoError> {
        self.tx
            .send(Job::Consolidate {
                user_input: user_input.to_string(),
                assistant_response: assistant_response.to_string(),
            })
            .map_err(|_| MnemoError::Internal("consolidation worker has stopped".to_string()))
    }

    /// Wait until every job submitted before this call has finished.
    pub async fn flush(&self) -> Result<(), MnemoError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Job::Flush(done_tx))
            .map_err(|_| MnemoError::Internal("consolidation worker has stopped".to_string()))?;
        done_rx
            .await
            .map_err(|_| MnemoError::Internal("consolidation worker dropped a flush".to_string()))
    }

    /// Drain the queue and stop the task.
    pub async fn shutdown(self) -> Result<(), MnemoError> {
        drop(self.tx);
        self.handle
            .await
            .map_err(|e| MnemoError::Internal(format!("consolidation worker panicked: {e}")))?;
        info!("consolidation worker drained");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::JsonVectorIndex;
    use crate::types::Category;
    use mnemo_test_utils::{FailingProvider, MockEmbedder, MockProvider};
    use serde_json::json;
    use std::path::Path;

    async fn pipeline(
        dir: &Path,
        provider: Arc<dyn ProviderAdapter>,
    ) -> (ConsolidationPipeline, Arc<Mutex<ProfileStore>>, Arc<LongTermMemory>) {
        let profile = Arc::new(Mutex::new(
            ProfileStore::load(dir.join("user_profile_t.json")).await.unwrap(),
        ));
        let index = JsonVectorIndex::open(Arc::new(MockEmbedder::new()), dir.join("idx"), "memory_t")
            .await
            .unwrap();
        let long_term = Arc::new(LongTermMemory::new(Arc::new(index)));
        let pipeline = ConsolidationPipeline::new(
            provider,
            FactExtractor::default(),
            profile.clone(),
            long_term.clone(),
            "t",
        );
        (pipeline, profile, long_term)
    }

    #[tokio::test]
    async fn successful_extraction_merges_and_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::with_responses(vec![
            r#"{"interests": ["hiking"]}"#.into(),
        ]));
        let (pipeline, profile, long_term) = pipeline(dir.path(), provider).await;

        let outcome = pipeline.consolidate("I love hiking", "Nice!").await;
        assert_eq!(outcome.record_type, RecordType::ConversationWithExtraction);
        assert!(outcome.profile_changed);
        assert!(outcome.indexed);
        assert_eq!(
            profile.lock().await.profile().list(Category::Interests),
            &[json!("hiking")]
        );
        assert_eq!(long_term.len().await, 1);
    }

    #[tokio::test]
    async fn provider_failure_stores_raw_record_only() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, profile, long_term) =
            pipeline(dir.path(), Arc::new(FailingProvider::new("down"))).await;

        let outcome = pipeline.consolidate("hello", "hi there").await;
        assert_eq!(outcome.record_type, RecordType::Conversation);
        assert!(!outcome.profile_changed);
        assert_eq!(long_term.len().await, 1);
        assert!(long_term.retrieve("hello", 1).await.contains("assistant: hi there"));
        assert!(!profile.lock().await.path().exists());
    }

    #[tokio::test]
    async fn empty_object_counts_as_nothing_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::with_responses(vec!["{}".into()]));
        let (pipeline, _, _) = pipeline(dir.path(), provider).await;

        let outcome = pipeline.consolidate("ok", "ok").await;
        assert_eq!(outcome.record_type, RecordType::Conversation);
    }

    #[tokio::test]
    async fn worker_processes_in_order_and_flush_waits() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::with_responses(vec![
            r#"{"personal_info": {"age": "30"}}"#.into(),
            r#"{"personal_info": {"age": "31"}}"#.into(),
        ]));
        let (pipeline, profile, long_term) = pipeline(dir.path(), provider).await;
        let worker = ConsolidationWorker::spawn(Arc::new(pipeline));

        worker.submit("I'm 30", "ok").unwrap();
        worker.submit("I just turned 31", "happy birthday").unwrap();
        worker.flush().await.unwrap();

        let age = profile.lock().await.profile().map(Category::PersonalInfo).unwrap()["age"].clone();
        assert_eq!(age, json!("31"));
        assert_eq!(long_term.len().await, 2);

        worker.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_drains_pending_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::new());
        let (pipeline, _, long_term) = pipeline(dir.path(), provider).await;
        let worker = ConsolidationWorker::spawn(Arc::new(pipeline));

        for i in 0..3 {
            worker.submit(&format!("message {i}"), "ok").unwrap();
        }
        worker.shutdown().await.unwrap();
        assert_eq!(long_term.len().await, 3);
    }
}
