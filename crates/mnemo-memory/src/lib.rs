// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory tiers for the Mnemo assistant.
//!
//! - [`ShortTermMemory`]: the ordered turns of the current session, in RAM.
//! - [`LongTermMemory`]: consolidated exchanges in a persisted similarity index.
//! - [`ProfileStore`]: structured facts about the user in eight fixed categories.
//!
//! After every reply the exchange is consolidated: [`FactExtractor`] asks the
//! model for facts, the profile absorbs them, and a [`MemoryRecord`] is indexed.
//! [`ConsolidationWorker`] runs that off the chat path.

pub mod consolidation;
pub mod extractor;
pub mod index;
pub mod long_term;
mod persist;
pub mod profile;
pub mod short_term;
pub mod types;

pub use consolidation::{ConsolidationOutcome, ConsolidationPipeline, ConsolidationWorker};
pub use extractor::{
    parse_extracted_facts, render_transcript, FactExtractor, DEFAULT_EXTRACTION_PROMPT,
};
pub use index::{JsonVectorIndex, SimilarityIndex};
pub use long_term::{LongTermMemory, NO_MEMORIES_SENTINEL};
pub use profile::{merge_facts, ProfileStore};
pub use short_term::ShortTermMemory;
pub use types::{
    Category, CategoryKind, CategoryValue, ExtractedFacts, MemoryRecord, RecordMetadata,
    RecordType, Turn, UserProfile,
};
