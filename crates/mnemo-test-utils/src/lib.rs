// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnemo integration tests.
//!
//! Provides mock adapters for fast, deterministic tests without external
//! services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock LLM provider with pre-configured responses and request capture
//! - [`FailingProvider`] - Provider whose every call fails
//! - [`MockEmbedder`] - Deterministic bag-of-words embedder
//! - [`FailingEmbedder`] - Embedder whose every call fails

pub mod mock_embedder;
pub mod mock_provider;

pub use mock_embedder::{FailingEmbedder, MockEmbedder};
pub use mock_provider::{FailingProvider, MockProvider};
