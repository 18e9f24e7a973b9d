// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnemo assistant.

use thiserror::Error;

/// The primary error type used across all Mnemo adapters and memory operations.
#[derive(Debug, Error)]
pub enum MnemoError {
    /// Configuration errors (missing credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence errors (profile document, index files).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors (HTTP failure, API error body, empty completion).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding backend errors.
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Fact extraction produced output that could not be used.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemoError {
    /// Wraps any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MnemoError::Storage {
            source: Box::new(err),
        }
    }

    /// Builds a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        MnemoError::Provider {
            message: message.into(),
            source: None,
        }
    }
}
