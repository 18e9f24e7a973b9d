// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnemo assistant.
//!
//! This crate provides the adapter traits, error type, and common types used
//! throughout the Mnemo workspace. Provider and embedding backends implement
//! the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::MnemoError;
pub use types::{AdapterType, HealthStatus, MessageRole, ProviderMessage};

pub use traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter};
