// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between Mnemo and the hosted model APIs.
//!
//! [`ProviderAdapter`] produces completions, [`EmbeddingAdapter`] produces
//! vectors. Both sit on [`PluginAdapter`] and are used as trait objects.

pub mod adapter;
pub mod embedding;
pub mod provider;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use provider::ProviderAdapter;
