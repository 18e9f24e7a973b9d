// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent user profile and the fact-merge rules.
//!
//! Map categories merge key by key with the newest value winning. List
//! categories only ever grow: incoming elements are appended unless already
//! present, keeping first-seen order.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use mnemo_core::MnemoError;
use serde_json::Value;
use tracing::{debug, info};

use crate::persist::{JsonLayout, read_json, write_json_atomic};
use crate::types::{Category, CategoryValue, ExtractedFacts, UserProfile};

/// Merge `facts` into `profile`. Returns whether anything changed.
///
/// Unknown categories are skipped. A map category given anything but a JSON
/// object is left alone. A list category accepts either a list of elements
/// or a single scalar; `null` is never appended.
pub fn merge_facts(profile: &mut UserProfile, facts: &ExtractedFacts) -> bool {
    let mut changed = false;

    for (name, incoming) in facts.iter() {
        let Ok(category) = Category::from_str(name) else {
            debug!(category = %name, "ignoring unknown category");
            continue;
        };

        match profile.get_mut(category) {
            CategoryValue::Map(existing) => {
                let Value::Object(entries) = incoming else {
                    debug!(category = %category, "ignoring non-object value for map category");
                    continue;
                };
                for (key, value) in entries {
                    if existing.get(key) != Some(value) {
                        existing.insert(key.clone(), value.clone());
                        changed = true;
                    }
                }
            }
            CategoryValue::List(existing) => match incoming {
                Value::Array(items) => {
                    for item in items {
                        changed |= push_unique(existing, item);
                    }
                }
                scalar => changed |= push_unique(existing, scalar),
            },
        }
    }

    changed
}

fn push_unique(list: &mut Vec<Value>, item: &Value) -> bool {
    if item.is_null() || list.contains(item) {
        return false;
    }
    list.push(item.clone());
    true
}

/// Owns one user's profile document on disk.
///
/// No cross-process locking: two processes serving the same user will
/// overwrite each other.
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profile: UserProfile,
}

impl ProfileStore {
    /// Load the profile at `path`, or start from defaults if there is none.
    ///
    /// Defaults are not written until the first merge.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, MnemoError> {
        let path = path.into();
        let profile = match read_json::<UserProfile>(&path).await? {
            Some(profile) => {
                debug!(path = %path.display(), "loaded user profile");
                profile
            }
            None => UserProfile::default(),
        };
        Ok(Self { path, profile })
    }

    /// Merge facts and persist the whole document.
    pub async fn merge(&mut self, facts: &ExtractedFacts) -> Result<bool, MnemoError> {
        let changed = merge_facts(&mut self.profile, facts);
        write_json_atomic(&self.path, &self.profile, JsonLayout::Pretty).await?;
        if changed {
            debug!(path = %self.path.display(), "user profile updated");
        }
        Ok(changed)
    }

    /// Pretty JSON rendering used in prompts.
    pub fn to_summary_text(&self) -> String {
        self.profile.to_pretty_json()
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reset to defaults and delete the persisted document.
    pub async fn clear(&mut self) -> Result<(), MnemoError> {
        self.profile = UserProfile::default();
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "user profile deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MnemoError::storage(e)),
        }
    }
}
