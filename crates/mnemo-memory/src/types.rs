// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types: turns, profile categories, extracted facts, records.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mnemo_core::MessageRole;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::warn;

/// Timestamp format used in records and turns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time rendered with [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One message of the live conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::now(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(MessageRole::Assistant, content)
    }

    fn now(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Container shape of a profile category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Map,
    List,
}

/// The fixed set of profile categories.
///
/// Declaration order is the order categories appear in the persisted document.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    PersonalInfo,
    Interests,
    Preferences,
    Goals,
    Experiences,
    Relationships,
    Habits,
    Concerns,
}

impl Category {
    pub fn kind(self) -> CategoryKind {
        match self {
            Category::PersonalInfo | Category::Preferences => CategoryKind::Map,
            _ => CategoryKind::List,
        }
    }

    /// The empty container a fresh profile holds for this category.
    pub fn default_value(self) -> CategoryValue {
        match self {
            Category::Preferences => {
                let mut map = Map::new();
                map.insert("likes".to_string(), Value::Array(Vec::new()));
                map.insert("dislikes".to_string(), Value::Array(Vec::new()));
                CategoryValue::Map(map)
            }
            Category::PersonalInfo => CategoryValue::Map(Map::new()),
            _ => CategoryValue::List(Vec::new()),
        }
    }
}

/// A category's contents. The variant is fixed by [`Category::kind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CategoryValue {
    Map(Map<String, Value>),
    List(Vec<Value>),
}

impl CategoryValue {
    pub fn kind(&self) -> CategoryKind {
        match self {
            CategoryValue::Map(_) => CategoryKind::Map,
            CategoryValue::List(_) => CategoryKind::List,
        }
    }

    /// Reads a JSON value as this category's container, if the shape fits.
    fn from_json(category: Category, value: Value) -> Option<Self> {
        match (category.kind(), value) {
            (CategoryKind::Map, Value::Object(map)) => Some(CategoryValue::Map(map)),
            (CategoryKind::List, Value::Array(items)) => Some(CategoryValue::List(items)),
            _ => None,
        }
    }
}

/// Structured facts about the user, persisted per user name.
///
/// Always holds exactly the eight categories, each with the container kind
/// its category dictates.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    categories: BTreeMap<Category, CategoryValue>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            categories: Category::iter().map(|c| (c, c.default_value())).collect(),
        }
    }
}

impl UserProfile {
    pub fn get(&self, category: Category) -> &CategoryValue {
        // Every category is populated at construction and never removed.
        &self.categories[&category]
    }

    pub(crate) fn get_mut(&mut self, category: Category) -> &mut CategoryValue {
        self.categories
            .entry(category)
            .or_insert_with(|| category.default_value())
    }

    /// List entries of a list category; empty for map categories.
    pub fn list(&self, category: Category) -> &[Value] {
        match self.get(category) {
            CategoryValue::List(items) => items,
            CategoryValue::Map(_) => &[],
        }
    }

    /// Map entries of a map category, if it is one.
    pub fn map(&self, category: Category) -> Option<&Map<String, Value>> {
        match self.get(category) {
            CategoryValue::Map(map) => Some(map),
            CategoryValue::List(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryValue)> {
        self.categories.iter().map(|(c, v)| (*c, v))
    }

    /// Pretty-printed JSON document, as persisted.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Serialize for UserProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, value) in &self.categories {
            map.serialize_entry(category.as_ref(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UserProfile {
    /// Missing or mis-shaped categories fall back to their defaults; unknown
    /// keys are dropped.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut profile = UserProfile::default();
        for (key, value) in raw {
            let Ok(category) = Category::from_str(&key) else {
                warn!(key = %key, "dropping unknown profile category");
                continue;
            };
            match CategoryValue::from_json(category, value) {
                Some(value) => {
                    profile.categories.insert(category, value);
                }
                None => warn!(category = %category, "profile category has the wrong shape, using default"),
            }
        }
        Ok(profile)
    }
}

/// Facts parsed from one extraction call.
///
/// Keys are kept verbatim, including ones outside the eight categories;
/// merging ignores those.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedFacts(Map<String, Value>);

impl ExtractedFacts {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Compact JSON, as embedded in record content.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<Map<String, Value>> for ExtractedFacts {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Kind of long-term record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordType {
    /// Raw exchange; extraction failed or found nothing.
    Conversation,
    /// Exchange with the extracted facts embedded.
    ConversationWithExtraction,
}

/// Metadata stored alongside each record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub timestamp: String,
    pub user_input: String,
    pub record_type: RecordType,
}

/// One consolidated turn in the similarity index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub content: String,
    pub metadata: RecordMetadata,
}

impl MemoryRecord {
    /// Record of a raw exchange.
    pub fn conversation(timestamp: &str, user_input: &str, assistant_response: &str) -> Self {
        Self {
            content: format!(
                "time: {timestamp}\nuser: {user_input}\nassistant: {assistant_response}"
            ),
            metadata: RecordMetadata {
                timestamp: timestamp.to_string(),
                user_input: user_input.to_string(),
                record_type: RecordType::Conversation,
            },
        }
    }

    /// Record embedding the facts extracted from an exchange.
    pub fn with_extraction(timestamp: &str, user_input: &str, facts: &ExtractedFacts) -> Self {
        Self {
            content: format!(
                "time: {timestamp}\nuser said: {user_input}\nextracted: {}",
                facts.to_json()
            ),
            metadata: RecordMetadata {
                timestamp: timestamp.to_string(),
                user_input: user_input.to_string(),
                record_type: RecordType::ConversationWithExtraction,
            },
        }
    }
}

/// Cosine similarity of two vectors; 0.0 when either has zero norm or the
/// lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_profile_has_eight_categories_in_order() {
        let profile = UserProfile::default();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            json,
            json!({
                "personal_info": {},
                "interests": [],
                "preferences": {"likes": [], "dislikes": []},
                "goals": [],
                "experiences": [],
                "relationships": [],
                "habits": [],
                "concerns": []
            })
        );
        let keys: Vec<String> = profile.iter().map(|(c, _)| c.to_string()).collect();
        assert_eq!(keys[0], "personal_info");
        assert_eq!(keys[7], "concerns");
    }

    #[test]
    fn category_kinds_match_defaults() {
        for category in Category::iter() {
            assert_eq!(category.default_value().kind(), category.kind());
        }
    }

    #[test]
    fn deserialize_repairs_wrong_shapes_and_drops_unknown() {
        let profile: UserProfile = serde_json::from_value(json!({
            "personal_info": ["not", "a", "map"],
            "interests": ["chess"],
            "mood": "sunny"
        }))
        .unwrap();
        assert_eq!(profile.get(Category::PersonalInfo).kind(), CategoryKind::Map);
        assert_eq!(profile.list(Category::Interests), &[json!("chess")]);
        assert_eq!(profile.iter().count(), 8);
    }

    #[test]
    fn category_parses_snake_case() {
        assert_eq!(Category::from_str("personal_info").unwrap(), Category::PersonalInfo);
        assert!(Category::from_str("mood").is_err());
        assert_eq!(Category::Relationships.to_string(), "relationships");
    }

    #[test]
    fn record_contents_are_rendered() {
        let raw = MemoryRecord::conversation("2026-01-01T00:00:00.000Z", "hi", "hello");
        assert_eq!(
            raw.content,
            "time: 2026-01-01T00:00:00.000Z\nuser: hi\nassistant: hello"
        );
        assert_eq!(raw.metadata.record_type, RecordType::Conversation);

        let mut map = Map::new();
        map.insert("interests".into(), json!(["hiking"]));
        let rich = MemoryRecord::with_extraction("t", "I hike", &ExtractedFacts::new(map));
        assert_eq!(rich.content, "time: t\nuser said: I hike\nextracted: {\"interests\":[\"hiking\"]}");
        assert_eq!(rich.metadata.record_type.to_string(), "conversation_with_extraction");
    }

    #[test]
    fn cosine_similarity_guards_degenerate_input() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }
}
