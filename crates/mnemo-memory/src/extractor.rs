// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-based extraction of profile facts from one exchange.

use mnemo_core::error::MnemoError;
use mnemo_core::traits::ProviderAdapter;
use mnemo_core::types::{ProviderMessage, ProviderRequest};
use serde_json::Value;
use tracing::debug;

use crate::types::ExtractedFacts;

/// Default extraction instruction. Placeholders: `{user_name}`, `{conversation}`.
pub const DEFAULT_EXTRACTION_PROMPT: &str = r#"Extract important information about {user_name} from the conversation below.

Conversation:
{conversation}

Return the extracted information as a JSON object using only these categories (omit any that do not apply):
- personal_info: basic personal details (name, age, occupation, ...) as an object
- interests: hobbies and interests, as a list
- preferences: an object with "likes" and "dislikes" lists
- goals: goals and plans, as a list
- experiences: notable experiences and events, as a list
- relationships: people in the user's life, as a list
- habits: daily habits, as a list
- concerns: things the user worries about, as a list

Return only the JSON object, with no other text:"#;

/// Render the canonical two-line transcript of an exchange.
pub fn render_transcript(user_input: &str, assistant_response: &str) -> String {
    format!("user: {user_input}\nassistant: {assistant_response}")
}

/// Issues the extraction call and parses its answer.
#[derive(Debug, Clone)]
pub struct FactExtractor {
    template: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Default for FactExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACTION_PROMPT)
    }
}

impl FactExtractor {
    /// Extractor using `template`; the provider's default model is used.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            model: String::new(),
            temperature: 0.7,
            max_tokens: 4096,
        }
    }

    /// Override sampling settings for the extraction call.
    pub fn with_sampling(mut self, model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        self.model = model.into();
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// The instruction sent for `transcript`.
    pub fn build_prompt(&self, user_name: &str, transcript: &str) -> String {
        self.template
            .replace("{user_name}", user_name)
            .replace("{conversation}", transcript)
    }

    /// One model call; errors from the provider or the parser are returned as-is.
    pub async fn extract(
        &self,
        provider: &dyn ProviderAdapter,
        user_name: &str,
        transcript: &str,
    ) -> Result<ExtractedFacts, MnemoError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![ProviderMessage::user(self.build_prompt(user_name, transcript))],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = provider.complete(request).await?;
        debug!(raw = %response.content, "extraction response");
        parse_extracted_facts(&response.content)
    }
}

/// Parse model output as a JSON object of facts.
///
/// A surrounding Markdown code fence is removed first. Anything that is not
/// then a JSON object is an [`MnemoError::Extraction`]; no attempt is made
/// to dig JSON out of prose.
pub fn parse_extracted_facts(text: &str) -> Result<ExtractedFacts, MnemoError> {
    let body = strip_code_fence(text.trim());

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(ExtractedFacts::new(map)),
        Ok(other) => Err(MnemoError::Extraction(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(MnemoError::Extraction(format!("invalid JSON: {e}"))),
    }
}

/// Strip a surrounding ```` ``` ```` or ```` ```json ```` fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
