//! Static guidance store
//!
//! A read-only keyed collection of coaching guidance entries, loaded once at
//! startup and never mutated at runtime. Entries enrich the AI prompt with
//! category-specific coaching notes, and check-in style entries contribute
//! the follow-up question and answer options surfaced to the caller.

use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::path::Path;

/// Entry kind marking a check-in entry with a question and fixed options
const CHECKIN_KIND: &str = "multi_category_checkin";

/// An immutable guidance entry
///
/// Entries match a dominant category either via `category` (single) or
/// `categories` (multi). Check-in entries additionally carry a question and
/// a fixed set of answer options.
#[derive(Debug, Clone, Deserialize)]
pub struct GuidanceChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl GuidanceChunk {
    fn matches(&self, category: &str) -> bool {
        if self.category.as_deref() == Some(category) {
            return true;
        }
        self.categories
            .as_ref()
            .is_some_and(|cats| cats.iter().any(|c| c == category))
    }

    fn is_checkin(&self) -> bool {
        self.kind.as_deref() == Some(CHECKIN_KIND)
    }
}

/// The guidance store, loaded once for the process lifetime
pub struct KnowledgeBase {
    chunks: Vec<GuidanceChunk>,
}

impl KnowledgeBase {
    /// Load the store from a JSON file at startup
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read knowledge base {}: {e}",
                path.display()
            ))
        })?;

        let chunks: Vec<GuidanceChunk> = serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!(
                "Failed to parse knowledge base {}: {e}",
                path.display()
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            count = chunks.len(),
            "Loaded knowledge base"
        );

        Ok(Self { chunks })
    }

    /// Build a store directly from entries (used by tests)
    pub fn from_chunks(chunks: Vec<GuidanceChunk>) -> Self {
        Self { chunks }
    }

    /// Entries relevant to a dominant category
    pub fn relevant_chunks(&self, category: &str) -> Vec<&GuidanceChunk> {
        self.chunks.iter().filter(|c| c.matches(category)).collect()
    }

    /// Plain-text guidance block for the prompt
    ///
    /// Joins matching entry texts with `{user_name}` substituted, and
    /// appends question plus options for check-in entries. Empty string when
    /// nothing matches.
    pub fn guidance_text(&self, category: &str, user_name: &str) -> String {
        let mut parts = Vec::new();

        for chunk in self.relevant_chunks(category) {
            let text = chunk.text.replace("{user_name}", user_name);
            if !text.is_empty() {
                parts.push(text);
            }

            if chunk.is_checkin() {
                if let (Some(question), Some(options)) = (&chunk.question, &chunk.options) {
                    let option_lines = options
                        .iter()
                        .map(|opt| format!("- {opt}"))
                        .collect::<Vec<_>>()
                        .join("\n");
                    parts.push(format!("{question}\n{option_lines}"));
                }
            }
        }

        parts.join("\n\n")
    }

    /// First check-in entry for a category, if any
    pub fn checkin_for_category(&self, category: &str) -> Option<&GuidanceChunk> {
        self.relevant_chunks(category)
            .into_iter()
            .find(|c| c.is_checkin())
    }
}
