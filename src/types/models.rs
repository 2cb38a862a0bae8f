use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Provider;

/// Index document path, relative to the repository root.
pub const METADATA_PATH: &str = "metadata.json";

/// Directory holding one content file per prompt.
pub const PROMPTS_DIR: &str = "prompts";

#[must_use]
pub fn content_path(filename: &str) -> String {
    format!("{PROMPTS_DIR}/{filename}")
}

/// Opaque version identifier handed out by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionToken(String);

impl RevisionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub provider: Provider,
    pub model: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataIndex {
    #[serde(default)]
    pub prompts: Vec<PromptRecord>,
}

impl MetadataIndex {
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&PromptRecord> {
        self.prompts.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.prompts.iter().position(|p| p.id == id)
    }
}

/// A record with its body attached.
///
/// `content` is `None` when the content file could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(flatten)]
    pub record: PromptRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Mutable fields submitted when creating or editing a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptInput {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub provider: Provider,
    pub model: String,
    pub content: String,
}

impl PromptInput {
    /// Trims tags, drops blank ones and removes duplicates (first occurrence wins).
    #[must_use]
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !out.iter().any(|t| t == tag) {
                out.push(tag.to_string());
            }
        }
        out
    }
}
