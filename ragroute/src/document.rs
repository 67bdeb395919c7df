//! Document: one unit of retrieved or searched content plus its source metadata.
//!
//! Produced by retriever and web collaborators; immutable once produced. The
//! `source` key is required: deserializing a document without it fails.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RagError;

/// Metadata attached to a document. `source` is mandatory; any other string
/// keys (e.g. `title`, `language`) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Looks up a key; `"source"` resolves to the required field.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == "source" {
            return Some(&self.source);
        }
        self.extra.get(key).map(String::as_str)
    }
}

/// A unit of content with source metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(source),
        }
    }

    /// Adds an extra metadata entry (builder).
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.extra.insert(key.into(), value.into());
        self
    }

    pub fn source(&self) -> &str {
        &self.metadata.source
    }

    /// Display title: metadata `title` when present, else the source.
    pub fn title(&self) -> &str {
        self.metadata
            .extra
            .get("title")
            .map(String::as_str)
            .unwrap_or(&self.metadata.source)
    }
}

/// Reads a JSON array of already-chunked documents from `path`.
///
/// Each element is `{"content": "...", "metadata": {"source": "...", ...}}`.
pub fn load_corpus(path: &Path) -> Result<Vec<Document>, RagError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| RagError::Retrieval(format!("read corpus {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| RagError::Retrieval(format!("parse corpus {}: {}", path.display(), e)))
}
