//! Web-search collaborator.
//!
//! The web-fallback node and the agent's `web_search` tool call [`WebSearch`].
//! [`TavilyClient`] talks to the Tavily search API; [`MockWebSearch`] returns a
//! fixed response for tests.

mod mock;
mod tavily;

pub use mock::MockWebSearch;
pub use tavily::{TavilyClient, TAVILY_BASE_URL};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RagError;

/// Search depth requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    #[default]
    Advanced,
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchDepth::Basic => f.write_str("basic"),
            SearchDepth::Advanced => f.write_str("advanced"),
        }
    }
}

impl FromStr for SearchDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "advanced" => Ok(Self::Advanced),
            _ => Err(format!("unknown search depth: {} (use basic or advanced)", s)),
        }
    }
}

/// One search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub depth: SearchDepth,
    pub max_results: u32,
}

impl SearchRequest {
    /// Deep search with a cap of 5 results, as used by the web-fallback path.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            depth: SearchDepth::Advanced,
            max_results: 5,
        }
    }

    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

/// One hit. `content` is optional: providers may omit the snippet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Search response: optional synthesized answer, ordered results and the raw payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    pub answer: Option<String>,
    pub results: Vec<SearchResult>,
    /// Payload exactly as received, kept for diagnostics.
    pub raw: serde_json::Value,
}

impl SearchResponse {
    /// Builds a response from a provider payload of the form
    /// `{"answer": "...", "results": [{"title", "url", "content"}, ...]}`.
    ///
    /// Missing or null `answer` and `results` are accepted; anything else that
    /// does not fit the shape is a `WebSearch` error.
    pub fn from_raw(raw: serde_json::Value) -> Result<Self, RagError> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(default)]
            answer: Option<String>,
            #[serde(default)]
            results: Option<Vec<SearchResult>>,
        }
        let wire: Wire = serde_json::from_value(raw.clone())
            .map_err(|e| RagError::WebSearch(format!("unexpected payload: {}", e)))?;
        Ok(Self {
            answer: wire.answer,
            results: wire.results.unwrap_or_default(),
            raw,
        })
    }
}

/// Web-search capability. Implementations are shared across concurrent invocations.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Runs one search. Called at most once per invocation; failures are not retried.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, RagError>;
}
