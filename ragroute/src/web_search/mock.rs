//! Fixed-response web search for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::RagError;
use crate::web_search::{SearchRequest, SearchResponse, WebSearch};

/// Returns a fixed response (or error) and records each request.
pub struct MockWebSearch {
    response: Result<serde_json::Value, String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockWebSearch {
    /// Mock answering every search with `raw`, parsed like a provider payload.
    pub fn new(raw: serde_json::Value) -> Self {
        Self {
            response: Ok(raw),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Mock with a synthesized answer and no results.
    pub fn with_answer(answer: &str) -> Self {
        Self::new(serde_json::json!({ "answer": answer, "results": [] }))
    }

    /// Mock with no synthesized answer and the given result snippets.
    pub fn with_snippets(snippets: &[&str]) -> Self {
        let results: Vec<serde_json::Value> = snippets
            .iter()
            .enumerate()
            .map(|(i, s)| {
                serde_json::json!({
                    "title": format!("Result {}", i + 1),
                    "url": format!("https://example.com/{}", i + 1),
                    "content": s,
                })
            })
            .collect();
        Self::new(serde_json::json!({ "answer": null, "results": results }))
    }

    /// Mock whose every search fails with `RagError::WebSearch(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl WebSearch for MockWebSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        match &self.response {
            Ok(raw) => SearchResponse::from_raw(raw.clone()),
            Err(msg) => Err(RagError::WebSearch(msg.clone())),
        }
    }
}
