//! Pipeline error types.
//!
//! Returned by `Node::run`, collaborator traits (`Retriever`, `LlmClient`, `WebSearch`)
//! and `CompiledStateGraph::invoke`. A collaborator failure aborts the invocation;
//! nothing in the pipeline retries.

use thiserror::Error;

/// Error raised while answering one question.
///
/// Empty retrieval, an ambiguous judge reply and an empty web context are **not**
/// errors; they are routing outcomes recorded on `RagState`.
#[derive(Debug, Error)]
pub enum RagError {
    /// The retriever collaborator failed (index unavailable, embedding call failed).
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// The language-model collaborator failed (transport, API error, no choices).
    #[error("language model call failed: {0}")]
    Llm(String),

    /// The web-search collaborator failed (transport, non-2xx status, bad payload).
    #[error("web search failed: {0}")]
    WebSearch(String),

    /// Executor-level failure (empty graph, unknown node, broken state invariant).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl RagError {
    /// Short label of the failing collaborator, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            RagError::Retrieval(_) => "retrieval",
            RagError::Llm(_) => "llm",
            RagError::WebSearch(_) => "web_search",
            RagError::ExecutionFailed(_) => "execution",
        }
    }
}
