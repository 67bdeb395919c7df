//! The four answering nodes: retrieve, judge, doc answer, web fallback.
//!
//! Each node is a `Node<RagState>` holding its collaborators behind `Arc`; it takes
//! the state by value and returns the next state. Wiring lives in
//! [`crate::router::build_judge_graph`].

mod doc_answer;
mod judge;
pub mod prompts;
mod retrieve;
mod web_fallback;

pub use doc_answer::DocAnswerNode;
pub use judge::JudgeNode;
pub use retrieve::RetrieveNode;
pub use web_fallback::WebFallbackNode;

/// Node ids used in the answering graph.
pub const RETRIEVE: &str = "retrieve";
pub const JUDGE: &str = "judge";
pub const DOC_ANSWER: &str = "doc_answer";
pub const WEB: &str = "web";

use crate::error::RagError;

/// A terminal node must produce a non-empty answer.
fn ensure_answer(node_id: &str, answer: &str) -> Result<(), RagError> {
    if answer.trim().is_empty() {
        return Err(RagError::ExecutionFailed(format!(
            "{} produced an empty answer",
            node_id
        )));
    }
    Ok(())
}
