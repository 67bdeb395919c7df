//! State threaded through the routing graph.
//!
//! One `RagState` is created per question and handed node to node by value:
//! each node receives the current state and returns a new one. Nothing is
//! shared between invocations.

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Answer-generation path chosen for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Answer from the indexed corpus.
    Docs,
    /// Answer from live web search.
    Web,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Docs => f.write_str("docs"),
            Route::Web => f.write_str("web"),
        }
    }
}

/// Pipeline state: question, retrieved context, routing flag, answer and debug sidecar.
///
/// Write-once discipline per field:
/// - `question`: set by [`RagState::new`], never changed.
/// - `retrieved_docs` / `retrieved_count`: set by the retrieve node.
/// - `use_web` / `judge_decision`: set by the judge (or agent) node.
/// - `answer`: set by whichever terminal node runs.
/// - `web_raw` / `web_context`: set by the web-fallback node only.
///
/// The debug fields are never read by routing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagState {
    pub question: String,
    pub retrieved_docs: Vec<Document>,
    pub use_web: bool,
    pub answer: String,

    pub retrieved_count: usize,
    pub judge_decision: Option<String>,
    pub web_raw: Option<String>,
    pub web_context: Option<String>,
}

impl RagState {
    /// Fresh state for one invocation.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn route(&self) -> Route {
        if self.use_web {
            Route::Web
        } else {
            Route::Docs
        }
    }

    /// Converts the terminal state into the invocation-boundary record.
    pub fn into_output(self) -> RagOutput {
        RagOutput {
            route: self.route(),
            answer: self.answer,
            retrieved_docs: self.retrieved_docs,
            use_web: self.use_web,
            retrieved_count: self.retrieved_count,
            judge_decision: self.judge_decision,
            web_raw: self.web_raw,
            web_context: self.web_context,
        }
    }
}

/// What callers (CLI, UI) read after one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagOutput {
    pub answer: String,
    pub route: Route,
    pub retrieved_docs: Vec<Document>,
    pub use_web: bool,
    pub retrieved_count: usize,
    pub judge_decision: Option<String>,
    pub web_raw: Option<String>,
    pub web_context: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_only_question() {
        let s = RagState::new("What is an agent?");
        assert_eq!(s.question, "What is an agent?");
        assert!(s.retrieved_docs.is_empty());
        assert!(!s.use_web);
        assert!(s.answer.is_empty());
        assert_eq!(s.retrieved_count, 0);
        assert!(s.judge_decision.is_none());
        assert!(s.web_raw.is_none());
        assert!(s.web_context.is_none());
    }

    /// **Scenario**: Two states built from the same question share no sequence storage.
    #[test]
    fn states_do_not_alias_docs() {
        let mut a = RagState::new("q");
        let b = RagState::new("q");
        a.retrieved_docs.push(Document::new("x", "s"));
        assert!(b.retrieved_docs.is_empty());
    }

    #[test]
    fn route_follows_use_web() {
        let mut s = RagState::new("q");
        assert_eq!(s.route(), Route::Docs);
        s.use_web = true;
        assert_eq!(s.route(), Route::Web);
        assert_eq!(Route::Web.to_string(), "web");
        assert_eq!(Route::Docs.to_string(), "docs");
    }

    #[test]
    fn into_output_carries_debug_fields() {
        let s = RagState {
            question: "q".into(),
            retrieved_docs: vec![],
            use_web: true,
            answer: "a".into(),
            retrieved_count: 0,
            judge_decision: Some("NO_DOCS".into()),
            web_raw: Some("{}".into()),
            web_context: Some(String::new()),
        };
        let out = s.into_output();
        assert_eq!(out.route, Route::Web);
        assert_eq!(out.answer, "a");
        assert_eq!(out.judge_decision.as_deref(), Some("NO_DOCS"));
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["route"], "web");
        assert_eq!(v["use_web"], true);
    }
}
