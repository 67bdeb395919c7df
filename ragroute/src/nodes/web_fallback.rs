//! Web-fallback node: search the web, derive a context, answer from it.
//!
//! The raw payload and the derived context are kept on the state for diagnostics.
//! An empty context (no synthesized answer, no snippets) is passed to the model
//! as-is.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::RagError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::RagState;
use crate::web_search::{SearchDepth, SearchRequest, WebSearch};

use super::prompts::{web_answer_prompt, web_context};
use super::{ensure_answer, WEB};

pub struct WebFallbackNode {
    search: Arc<dyn WebSearch>,
    llm: Arc<dyn LlmClient>,
    depth: SearchDepth,
    max_results: u32,
}

impl WebFallbackNode {
    /// Deep search capped at 5 results.
    pub fn new(search: Arc<dyn WebSearch>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            search,
            llm,
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

#[async_trait]
impl Node<RagState> for WebFallbackNode {
    fn id(&self) -> &str {
        WEB
    }

    async fn run(&self, state: RagState) -> Result<(RagState, Next), RagError> {
        let request = SearchRequest::new(state.question.clone())
            .with_depth(self.depth)
            .with_max_results(self.max_results);
        let response = self.search.search(&request).await?;

        let web_raw = serde_json::to_string_pretty(&response.raw)
            .map_err(|e| RagError::WebSearch(format!("payload not serializable: {}", e)))?;
        let context = web_context(&response);
        if context.is_empty() {
            warn!("web search returned no answer and no snippets; answering from empty context");
        }
        info!(
            results = response.results.len(),
            web_context_len = context.len(),
            "web context derived"
        );

        let prompt = web_answer_prompt(&state.question, &context);
        let reply = self.llm.invoke(&[Message::user(prompt)]).await?;
        ensure_answer(WEB, &reply.content)?;

        let new_state = RagState {
            answer: reply.content,
            web_raw: Some(web_raw),
            web_context: Some(context),
            ..state
        };
        Ok((new_state, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::web_search::MockWebSearch;

    fn web_state() -> RagState {
        RagState {
            use_web: true,
            judge_decision: Some("NO_DOCS".into()),
            ..RagState::new("Who won the 2022 World Cup?")
        }
    }

    #[tokio::test]
    async fn uses_synthesized_answer_as_context() {
        let web = Arc::new(MockWebSearch::with_answer("Argentina won."));
        let llm = Arc::new(MockLlm::with_reply("Argentina."));
        let node = WebFallbackNode::new(web.clone(), llm.clone());
        let (out, _) = node.run(web_state()).await.unwrap();

        assert_eq!(out.answer, "Argentina.");
        assert_eq!(out.web_context.as_deref(), Some("Argentina won."));
        let raw: serde_json::Value =
            serde_json::from_str(out.web_raw.as_deref().unwrap()).unwrap();
        assert_eq!(raw["answer"], "Argentina won.");
        assert!(llm.calls()[0][0].content().contains("Web context:\nArgentina won."));

        let req = &web.requests()[0];
        assert_eq!(req.query, "Who won the 2022 World Cup?");
        assert_eq!(req.depth, SearchDepth::Advanced);
        assert_eq!(req.max_results, 5);
    }

    #[tokio::test]
    async fn joins_snippets_when_no_answer() {
        let web = Arc::new(MockWebSearch::with_snippets(&["first", "second"]));
        let node = WebFallbackNode::new(web, Arc::new(MockLlm::with_reply("ok")));
        let (out, _) = node.run(web_state()).await.unwrap();
        assert_eq!(out.web_context.as_deref(), Some("first\n\nsecond"));
    }

    /// **Scenario**: Neither answer nor snippets: empty context, generation still runs.
    #[tokio::test]
    async fn empty_context_still_generates() {
        let web = Arc::new(MockWebSearch::new(serde_json::json!({"results": []})));
        let llm = Arc::new(MockLlm::with_reply("I could not find information."));
        let node = WebFallbackNode::new(web, llm.clone());
        let (out, _) = node.run(web_state()).await.unwrap();
        assert_eq!(out.web_context.as_deref(), Some(""));
        assert_eq!(out.answer, "I could not find information.");
        assert_eq!(llm.call_count(), 1);
    }

    /// **Scenario**: Results that carry no content leave the context empty.
    #[tokio::test]
    async fn contentless_results_give_empty_context() {
        let web = Arc::new(MockWebSearch::new(serde_json::json!({
            "answer": null,
            "results": [
                {"title": "A", "url": "https://a.example"},
                {"title": "B", "url": "https://b.example", "content": null}
            ]
        })));
        let llm = Arc::new(MockLlm::with_reply("Nothing found."));
        let node = WebFallbackNode::new(web, llm.clone());
        let (out, _) = node.run(web_state()).await.unwrap();
        assert_eq!(out.web_context.as_deref(), Some(""));
        assert!(llm.calls()[0][0].content().contains("Web context:\n"));
        assert_eq!(out.answer, "Nothing found.");
    }

    #[tokio::test]
    async fn configured_depth_and_cap_are_sent() {
        let web = Arc::new(MockWebSearch::with_answer("a"));
        let node = WebFallbackNode::new(web.clone(), Arc::new(MockLlm::with_reply("ok")))
            .with_depth(SearchDepth::Basic)
            .with_max_results(3);
        node.run(web_state()).await.unwrap();
        let req = &web.requests()[0];
        assert_eq!(req.depth, SearchDepth::Basic);
        assert_eq!(req.max_results, 3);
    }

    /// **Scenario**: A search failure aborts before any model call.
    #[tokio::test]
    async fn search_failure_propagates_without_generation() {
        let llm = Arc::new(MockLlm::with_reply("unused"));
        let node = WebFallbackNode::new(Arc::new(MockWebSearch::failing("down")), llm.clone());
        let err = node.run(web_state()).await.unwrap_err();
        assert!(matches!(err, RagError::WebSearch(_)));
        assert_eq!(llm.call_count(), 0);
    }
}
