//! Judge router: the deterministic answering graph.
//!
//! ```text
//! START → retrieve → judge ─┬─ use_web ──→ web ────────┬→ END
//!                           └─ otherwise → doc_answer ─┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RagError;
use crate::graph::{CompilationError, CompiledStateGraph, StateGraph, END, START};
use crate::nodes::{
    DocAnswerNode, JudgeNode, RetrieveNode, WebFallbackNode, DOC_ANSWER, JUDGE, RETRIEVE, WEB,
};
use crate::state::RagState;

use super::{Router, RouterDeps, RouterKind};

/// Wires retrieve → judge → {web | doc_answer} → END. The branch reads only `use_web`.
pub fn build_judge_graph(
    deps: &RouterDeps,
) -> Result<CompiledStateGraph<RagState>, CompilationError> {
    let mut graph = match &deps.middleware {
        Some(m) => StateGraph::<RagState>::new().with_middleware(Arc::clone(m)),
        None => StateGraph::<RagState>::new(),
    };
    let web = WebFallbackNode::new(Arc::clone(&deps.web), Arc::clone(&deps.llm))
        .with_depth(deps.search_depth)
        .with_max_results(deps.max_results);

    graph
        .add_node(RETRIEVE, Arc::new(RetrieveNode::new(Arc::clone(&deps.retriever))))
        .add_node(JUDGE, Arc::new(JudgeNode::new(Arc::clone(&deps.llm))))
        .add_node(DOC_ANSWER, Arc::new(DocAnswerNode::new(Arc::clone(&deps.llm))))
        .add_node(WEB, Arc::new(web))
        .add_edge(START, RETRIEVE)
        .add_edge(RETRIEVE, JUDGE)
        .add_edge(DOC_ANSWER, END)
        .add_edge(WEB, END);

    let path_map: HashMap<String, String> = [
        ("web".to_string(), WEB.to_string()),
        ("docs".to_string(), DOC_ANSWER.to_string()),
    ]
    .into_iter()
    .collect();
    graph.add_conditional_edges(
        JUDGE,
        Arc::new(|s: &RagState| -> String { s.route().to_string() }),
        Some(path_map),
    );
    graph.compile()
}

/// Routes with the judge graph.
pub struct JudgeRouter {
    graph: CompiledStateGraph<RagState>,
}

impl JudgeRouter {
    pub fn new(deps: RouterDeps) -> Result<Self, CompilationError> {
        Ok(Self {
            graph: build_judge_graph(&deps)?,
        })
    }
}

#[async_trait]
impl Router for JudgeRouter {
    fn kind(&self) -> RouterKind {
        RouterKind::Judge
    }

    async fn ask(&self, question: &str) -> Result<RagState, RagError> {
        self.graph.invoke(RagState::new(question)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::llm::MockLlm;
    use crate::retriever::StaticRetriever;
    use crate::web_search::MockWebSearch;

    #[test]
    fn judge_graph_has_the_four_nodes() {
        let deps = RouterDeps::new(
            Arc::new(StaticRetriever::empty()),
            Arc::new(MockLlm::with_reply("x")),
            Arc::new(MockWebSearch::with_answer("a")),
        );
        let graph = build_judge_graph(&deps).unwrap();
        let mut ids = graph.node_ids();
        ids.sort();
        assert_eq!(ids, vec![DOC_ANSWER, JUDGE, RETRIEVE, WEB]);
    }

    /// **Scenario**: Judge YES runs doc_answer only; the web is never searched.
    #[tokio::test]
    async fn yes_runs_doc_answer_only() {
        let web = Arc::new(MockWebSearch::with_answer("unused"));
        let llm = Arc::new(MockLlm::replies(["YES", "An agent perceives and acts."]));
        let router = JudgeRouter::new(RouterDeps::new(
            Arc::new(StaticRetriever::new(vec![Document::new(
                "An agent perceives and acts.",
                "U1",
            )])),
            llm.clone(),
            web.clone(),
        ))
        .unwrap();
        let out = router.ask("What is an agent?").await.unwrap();
        assert!(!out.use_web);
        assert_eq!(out.answer, "An agent perceives and acts.");
        assert_eq!(web.call_count(), 0);
        assert_eq!(llm.call_count(), 2);
        assert!(out.web_raw.is_none());
    }
}
