//! Shared helpers for routing integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ragroute::{
    Document, MockLlm, MockWebSearch, Next, NodeFuture, NodeMiddleware, RagError, RagState,
    RouterDeps, StaticRetriever,
};

/// Middleware recording the id of every node that runs, in order.
#[derive(Default)]
pub struct NodeTrail {
    pub visited: Mutex<Vec<String>>,
}

impl NodeTrail {
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeMiddleware<RagState> for NodeTrail {
    async fn around_run(
        &self,
        node_id: &str,
        state: RagState,
        inner: Box<dyn FnOnce(RagState) -> NodeFuture<RagState> + Send>,
    ) -> Result<(RagState, Next), RagError> {
        self.visited.lock().unwrap().push(node_id.to_string());
        inner(state).await
    }
}

pub fn agent_doc() -> Document {
    Document::new("An agent perceives and acts.", "U1")
}

/// Deps with a trail middleware attached; returns the trail for assertions.
pub fn deps_with_trail(
    docs: Vec<Document>,
    llm: Arc<MockLlm>,
    web: Arc<MockWebSearch>,
) -> (RouterDeps, Arc<NodeTrail>) {
    let trail = Arc::new(NodeTrail::default());
    let deps = RouterDeps::new(Arc::new(StaticRetriever::new(docs)), llm, web)
        .with_middleware(trail.clone());
    (deps, trail)
}
