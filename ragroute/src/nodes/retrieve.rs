//! Retrieve node: query the retriever and record what came back.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::RagError;
use crate::graph::{Next, Node};
use crate::retriever::Retriever;
use crate::state::RagState;

use super::RETRIEVE;

pub struct RetrieveNode {
    retriever: Arc<dyn Retriever>,
}

impl RetrieveNode {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Node<RagState> for RetrieveNode {
    fn id(&self) -> &str {
        RETRIEVE
    }

    async fn run(&self, state: RagState) -> Result<(RagState, Next), RagError> {
        let docs = self.retriever.query(&state.question).await?;
        info!(retrieved_count = docs.len(), "retrieved documents");
        let new_state = RagState {
            retrieved_count: docs.len(),
            retrieved_docs: docs,
            ..state
        };
        Ok((new_state, Next::Continue))
    }
}
