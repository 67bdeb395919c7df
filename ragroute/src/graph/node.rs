//! Graph node trait: one step in a StateGraph.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::RagError;

use super::Next;

/// One step in a graph: state in, (state out, next step).
///
/// Nodes are pure transformations over `S`: they take the state by value and
/// return a new one. Collaborators (retriever, LLM, search) are injected at
/// construction time, so a node holds no per-invocation data.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Node id (e.g. `"retrieve"`, `"judge"`). Must be unique within a graph.
    fn id(&self) -> &str;

    /// One step: state in, (state out, next step).
    async fn run(&self, state: S) -> Result<(S, Next), RagError>;
}
