//! Compiled state graph: immutable, supports invoke only.
//!
//! Built by `StateGraph::compile`. Holds nodes, the entry node and the routing
//! map derived from explicit and conditional edges. Cloning is cheap (nodes are
//! `Arc`), and one compiled graph serves any number of concurrent invocations.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::RagError;

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state,
};
use super::node_middleware::{NodeFuture, NodeMiddleware};
use super::state_graph::END;
use super::{Next, NextEntry, Node};

/// Compiled graph: immutable structure, supports invoke only.
///
/// Runs from the first node; after each node, the conditional router (when the
/// node has one) or the node's returned `Next` chooses the next node. Nothing is
/// retried: the first node error ends the run.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) first_node_id: String,
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn execute_node(&self, node: Arc<dyn Node<S>>, state: S) -> Result<(S, Next), RagError> {
        match &self.middleware {
            Some(middleware) => {
                let node_id = node.id().to_string();
                let inner: Box<dyn FnOnce(S) -> NodeFuture<S> + Send> =
                    Box::new(move |s: S| -> NodeFuture<S> {
                        Box::pin(async move { node.run(s).await })
                    });
                middleware.around_run(&node_id, state, inner).await
            }
            None => node.run(state).await,
        }
    }

    /// Picks the node after `current_id`, or `None` to stop.
    fn resolve_next(&self, current_id: &str, state: &S, next: Next) -> Option<String> {
        let target = match self.next_map.get(current_id) {
            Some(NextEntry::Conditional(router)) => {
                let target = router.resolve_next(state);
                tracing::debug!(from = %current_id, to = %target, "conditional routing");
                Some(target)
            }
            Some(NextEntry::Unconditional(to)) => match next {
                Next::End => None,
                Next::Node(id) => Some(id),
                Next::Continue => Some(to.clone()),
            },
            None => match next {
                Next::Node(id) => Some(id),
                Next::Continue | Next::End => None,
            },
        };
        target.filter(|id| id != END)
    }

    /// Runs the graph with the given state until a node routes to END.
    ///
    /// Errors:
    /// - any node error, propagated unchanged (no partial state is returned);
    /// - `ExecutionFailed` for an empty graph, a route to an unknown node, or a
    ///   route back to an already executed node.
    pub async fn invoke(&self, state: S) -> Result<S, RagError> {
        if !self.nodes.contains_key(&self.first_node_id) {
            return Err(RagError::ExecutionFailed("empty graph".into()));
        }
        log_graph_start();

        let mut state = state;
        let mut current_id = self.first_node_id.clone();
        let mut visited: HashSet<String> = HashSet::new();

        loop {
            if !visited.insert(current_id.clone()) {
                let err = RagError::ExecutionFailed(format!("node revisited: {}", current_id));
                log_graph_error(&err);
                return Err(err);
            }
            let node = match self.nodes.get(&current_id) {
                Some(n) => Arc::clone(n),
                None => {
                    let err = RagError::ExecutionFailed(format!("unknown node: {}", current_id));
                    log_graph_error(&err);
                    return Err(err);
                }
            };

            log_node_start(&current_id);
            log_node_state(&current_id, &state);

            let (new_state, next) = match self.execute_node(node, state).await {
                Ok(output) => output,
                Err(e) => {
                    log_graph_error(&e);
                    return Err(e);
                }
            };
            log_node_complete(&current_id, &next);
            state = new_state;

            match self.resolve_next(&current_id, &state, next) {
                Some(id) => current_id = id,
                None => {
                    log_graph_complete();
                    return Ok(state);
                }
            }
        }
    }

    /// Node ids registered in this graph (unordered).
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }
}
