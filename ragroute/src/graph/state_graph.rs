//! State graph: nodes + explicit edges (from → to) and optional conditional edges.
//!
//! Add nodes with `add_node`, define the wiring with `add_edge(from, to)` using
//! `START` and `END` for graph entry/exit, and `add_conditional_edges` to route on
//! state. Then `compile` to get a `CompiledStateGraph`.
//!
//! # Conditional edges
//!
//! From a source node, a routing function `(state) -> key` is called; the key is
//! used as the next node id, or looked up in an optional path map. A node must have
//! either one outgoing `add_edge` or `add_conditional_edges`, not both.
//!
//! # Acyclic
//!
//! Compiled graphs never loop: `compile` rejects any cycle reachable through plain
//! edges or path-map targets, and the executor refuses to revisit a node.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

/// State graph: nodes plus explicit edges and optional conditional edges.
///
/// Generic over state type `S`. Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Edges (from_id, to_id). A node may have one outgoing edge or conditional_edges, not both.
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            middleware: None,
        }
    }

    /// Attaches node middleware; `compile()` hands it to the compiled graph.
    pub fn with_middleware(self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        Self {
            middleware: Some(middleware),
            ..self
        }
    }

    /// Adds a node; id must be unique. Replaces if same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an edge from `from_id` to `to_id`. Use `START` / `END` for entry / exit.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds conditional edges from `source`: next node is determined by `path(state)`.
    ///
    /// - When `path_map` is `None`, the return value of `path` is the next node id (or END).
    /// - When `path_map` is `Some(map)`, the return value is the key; next node is
    ///   `map[key]` if present, otherwise the key itself.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// graph.add_conditional_edges(
    ///     "judge",
    ///     Arc::new(|s: &RagState| -> String { if s.use_web { "web".into() } else { "doc_answer".into() } }),
    ///     Some([("web".into(), "web".into()), ("doc_answer".into(), "doc_answer".into())].into_iter().collect()),
    /// );
    /// ```
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    /// Builds the executable graph after validating the wiring.
    ///
    /// Returns `CompilationError` when an edge references an unknown node, START has
    /// zero or several edges, END is unreachable, a node has two outgoing edges or both
    /// an edge and conditional edges, a path-map target is unknown, or a cycle exists.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if let Some(ref path_map) = router.path_map {
                for target in path_map.values() {
                    if target != END && !self.nodes.contains_key(target) {
                        return Err(CompilationError::InvalidConditionalPathMap(target.clone()));
                    }
                }
            }
        }

        let start_edges: Vec<&String> = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t)
            .collect();
        let first = match start_edges.as_slice() {
            [] => return Err(CompilationError::MissingStart),
            [only] => (*only).clone(),
            _ => {
                return Err(CompilationError::InvalidChain(
                    "multiple edges from START (branch)".into(),
                ))
            }
        };

        let has_end = self.edges.iter().any(|(_, t)| t == END)
            || self.conditional_edges.values().any(|r| {
                r.path_map
                    .as_ref()
                    .map_or(true, |m| m.values().any(|v| v == END))
            });
        if !has_end {
            return Err(CompilationError::MissingEnd);
        }

        let mut next_map: HashMap<String, NextEntry<S>> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(f, _)| f.as_str() != START) {
            if next_map
                .insert(from.clone(), NextEntry::Unconditional(to.clone()))
                .is_some()
            {
                return Err(CompilationError::InvalidChain(format!(
                    "duplicate edge from {} (branch)",
                    from
                )));
            }
        }
        for (source, router) in &self.conditional_edges {
            if next_map.contains_key(source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(
                    source.clone(),
                ));
            }
            next_map.insert(source.clone(), NextEntry::Conditional(router.clone()));
        }

        detect_cycle(&first, &next_map)?;

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            first_node_id: first,
            next_map,
            middleware: self.middleware,
        })
    }
}

/// Statically known successors of `id`: the plain edge target or every path-map target.
fn successors<S>(id: &str, next_map: &HashMap<String, NextEntry<S>>) -> Vec<String>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    match next_map.get(id) {
        Some(NextEntry::Unconditional(to)) => vec![to.clone()],
        Some(NextEntry::Conditional(router)) => router.targets().unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Depth-first search from the entry node; a back edge to a node on the current
/// path is a cycle.
fn detect_cycle<S>(
    first: &str,
    next_map: &HashMap<String, NextEntry<S>>,
) -> Result<(), CompilationError>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn visit<S>(
        id: &str,
        next_map: &HashMap<String, NextEntry<S>>,
        on_path: &mut HashSet<String>,
        done: &mut HashSet<String>,
    ) -> Result<(), CompilationError>
    where
        S: Clone + Send + Sync + Debug + 'static,
    {
        if id == END || done.contains(id) {
            return Ok(());
        }
        if !on_path.insert(id.to_string()) {
            return Err(CompilationError::Cycle(id.to_string()));
        }
        for next in successors(id, next_map) {
            visit(&next, next_map, on_path, done)?;
        }
        on_path.remove(id);
        done.insert(id.to_string());
        Ok(())
    }

    visit(first, next_map, &mut HashSet::new(), &mut HashSet::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::error::RagError;
    use crate::graph::{Next, Node};

    #[derive(Clone, Debug)]
    #[allow(dead_code)]
    struct DummyState(i32);

    #[derive(Clone)]
    struct DummyNode(&'static str);

    #[async_trait]
    impl Node<DummyState> for DummyNode {
        fn id(&self) -> &str {
            self.0
        }
        async fn run(&self, state: DummyState) -> Result<(DummyState, Next), RagError> {
            Ok((state, Next::Continue))
        }
    }

    fn two_node_graph() -> StateGraph<DummyState> {
        let mut graph = StateGraph::<DummyState>::new();
        graph.add_node("a", Arc::new(DummyNode("a")));
        graph.add_node("b", Arc::new(DummyNode("b")));
        graph
    }

    #[test]
    fn compile_linear_chain_ok() {
        let mut graph = two_node_graph();
        graph.add_edge(START, "a").add_edge("a", "b").add_edge("b", END);
        assert!(graph.compile().is_ok());
    }

    #[test]
    fn compile_fails_on_unknown_node() {
        let mut graph = two_node_graph();
        graph.add_edge(START, "a").add_edge("a", "zzz");
        match graph.compile() {
            Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "zzz"),
            Err(e) => panic!("expected NodeNotFound, got {:?}", e),
            Ok(_) => panic!("expected compile error"),
        }
    }

    #[test]
    fn compile_fails_without_start() {
        let mut graph = two_node_graph();
        graph.add_edge("a", END);
        assert!(matches!(graph.compile(), Err(CompilationError::MissingStart)));
    }

    #[test]
    fn compile_fails_without_end() {
        let mut graph = two_node_graph();
        graph.add_edge(START, "a").add_edge("a", "b");
        assert!(matches!(graph.compile(), Err(CompilationError::MissingEnd)));
    }

    #[test]
    fn compile_fails_on_duplicate_from() {
        let mut graph = two_node_graph();
        graph
            .add_edge(START, "a")
            .add_edge("a", "b")
            .add_edge("a", END)
            .add_edge("b", END);
        assert!(matches!(
            graph.compile(),
            Err(CompilationError::InvalidChain(_))
        ));
    }

    /// **Scenario**: Compile fails when a node has both an outgoing edge and conditional edges.
    #[test]
    fn compile_fails_when_node_has_both_edge_and_conditional() {
        let mut graph = two_node_graph();
        graph.add_edge(START, "a");
        graph.add_edge("a", "b");
        graph.add_edge("b", END);
        graph.add_conditional_edges(
            "a",
            Arc::new(|_| "b".to_string()),
            Some([("b".to_string(), "b".to_string())].into_iter().collect()),
        );
        match graph.compile() {
            Err(CompilationError::NodeHasBothEdgeAndConditional(id)) => assert_eq!(id, "a"),
            Err(e) => panic!("expected NodeHasBothEdgeAndConditional(a), got {:?}", e),
            Ok(_) => panic!("expected compile error"),
        }
    }

    /// **Scenario**: Compile fails when conditional path_map references a non-existent node.
    #[test]
    fn compile_fails_when_conditional_path_map_has_invalid_target() {
        let mut graph = two_node_graph();
        graph.add_edge(START, "a");
        graph.add_conditional_edges(
            "a",
            Arc::new(|_| "x".to_string()),
            Some(
                [("x".to_string(), "nonexistent".to_string())]
                    .into_iter()
                    .collect(),
            ),
        );
        match graph.compile() {
            Err(CompilationError::InvalidConditionalPathMap(id)) => assert_eq!(id, "nonexistent"),
            Err(e) => panic!("expected InvalidConditionalPathMap, got {:?}", e),
            Ok(_) => panic!("expected compile error"),
        }
    }

    /// **Scenario**: A conditional edge pointing back to an earlier node is a cycle.
    #[test]
    fn compile_fails_on_cycle_through_conditional() {
        let mut graph = two_node_graph();
        graph.add_edge(START, "a").add_edge("a", "b");
        graph.add_conditional_edges(
            "b",
            Arc::new(|_| "again".to_string()),
            Some(
                [
                    ("again".to_string(), "a".to_string()),
                    ("done".to_string(), END.to_string()),
                ]
                .into_iter()
                .collect(),
            ),
        );
        match graph.compile() {
            Err(CompilationError::Cycle(id)) => assert_eq!(id, "a"),
            Err(e) => panic!("expected Cycle, got {:?}", e),
            Ok(_) => panic!("expected compile error"),
        }
    }

    #[test]
    fn compile_diamond_is_not_a_cycle() {
        let mut graph = two_node_graph();
        graph.add_node("c", Arc::new(DummyNode("c")));
        graph.add_node("d", Arc::new(DummyNode("d")));
        graph.add_edge(START, "a");
        graph.add_conditional_edges(
            "a",
            Arc::new(|_| "b".to_string()),
            Some(
                [
                    ("b".to_string(), "b".to_string()),
                    ("c".to_string(), "c".to_string()),
                ]
                .into_iter()
                .collect(),
            ),
        );
        graph.add_edge("b", "d").add_edge("c", "d").add_edge("d", END);
        assert!(graph.compile().is_ok());
    }
}
