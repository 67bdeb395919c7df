//! Conditional edges: route to the next node based on state.
//!
//! A source node has a routing function that reads the updated state and returns
//! a key; the key is either the next node id or looked up in an optional path map.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Router function: takes a reference to state and returns a routing key.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Conditional edge definition: routing function plus optional path map.
///
/// With a path map, `next = path_map[key]` when present, otherwise `key` itself.
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> ConditionalRouter<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(path: ConditionalRouterFn<S>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    /// Resolves the next node id (or END) from the current state.
    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        self.path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key)
    }

    /// Every target this router can produce, when known statically (path map present).
    pub(super) fn targets(&self) -> Option<Vec<String>> {
        self.path_map
            .as_ref()
            .map(|m| m.values().cloned().collect())
    }
}

/// How to determine the next node after a given node runs.
#[derive(Clone)]
pub enum NextEntry<S> {
    /// Single fixed next node (or END).
    Unconditional(String),
    /// Next node is decided by the router from state; the node's `Next` is ignored.
    Conditional(ConditionalRouter<S>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_next_uses_path_map_then_falls_back_to_key() {
        let router: ConditionalRouter<bool> = ConditionalRouter::new(
            Arc::new(|b: &bool| -> String { if *b { "web".into() } else { "docs".into() } }),
            Some([("web".to_string(), "web_fallback".to_string())].into_iter().collect()),
        );
        assert_eq!(router.resolve_next(&true), "web_fallback");
        assert_eq!(router.resolve_next(&false), "docs");
    }

    #[test]
    fn resolve_next_without_path_map_returns_key() {
        let router: ConditionalRouter<u8> =
            ConditionalRouter::new(Arc::new(|n: &u8| format!("n{}", n)), None);
        assert_eq!(router.resolve_next(&3), "n3");
        assert!(router.targets().is_none());
    }
}
