//! Logging middleware that reports node enter/exit around each node.run call.
//!
//! Used by the CLI in `--verbose` mode.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Instant;

use crate::error::RagError;
use crate::graph::Next;

use super::{NodeFuture, NodeMiddleware};

/// Middleware that logs node enter/exit (and elapsed time) around each node.run call.
///
/// Writes to stderr so stdout keeps only the answer. Generic over state type `S`;
/// only node_id and the outcome are logged.
pub struct LoggingNodeMiddleware<S> {
    _phantom: std::marker::PhantomData<S>,
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: Box<dyn FnOnce(S) -> NodeFuture<S> + Send>,
    ) -> Result<(S, Next), RagError> {
        eprintln!("[node] enter node={}", node_id);
        let started = Instant::now();
        let result = inner(state).await;
        let ms = started.elapsed().as_millis();
        match &result {
            Ok((_, next)) => eprintln!("[node] exit node={} next={:?} ms={}", node_id, next, ms),
            Err(e) => eprintln!("[node] exit node={} error={} ms={}", node_id, e, ms),
        }
        result
    }
}
