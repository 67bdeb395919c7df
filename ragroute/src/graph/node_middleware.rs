//! Node middleware: wrap node.run with external async logic (around pattern).
//!
//! Set via `StateGraph::with_middleware` before compiling.

use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use crate::error::RagError;

use super::Next;

/// Boxed future returned by the wrapped node call.
pub type NodeFuture<S> = Pin<Box<dyn Future<Output = Result<(S, Next), RagError>> + Send>>;

/// Async middleware that wraps node.run.
///
/// `inner` is the actual node call and must be called exactly once; middleware
/// may observe or time it but must not retry it.
#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: Box<dyn FnOnce(S) -> NodeFuture<S> + Send>,
    ) -> Result<(S, Next), RagError>;
}
