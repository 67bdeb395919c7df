//! State graph: nodes + explicit edges and conditional edges, compile and invoke.
//!
//! Build a [`StateGraph`], compile it into an immutable [`CompiledStateGraph`], then
//! invoke it once per question. The answering graph itself is wired in
//! [`crate::router::build_judge_graph`].

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod logging_middleware;
mod next;
mod node;
mod node_middleware;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
};
pub use logging_middleware::LoggingNodeMiddleware;
pub use next::Next;
pub use node::Node;
pub use node_middleware::{NodeFuture, NodeMiddleware};
pub use state_graph::{StateGraph, END, START};
