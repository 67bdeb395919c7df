//! Routing policies behind one "decide and answer" interface.
//!
//! - [`JudgeRouter`]: deterministic retrieve → judge → {web | doc_answer} graph.
//! - [`AgentRouter`]: retrieve, then a tool-choosing agent picking between the
//!   indexed corpus and web search.
//!
//! Callers pick one with [`RouterKind`] (from configuration) and [`build_router`].

mod agent;
mod judge;

pub use agent::{AgentNode, AgentRouter, AGENT};
pub use judge::{build_judge_graph, JudgeRouter};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RagError;
use crate::graph::{CompilationError, NodeMiddleware};
use crate::llm::LlmClient;
use crate::retriever::Retriever;
use crate::state::RagState;
use crate::web_search::{SearchDepth, WebSearch};

/// Decide-and-answer interface: one question in, terminal state out.
#[async_trait]
pub trait Router: Send + Sync {
    fn kind(&self) -> RouterKind;

    /// Answers one question with a fresh state. Collaborator failures abort the
    /// invocation with no partial answer.
    async fn ask(&self, question: &str) -> Result<RagState, RagError>;
}

/// Which routing policy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterKind {
    #[default]
    Judge,
    Agent,
}

impl fmt::Display for RouterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterKind::Judge => f.write_str("judge"),
            RouterKind::Agent => f.write_str("agent"),
        }
    }
}

impl FromStr for RouterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "judge" => Ok(Self::Judge),
            "agent" => Ok(Self::Agent),
            _ => Err(format!("unknown router: {} (use judge or agent)", s)),
        }
    }
}

/// Collaborators shared by every routing policy.
#[derive(Clone)]
pub struct RouterDeps {
    pub retriever: Arc<dyn Retriever>,
    pub llm: Arc<dyn LlmClient>,
    pub web: Arc<dyn WebSearch>,
    pub search_depth: SearchDepth,
    pub max_results: u32,
    pub middleware: Option<Arc<dyn NodeMiddleware<RagState>>>,
}

impl RouterDeps {
    /// Deep web search capped at 5 results, no middleware.
    pub fn new(
        retriever: Arc<dyn Retriever>,
        llm: Arc<dyn LlmClient>,
        web: Arc<dyn WebSearch>,
    ) -> Self {
        Self {
            retriever,
            llm,
            web,
            search_depth: SearchDepth::Advanced,
            max_results: 5,
            middleware: None,
        }
    }

    pub fn with_search(mut self, depth: SearchDepth, max_results: u32) -> Self {
        self.search_depth = depth;
        self.max_results = max_results;
        self
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn NodeMiddleware<RagState>>) -> Self {
        self.middleware = Some(middleware);
        self
    }
}

/// Builds the router selected by `kind`.
pub fn build_router(kind: RouterKind, deps: RouterDeps) -> Result<Box<dyn Router>, CompilationError> {
    let router: Box<dyn Router> = match kind {
        RouterKind::Judge => Box::new(JudgeRouter::new(deps)?),
        RouterKind::Agent => Box::new(AgentRouter::new(deps)?),
    };
    Ok(router)
}
