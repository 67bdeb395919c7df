//! # ragroute
//!
//! Docs-first question answering with adaptive web fallback. One question flows
//! through a small **state-in, state-out** graph: retrieve from an indexed corpus,
//! judge whether the retrieved context is enough, then answer either from the
//! documents or from a live web search. The answer comes back together with a
//! debug trace (retrieved count, judge decision, raw web payload, web context).
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`]: build and run state graphs.
//! - [`nodes`]: [`RetrieveNode`], [`JudgeNode`], [`DocAnswerNode`], [`WebFallbackNode`] and their prompts.
//! - [`router`]: [`Router`] with [`JudgeRouter`] and [`AgentRouter`]; [`build_router`] picks one by [`RouterKind`].
//! - [`state`]: [`RagState`], [`RagOutput`], [`Route`].
//! - [`document`]: [`Document`] with required `source` metadata; [`load_corpus`].
//! - [`llm`]: [`LlmClient`] trait, [`MockLlm`], [`ChatOpenAI`].
//! - [`retriever`]: [`Retriever`] trait, [`StaticRetriever`], [`InMemoryRetriever`], embedders.
//! - [`web_search`]: [`WebSearch`] trait, [`TavilyClient`], [`MockWebSearch`].
//! - [`settings`]: [`RagSettings`] read from the environment.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ragroute::{build_router, MockLlm, MockWebSearch, RouterDeps, RouterKind, StaticRetriever};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let deps = RouterDeps::new(
//!     Arc::new(StaticRetriever::empty()),
//!     Arc::new(MockLlm::with_reply("Argentina won the 2022 World Cup.")),
//!     Arc::new(MockWebSearch::with_answer("Argentina beat France in the final.")),
//! );
//! let router = build_router(RouterKind::Judge, deps).unwrap();
//! let out = router.ask("Who won the 2022 World Cup?").await.unwrap().into_output();
//! println!("[{}] {}", out.route, out.answer);
//! # }
//! ```

pub mod document;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod nodes;
pub mod retriever;
pub mod router;
pub mod settings;
pub mod state;
pub mod web_search;

pub use document::{load_corpus, Document, Metadata};
pub use error::RagError;
pub use graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, Next, Node, NodeFuture,
    NodeMiddleware, StateGraph, END, START,
};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm, ToolCall, ToolChoiceMode, ToolSpec};
pub use message::Message;
pub use nodes::{DocAnswerNode, JudgeNode, RetrieveNode, WebFallbackNode};
pub use retriever::{
    Embedder, HashEmbedder, InMemoryRetriever, OpenAIEmbedder, Retriever, StaticRetriever,
};
pub use router::{
    build_judge_graph, build_router, AgentNode, AgentRouter, JudgeRouter, Router, RouterDeps,
    RouterKind,
};
pub use settings::{ConfigError, RagSettings};
pub use state::{RagOutput, RagState, Route};
pub use web_search::{
    MockWebSearch, SearchDepth, SearchRequest, SearchResponse, SearchResult, TavilyClient,
    WebSearch,
};
