//! Agent router: retrieve, then let the model choose its sources.
//!
//! The agent node offers two tools, `retriever` (the indexed corpus) and
//! `web_search` (general knowledge), and loops think → act until the model
//! answers in plain text or `max_steps` is reached. Tool output goes back to
//! the model as a user message.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::RagError;
use crate::graph::{CompilationError, CompiledStateGraph, Next, Node, StateGraph, END, START};
use crate::llm::{LlmClient, LlmUsage, ToolCall, ToolSpec};
use crate::message::Message;
use crate::nodes::prompts::web_context;
use crate::nodes::{RetrieveNode, RETRIEVE};
use crate::retriever::Retriever;
use crate::state::RagState;
use crate::web_search::{SearchDepth, SearchRequest, WebSearch};

use super::{Router, RouterDeps, RouterKind};

pub const AGENT: &str = "agent";

const RETRIEVER_TOOL: &str = "retriever";
const WEB_SEARCH_TOOL: &str = "web_search";
const MAX_TOOL_DOCS: usize = 8;
const DEFAULT_MAX_STEPS: usize = 5;
const NO_ANSWER: &str = "Could not generate answer";

const AGENT_SYSTEM_PROMPT: &str = "You are a question-answering agent. \
Prefer the 'retriever' tool for questions about the user's indexed documents; \
use 'web_search' for general knowledge. \
Reply with only the final useful answer.";

fn tool_specs() -> Vec<ToolSpec> {
    let schema = |what: &str| {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": what }
            },
            "required": ["query"]
        })
    };
    vec![
        ToolSpec {
            name: RETRIEVER_TOOL.to_string(),
            description: Some("Fetch passages from the indexed document store.".to_string()),
            input_schema: schema("Search query for the indexed documents"),
        },
        ToolSpec {
            name: WEB_SEARCH_TOOL.to_string(),
            description: Some("Search the web for general knowledge.".to_string()),
            input_schema: schema("Web search query"),
        },
    ]
}

/// Reads `query` from the tool arguments; falls back to the question when absent.
fn tool_query(call: &ToolCall, question: &str) -> String {
    serde_json::from_str::<serde_json::Value>(&call.arguments)
        .ok()
        .and_then(|v| v.get("query").and_then(|q| q.as_str()).map(str::to_string))
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| question.to_string())
}

/// Tool-choosing node. Sets `answer`, `use_web` (web tool used) and
/// `judge_decision` (`AGENT:<tools>` or `AGENT:NONE`).
pub struct AgentNode {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LlmClient>,
    web: Arc<dyn WebSearch>,
    search_depth: SearchDepth,
    max_results: u32,
    max_steps: usize,
}

/// Output of one web tool call, kept for the state's debug fields.
struct WebTrace {
    raw: String,
    context: String,
}

impl AgentNode {
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
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_search(mut self, depth: SearchDepth, max_results: u32) -> Self {
        self.search_depth = depth;
        self.max_results = max_results;
        self
    }

    /// Caps model turns per question (at least 1).
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    async fn run_retriever_tool(&self, query: &str) -> Result<String, RagError> {
        let docs = self.retriever.query(query).await?;
        if docs.is_empty() {
            return Ok("No documents found".to_string());
        }
        Ok(docs
            .iter()
            .take(MAX_TOOL_DOCS)
            .enumerate()
            .map(|(i, d)| format!("[{}] {}\n{}", i + 1, d.title(), d.content))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    async fn run_web_tool(&self, query: &str) -> Result<(String, WebTrace), RagError> {
        let request = SearchRequest::new(query)
            .with_depth(self.search_depth)
            .with_max_results(self.max_results);
        let response = self.web.search(&request).await?;
        let raw = serde_json::to_string_pretty(&response.raw)
            .map_err(|e| RagError::WebSearch(format!("payload not serializable: {}", e)))?;
        let context = web_context(&response);
        let output = if context.is_empty() {
            "No results found".to_string()
        } else {
            context.clone()
        };
        Ok((output, WebTrace { raw, context }))
    }
}

#[async_trait]
impl Node<RagState> for AgentNode {
    fn id(&self) -> &str {
        AGENT
    }

    async fn run(&self, state: RagState) -> Result<(RagState, Next), RagError> {
        let tools = tool_specs();
        let mut messages = vec![
            Message::system(AGENT_SYSTEM_PROMPT),
            Message::user(state.question.clone()),
        ];
        let mut used: Vec<&'static str> = Vec::new();
        let mut web_trace: Option<WebTrace> = None;
        let mut last_text = String::new();
        let mut usage = LlmUsage::default();

        for step in 0..self.max_steps {
            let response = self.llm.invoke_with_tools(&messages, &tools).await?;
            debug!(step, tool_calls = response.tool_calls.len(), "agent turn");
            if let Some(u) = &response.usage {
                usage.add(u);
            }
            if !response.content.trim().is_empty() {
                last_text = response.content.clone();
            }
            messages.push(Message::assistant(response.content));
            if response.tool_calls.is_empty() {
                break;
            }
            if step + 1 == self.max_steps {
                warn!(
                    max_steps = self.max_steps,
                    skipped_tool_calls = response.tool_calls.len(),
                    "agent stopped at step limit"
                );
                break;
            }

            for call in &response.tool_calls {
                let query = tool_query(call, &state.question);
                let (name, output) = match call.name.as_str() {
                    RETRIEVER_TOOL => (RETRIEVER_TOOL, self.run_retriever_tool(&query).await?),
                    WEB_SEARCH_TOOL => {
                        let (output, trace) = self.run_web_tool(&query).await?;
                        web_trace = Some(trace);
                        (WEB_SEARCH_TOOL, output)
                    }
                    other => {
                        warn!(tool = %other, "agent requested unknown tool");
                        messages.push(Message::user(format!("Unknown tool: {}", other)));
                        continue;
                    }
                };
                if !used.contains(&name) {
                    used.push(name);
                }
                messages.push(Message::user(format!(
                    "Tool {} returned:\n{}",
                    name, output
                )));
            }
        }

        let decision = if used.is_empty() {
            "AGENT:NONE".to_string()
        } else {
            format!("AGENT:{}", used.join(","))
        };
        let use_web = used.contains(&WEB_SEARCH_TOOL);
        let answer = if last_text.trim().is_empty() {
            NO_ANSWER.to_string()
        } else {
            last_text
        };
        info!(
            judge_decision = %decision,
            use_web,
            total_tokens = usage.total_tokens,
            "agent answered"
        );

        let (web_raw, web_context) = match web_trace {
            Some(t) => (Some(t.raw), Some(t.context)),
            None => (None, None),
        };
        let new_state = RagState {
            answer,
            use_web,
            judge_decision: Some(decision),
            web_raw,
            web_context,
            ..state
        };
        Ok((new_state, Next::Continue))
    }
}

/// Routes with retrieve → agent.
pub struct AgentRouter {
    graph: CompiledStateGraph<RagState>,
}

impl AgentRouter {
    pub fn new(deps: RouterDeps) -> Result<Self, CompilationError> {
        Self::with_max_steps(deps, DEFAULT_MAX_STEPS)
    }

    pub fn with_max_steps(deps: RouterDeps, max_steps: usize) -> Result<Self, CompilationError> {
        let mut graph = match &deps.middleware {
            Some(m) => StateGraph::<RagState>::new().with_middleware(Arc::clone(m)),
            None => StateGraph::<RagState>::new(),
        };
        let agent = AgentNode::new(
            Arc::clone(&deps.retriever),
            Arc::clone(&deps.llm),
            Arc::clone(&deps.web),
        )
        .with_search(deps.search_depth, deps.max_results)
        .with_max_steps(max_steps);

        graph
            .add_node(RETRIEVE, Arc::new(RetrieveNode::new(Arc::clone(&deps.retriever))))
            .add_node(AGENT, Arc::new(agent))
            .add_edge(START, RETRIEVE)
            .add_edge(RETRIEVE, AGENT)
            .add_edge(AGENT, END);
        Ok(Self {
            graph: graph.compile()?,
        })
    }
}

#[async_trait]
impl Router for AgentRouter {
    fn kind(&self) -> RouterKind {
        RouterKind::Agent
    }

    async fn ask(&self, question: &str) -> Result<RagState, RagError> {
        self.graph.invoke(RagState::new(question)).await
    }
}
