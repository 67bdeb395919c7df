//! Mock LLM for tests and the offline CLI mode.
//!
//! Returns scripted responses in order; the last one repeats. Every call
//! is recorded so tests can check how often the model was asked and with which
//! prompt (e.g. that the judge is never called when retrieval is empty).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::RagError;
use crate::llm::{LlmClient, LlmResponse, ToolCall, ToolSpec};
use crate::message::Message;

/// Mock LLM: scripted responses (last one repeats), call recording.
pub struct MockLlm {
    script: Mutex<VecDeque<LlmResponse>>,
    failure: Option<String>,
    calls: Mutex<Vec<Vec<Message>>>,
    offered_tools: Mutex<Vec<Vec<String>>>,
}

impl MockLlm {
    fn build(script: Vec<LlmResponse>, failure: Option<String>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            failure,
            calls: Mutex::new(Vec::new()),
            offered_tools: Mutex::new(Vec::new()),
        }
    }

    /// Mock that always answers with the same text and no tool calls.
    pub fn with_reply(content: impl Into<String>) -> Self {
        Self::build(vec![LlmResponse::text(content)], None)
    }

    /// Mock that returns the given responses in order, repeating the last one.
    /// An empty script makes every call fail.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self::build(responses, None)
    }

    /// Mock returning plain text replies in order.
    pub fn replies<I, T>(replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::scripted(replies.into_iter().map(LlmResponse::text).collect())
    }

    /// Mock whose every call fails with `RagError::Llm(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::build(Vec::new(), Some(message.into()))
    }

    /// Response requesting one tool call, for scripting agent turns.
    pub fn tool_call(name: &str, arguments: serde_json::Value) -> LlmResponse {
        LlmResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
                id: Some(format!("call-{}", name)),
            }],
            usage: None,
        }
    }

    /// Number of invocations so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Message lists of every invocation, oldest first.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Tool names offered on each `invoke_with_tools` call.
    pub fn offered_tools(&self) -> Vec<Vec<String>> {
        self.offered_tools
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn next_response(&self) -> Result<LlmResponse, RagError> {
        if let Some(msg) = &self.failure {
            return Err(RagError::Llm(msg.clone()));
        }
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.ok_or_else(|| RagError::Llm("mock script is empty".to_string()))
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, RagError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(messages.to_vec());
        self.next_response()
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, RagError> {
        self.offered_tools
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tools.iter().map(|t| t.name.clone()).collect());
        self.invoke(messages).await
    }
}
