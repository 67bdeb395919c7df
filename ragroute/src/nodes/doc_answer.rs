//! Doc-answer node: answer from the full retrieved context.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::RagError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::RagState;

use super::prompts::{doc_answer_prompt, doc_context};
use super::{ensure_answer, DOC_ANSWER};

pub struct DocAnswerNode {
    llm: Arc<dyn LlmClient>,
}

impl DocAnswerNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<RagState> for DocAnswerNode {
    fn id(&self) -> &str {
        DOC_ANSWER
    }

    async fn run(&self, state: RagState) -> Result<(RagState, Next), RagError> {
        let context = doc_context(&state.retrieved_docs);
        let prompt = doc_answer_prompt(&state.question, &context);
        let response = self.llm.invoke(&[Message::user(prompt)]).await?;
        ensure_answer(DOC_ANSWER, &response.content)?;
        info!(answer_len = response.content.len(), "answered from documents");

        let new_state = RagState {
            answer: response.content,
            ..state
        };
        Ok((new_state, Next::Continue))
    }
}
