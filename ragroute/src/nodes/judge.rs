//! Judge node: decides whether the retrieved documents are enough to answer.
//!
//! No documents: hard fallback to the web (`NO_DOCS`) without calling the model.
//! Otherwise the model sees a bounded context and must reply YES or NO; anything
//! not starting with YES routes to the web.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::RagError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::RagState;

use super::prompts::{judge_context, judge_prompt, parse_judge_decision, NO_DOCS};
use super::JUDGE;

pub struct JudgeNode {
    llm: Arc<dyn LlmClient>,
}

impl JudgeNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<RagState> for JudgeNode {
    fn id(&self) -> &str {
        JUDGE
    }

    async fn run(&self, state: RagState) -> Result<(RagState, Next), RagError> {
        if state.retrieved_docs.is_empty() {
            info!(judge_decision = NO_DOCS, use_web = true, "hard fallback to web");
            let new_state = RagState {
                judge_decision: Some(NO_DOCS.to_string()),
                use_web: true,
                ..state
            };
            return Ok((new_state, Next::Continue));
        }

        let context = judge_context(&state.retrieved_docs);
        let prompt = judge_prompt(&state.question, &context);
        let reply = self.llm.invoke(&[Message::user(prompt)]).await?;
        let (decision, use_web) = parse_judge_decision(&reply.content);
        info!(judge_decision = %decision, use_web, "judged retrieved context");

        let new_state = RagState {
            judge_decision: Some(decision),
            use_web,
            ..state
        };
        Ok((new_state, Next::Continue))
    }
}
