//! Prompt contracts and context builders for the answering nodes.

use crate::document::Document;
use crate::web_search::SearchResponse;

/// Characters of each document shown to the judge.
pub const JUDGE_CONTEXT_CHARS: usize = 500;

/// `judge_decision` recorded when retrieval returned nothing.
pub const NO_DOCS: &str = "NO_DOCS";

/// Judge context: the first [`JUDGE_CONTEXT_CHARS`] characters of each document,
/// in retrieval order, newline-joined. Never splits a character.
pub fn judge_context(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.content.chars().take(JUDGE_CONTEXT_CHARS).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Doc-answer context: every document's full content, newline-joined.
pub fn doc_context(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Web context: the synthesized answer when non-empty, else the content of each
/// result that has some, joined by a blank line.
///
/// Empty when the provider returned neither.
pub fn web_context(response: &SearchResponse) -> String {
    match response.answer.as_deref() {
        Some(answer) if !answer.is_empty() => answer.to_string(),
        _ => response
            .results
            .iter()
            .filter_map(|r| r.content.as_deref().filter(|c| !c.is_empty()))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Normalizes a judge reply and derives the routing flag.
///
/// Returns `(decision, use_web)` where `decision` is the trimmed, uppercased
/// reply and `use_web` is true unless the decision starts with `YES`.
pub fn parse_judge_decision(reply: &str) -> (String, bool) {
    let decision = reply.trim().to_uppercase();
    let use_web = !decision.starts_with("YES");
    (decision, use_web)
}

pub fn judge_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a strict routing controller.\n\
         \n\
         Decide whether the document context below contains enough factual\n\
         information to fully answer the question.\n\
         \n\
         If the answer is clearly present, reply YES.\n\
         If the answer is missing, unrelated, vague, or needs outside knowledge, reply NO.\n\
         \n\
         Question:\n{question}\n\
         \n\
         Document context:\n{context}\n\
         \n\
         Answer ONLY YES or NO."
    )
}

pub fn doc_answer_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the question using the information below.\n\
         \n\
         If the question is subjective or comparative:\n\
         - Clearly state that there is no single best answer\n\
         - Summarize the commonly accepted options\n\
         - Explain when each is preferred\n\
         \n\
         Context:\n{context}\n\
         \n\
         Question:\n{question}"
    )
}

pub fn web_answer_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the question using the information below.\n\
         If there is no single best answer, explain the trade-offs and list the\n\
         commonly used options with a brief justification for each.\n\
         \n\
         Web context:\n{context}\n\
         \n\
         Question:\n{question}"
    )
}
