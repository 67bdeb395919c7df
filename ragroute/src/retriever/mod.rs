//! Retriever collaborator: question in, relevance-ordered documents out.
//!
//! Ranking is the retriever's business; the pipeline only records what comes back.

mod embedder;
mod in_memory;
mod openai_embedder;

pub use embedder::{Embedder, HashEmbedder};
pub use in_memory::InMemoryRetriever;
pub use openai_embedder::OpenAIEmbedder;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::RagError;

/// Nearest-neighbor query over an indexed corpus.
///
/// An empty result is valid and routes the question to the web. A failure is fatal
/// for the invocation and is not retried.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn query(&self, question: &str) -> Result<Vec<Document>, RagError>;
}

/// Returns the same documents for every question.
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    docs: Vec<Document>,
}

impl StaticRetriever {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    /// Retriever that never finds anything.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn query(&self, _question: &str) -> Result<Vec<Document>, RagError> {
        Ok(self.docs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_retriever_returns_fixed_docs_in_order() {
        let r = StaticRetriever::new(vec![Document::new("a", "U1"), Document::new("b", "U2")]);
        let docs = r.query("anything").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source(), "U1");
        assert_eq!(docs[1].source(), "U2");
        assert!(StaticRetriever::empty().query("x").await.unwrap().is_empty());
    }
}
