//! In-memory vector index: documents embedded once, questions ranked by cosine similarity.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::document::Document;
use crate::error::RagError;
use crate::retriever::{Embedder, Retriever};

/// Cosine top-k retriever over a fixed corpus.
///
/// The index is read-only after [`InMemoryRetriever::build`], so one instance can
/// serve concurrent questions.
pub struct InMemoryRetriever {
    embedder: Arc<dyn Embedder>,
    docs: Vec<Document>,
    vectors: Vec<Vec<f32>>,
    top_k: usize,
}

impl std::fmt::Debug for InMemoryRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRetriever")
            .field("documents", &self.docs.len())
            .field("dimension", &self.embedder.dimension())
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl InMemoryRetriever {
    /// Embeds every document's content and builds the index.
    pub async fn build(
        embedder: Arc<dyn Embedder>,
        docs: Vec<Document>,
        top_k: usize,
    ) -> Result<Self, RagError> {
        let vectors = if docs.is_empty() {
            Vec::new()
        } else {
            let texts: Vec<&str> = docs.iter().map(|d| d.content.as_str()).collect();
            embedder.embed(&texts).await?
        };
        if vectors.len() != docs.len() {
            return Err(RagError::Retrieval(format!(
                "embedder returned {} vectors for {} documents",
                vectors.len(),
                docs.len()
            )));
        }
        debug!(documents = docs.len(), top_k, "in-memory index built");
        Ok(Self {
            embedder,
            docs,
            vectors,
            top_k,
        })
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    async fn query(&self, question: &str) -> Result<Vec<Document>, RagError> {
        if self.docs.is_empty() || self.top_k == 0 {
            return Ok(Vec::new());
        }
        let q = self
            .embedder
            .embed(&[question])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Retrieval("no embedding for question".to_string()))?;

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine(&q, v)))
            .collect();
        // Stable sort: equal scores keep corpus order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(self.top_k)
            .map(|(i, _)| self.docs[i].clone())
            .collect())
    }
}
