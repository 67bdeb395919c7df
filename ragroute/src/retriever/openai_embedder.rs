//! OpenAI Embeddings implementation of [`Embedder`].
//!
//! Supports `text-embedding-3-small` (default, 1536 dimensions),
//! `text-embedding-3-large` (3072) and `text-embedding-ada-002` (1536).

use async_openai::{
    config::OpenAIConfig,
    types::embeddings::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};
use async_trait::async_trait;

use crate::error::RagError;
use crate::retriever::Embedder;

/// OpenAI Embeddings client implementing [`Embedder`].
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Embedder with the given config (API key, base URL) and model.
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        let model = model.into();
        let dimensions = Self::get_model_dimensions(&model);
        Self {
            client: Client::with_config(config),
            model,
            dimensions,
        }
    }

    fn get_model_dimensions(model: &str) -> usize {
        match model {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError> {
        let inputs: Vec<String> = texts.iter().map(|&s| s.to_string()).collect();
        let expected = inputs.len();
        let input = if inputs.len() == 1 {
            EmbeddingInput::String(inputs[0].clone())
        } else {
            EmbeddingInput::StringArray(inputs)
        };

        let request = CreateEmbeddingRequest {
            input,
            model: self.model.clone(),
            ..Default::default()
        };

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| RagError::Retrieval(format!("OpenAI API error: {}", e)))?;

        if response.data.len() != expected {
            return Err(RagError::Retrieval(format!(
                "expected {} embeddings, got {}",
                expected,
                response.data.len()
            )));
        }
        let mut data = response.data;
        data.sort_by_key(|e| e.index);
        Ok(data.into_iter().map(|e| e.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn read_http_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut tmp = [0u8; 1024];
        loop {
            let n = stream.read(&mut tmp).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&tmp[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let header_end = pos + 4;
                let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
                let content_length = headers
                    .lines()
                    .find_map(|line| {
                        let lower = line.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .and_then(|v| v.trim().parse::<usize>().ok())
                    })
                    .unwrap_or(0);
                let mut body_len = buf.len() - header_end;
                while body_len < content_length {
                    let m = stream.read(&mut tmp).await.unwrap();
                    if m == 0 {
                        break;
                    }
                    body_len += m;
                }
                return;
            }
        }
    }

    async fn write_http_response(stream: &mut TcpStream, status: &str, body: &str) {
        let resp = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(resp.as_bytes()).await.unwrap();
    }

    #[test]
    fn model_dimensions() {
        let config = OpenAIConfig::new().with_api_key("test-key");
        let e = OpenAIEmbedder::with_config(config.clone(), "text-embedding-3-small");
        assert_eq!(e.dimension(), 1536);
        let e = OpenAIEmbedder::with_config(config, "text-embedding-3-large");
        assert_eq!(e.dimension(), 3072);
    }

    #[tokio::test]
    async fn embed_works_with_local_mock_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_http_request(&mut stream).await;
            let body = serde_json::json!({
                "object":"list",
                "data":[
                    {"object":"embedding","index":1,"embedding":[2.0,2.1]},
                    {"object":"embedding","index":0,"embedding":[1.0,1.1]}
                ],
                "model":"text-embedding-3-small",
                "usage":{"prompt_tokens":2,"total_tokens":2}
            })
            .to_string();
            write_http_response(&mut stream, "200 OK", &body).await;
        });

        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base(format!("http://{}", addr));
        let embedder = OpenAIEmbedder::with_config(config, "text-embedding-3-small");
        let many = embedder.embed(&["a", "b"]).await.unwrap();
        assert_eq!(many, vec![vec![1.0, 1.1], vec![2.0, 2.1]]);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn embed_returns_retrieval_error_on_http_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_http_request(&mut stream).await;
            write_http_response(
                &mut stream,
                "400 Bad Request",
                r#"{"error":{"message":"boom","type":"invalid_request_error","param":null,"code":null}}"#,
            )
            .await;
        });

        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base(format!("http://{}", addr));
        let embedder = OpenAIEmbedder::with_config(config, "text-embedding-3-small");
        let err = embedder.embed(&["hello"]).await.unwrap_err();
        assert!(matches!(err, RagError::Retrieval(ref m) if m.contains("OpenAI API error")));
        server.await.unwrap();
    }
}
