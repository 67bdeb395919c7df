//! Tavily search API client.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, trace};

use crate::error::RagError;
use crate::web_search::{SearchRequest, SearchResponse, WebSearch};

pub const TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Tavily client. The API key and the identifying user agent are passed in;
/// nothing is read from or written to the process environment.
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>, user_agent: &str) -> Result<Self, RagError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| RagError::WebSearch(format!("http client build failed: {}", e)))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: TAVILY_BASE_URL.to_string(),
        })
    }

    /// Overrides the API base URL (e.g. a proxy or a local test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_body(request: &SearchRequest) -> serde_json::Value {
        json!({
            "query": request.query,
            "search_depth": request.depth.to_string(),
            "max_results": request.max_results,
            "include_answer": true,
        })
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, RagError> {
        let url = format!("{}/search", self.base_url);
        let body = Self::build_body(request);
        debug!(url = %url, depth = %request.depth, max_results = request.max_results, "tavily search");
        trace!(request = %body, "tavily request body");

        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::WebSearch(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let err_body = res.text().await.unwrap_or_default();
            return Err(RagError::WebSearch(format!(
                "Tavily API error {}: {}",
                status, err_body
            )));
        }
        let raw: serde_json::Value = res
            .json()
            .await
            .map_err(|e| RagError::WebSearch(format!("invalid response body: {}", e)))?;
        trace!(response = %raw, "tavily response body");
        SearchResponse::from_raw(raw)
    }
}
