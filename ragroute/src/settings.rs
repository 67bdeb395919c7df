//! Runtime settings read from the environment.
//!
//! The binary populates the environment first (see the `config` crate: `.env` and
//! XDG `config.toml`), then calls [`RagSettings::from_env`]. Missing credentials are
//! reported here, before any question is asked.

use async_openai::config::OpenAIConfig;
use thiserror::Error;

use crate::error::RagError;
use crate::llm::{ChatOpenAI, ToolChoiceMode};
use crate::retriever::OpenAIEmbedder;
use crate::router::RouterKind;
use crate::web_search::{SearchDepth, TavilyClient};

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_TAVILY_API_KEY: &str = "TAVILY_API_KEY";
pub const ENV_MODEL: &str = "RAGROUTE_MODEL";
pub const ENV_TEMPERATURE: &str = "RAGROUTE_TEMPERATURE";
pub const ENV_EMBEDDING_MODEL: &str = "RAGROUTE_EMBEDDING_MODEL";
pub const ENV_TOP_K: &str = "RAGROUTE_TOP_K";
pub const ENV_ROUTER: &str = "RAGROUTE_ROUTER";
pub const ENV_USER_AGENT: &str = "RAGROUTE_USER_AGENT";
pub const ENV_SEARCH_DEPTH: &str = "RAGROUTE_SEARCH_DEPTH";
pub const ENV_MAX_RESULTS: &str = "RAGROUTE_MAX_RESULTS";
pub const ENV_TOOL_CHOICE: &str = "RAGROUTE_TOOL_CHOICE";

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Configuration failure. Fatal: surfaced before any invocation proceeds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Settings for one process; shared by every invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RagSettings {
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub tavily_api_key: String,
    pub model: String,
    pub temperature: f32,
    pub embedding_model: String,
    pub top_k: usize,
    pub router: RouterKind,
    /// Identifies this client to the search provider. Passed to the search client,
    /// never exported to the process environment.
    pub user_agent: String,
    pub search_depth: SearchDepth,
    pub max_results: u32,
    /// Tool choice for the agent router's model calls.
    pub tool_choice: ToolChoiceMode,
}

fn parse<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key,
            value: v.clone(),
        }),
    }
}

impl RagSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::MissingVar(key));

        Ok(Self {
            openai_api_key: required(ENV_OPENAI_API_KEY)?,
            openai_base_url: get(ENV_OPENAI_BASE_URL),
            tavily_api_key: required(ENV_TAVILY_API_KEY)?,
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse(ENV_TEMPERATURE, get(ENV_TEMPERATURE), 0.0f32)?,
            embedding_model: get(ENV_EMBEDDING_MODEL)
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            top_k: parse(ENV_TOP_K, get(ENV_TOP_K), 4usize)?,
            router: parse(ENV_ROUTER, get(ENV_ROUTER), RouterKind::Judge)?,
            user_agent: get(ENV_USER_AGENT).unwrap_or_else(default_user_agent),
            search_depth: parse(ENV_SEARCH_DEPTH, get(ENV_SEARCH_DEPTH), SearchDepth::Advanced)?,
            max_results: parse(ENV_MAX_RESULTS, get(ENV_MAX_RESULTS), 5u32)?,
            tool_choice: parse(ENV_TOOL_CHOICE, get(ENV_TOOL_CHOICE), ToolChoiceMode::Auto)?,
        })
    }

    pub fn openai_config(&self) -> OpenAIConfig {
        let config = OpenAIConfig::new().with_api_key(self.openai_api_key.clone());
        match &self.openai_base_url {
            Some(base) => config.with_api_base(base.clone()),
            None => config,
        }
    }

    pub fn chat_client(&self) -> ChatOpenAI {
        ChatOpenAI::with_config(self.openai_config(), self.model.clone())
            .with_temperature(self.temperature)
            .with_tool_choice(self.tool_choice)
    }

    pub fn embedder(&self) -> OpenAIEmbedder {
        OpenAIEmbedder::with_config(self.openai_config(), self.embedding_model.clone())
    }

    pub fn web_client(&self) -> Result<TavilyClient, RagError> {
        TavilyClient::new(self.tavily_api_key.clone(), &self.user_agent)
    }
}

fn default_user_agent() -> String {
    format!("ragroute/{}", env!("CARGO_PKG_VERSION"))
}
