//! One-question execution for the CLI: build collaborators from settings, run the
//! selected router, render the terminal state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ragroute::{
    build_router, load_corpus, CompilationError, ConfigError, Embedder, InMemoryRetriever,
    LoggingNodeMiddleware, RagError, RagSettings, RagState, Router, RouterDeps,
    RouterKind,
};
use thiserror::Error;
use tracing::Instrument;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("load config files: {0}")]
    Load(#[from] config::LoadError),
    #[error("{0}")]
    Rag(#[from] RagError),
    #[error("build graph: {0}")]
    Compile(#[from] CompilationError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Options shared by `ask` and `repl`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub corpus: Option<PathBuf>,
    /// Overrides `RAGROUTE_ROUTER` when set.
    pub router: Option<RouterKind>,
    pub verbose: bool,
    pub json: bool,
    pub pretty: bool,
}

/// Indexes the corpus file, or builds an empty index when none is given.
pub async fn build_retriever(
    embedder: Arc<dyn Embedder>,
    corpus: Option<&Path>,
    top_k: usize,
) -> Result<InMemoryRetriever, RagError> {
    let docs = match corpus {
        Some(path) => load_corpus(path)?,
        None => Vec::new(),
    };
    tracing::info!(documents = docs.len(), "indexing corpus");
    InMemoryRetriever::build(embedder, docs, top_k).await
}

/// Builds the router from settings and CLI options.
pub async fn build_from_settings(
    settings: &RagSettings,
    opts: &RunOptions,
) -> Result<Box<dyn Router>, CliError> {
    let retriever =
        build_retriever(Arc::new(settings.embedder()), opts.corpus.as_deref(), settings.top_k)
            .await?;
    let deps = RouterDeps::new(
        Arc::new(retriever),
        Arc::new(settings.chat_client()),
        Arc::new(settings.web_client()?),
    )
    .with_search(settings.search_depth, settings.max_results);
    let kind = opts.router.unwrap_or(settings.router);
    build(kind, deps, opts.verbose)
}

pub fn build(kind: RouterKind, deps: RouterDeps, verbose: bool) -> Result<Box<dyn Router>, CliError> {
    let deps = if verbose {
        deps.with_middleware(Arc::new(LoggingNodeMiddleware::<RagState>::default()))
    } else {
        deps
    };
    Ok(build_router(kind, deps)?)
}

/// Answers one question inside an `ask` span and renders the result.
pub async fn ask(router: &dyn Router, question: &str, opts: &RunOptions) -> Result<String, CliError> {
    let span = tracing::info_span!("ask", router = %router.kind());
    let state = router.ask(question).instrument(span).await?;
    render(state, opts.json, opts.pretty)
}

/// Text form: answer, then route, retrieved count and judge decision.
/// JSON form: the full output record.
pub fn render(state: RagState, json: bool, pretty: bool) -> Result<String, CliError> {
    let output = state.into_output();
    if json {
        let s = if pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        return Ok(s);
    }
    Ok(format!(
        "{}\n\nroute: {}\nretrieved: {}\ndecision: {}",
        output.answer,
        output.route,
        output.retrieved_count,
        output.judge_decision.as_deref().unwrap_or("-")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragroute::{Document, HashEmbedder, MockLlm, MockWebSearch, Retriever, Route};

    fn doc_state() -> RagState {
        RagState {
            question: "What is an agent?".into(),
            retrieved_docs: vec![Document::new("An agent acts.", "U1")],
            use_web: false,
            answer: "An agent perceives and acts.".into(),
            retrieved_count: 1,
            judge_decision: Some("YES".into()),
            web_raw: None,
            web_context: None,
        }
    }

    #[test]
    fn render_text_lists_route_count_and_decision() {
        let out = render(doc_state(), false, false).unwrap();
        assert!(out.starts_with("An agent perceives and acts."), "{}", out);
        assert!(out.contains("route: docs"), "{}", out);
        assert!(out.contains("retrieved: 1"), "{}", out);
        assert!(out.contains("decision: YES"), "{}", out);
    }

    #[test]
    fn render_json_is_full_output_record() {
        let out = render(doc_state(), true, false).unwrap();
        assert_eq!(out.lines().count(), 1);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["route"], "docs");
        assert_eq!(v["retrieved_count"], 1);
        assert_eq!(v["retrieved_docs"][0]["metadata"]["source"], "U1");
        let pretty = render(doc_state(), true, true).unwrap();
        assert!(pretty.lines().count() > 1);
    }

    #[test]
    fn render_without_decision_shows_dash() {
        let mut s = doc_state();
        s.judge_decision = None;
        assert!(render(s, false, false).unwrap().contains("decision: -"));
    }

    /// **Scenario**: Without a corpus file the index is empty and no embedding call is made.
    #[tokio::test]
    async fn build_retriever_without_corpus_is_empty() {
        let r = build_retriever(Arc::new(HashEmbedder::new(64)), None, 4).await.unwrap();
        assert!(r.is_empty());
        assert!(r.query("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn build_retriever_indexes_corpus_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(
            &path,
            r#"[{"content":"Agents perceive and act.","metadata":{"source":"U1"}},
                {"content":"Diffusion models denoise.","metadata":{"source":"U2"}}]"#,
        )
        .unwrap();
        let r = build_retriever(Arc::new(HashEmbedder::new(256)), Some(&path), 1).await.unwrap();
        assert_eq!(r.len(), 2);
        let hits = r.query("agents act").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source(), "U1");
    }

    #[tokio::test]
    async fn build_retriever_missing_corpus_is_retrieval_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_retriever(Arc::new(HashEmbedder::new(8)), Some(&dir.path().join("x.json")), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Retrieval(_)));
    }

    /// **Scenario**: Empty index hard-falls back to web; verbose mode still answers.
    #[tokio::test]
    async fn ask_with_empty_index_routes_to_web() {
        let retriever = build_retriever(Arc::new(HashEmbedder::new(8)), None, 4).await.unwrap();
        let deps = RouterDeps::new(
            Arc::new(retriever),
            Arc::new(MockLlm::with_reply("From the web.")),
            Arc::new(MockWebSearch::with_answer("web facts")),
        );
        let router = build(RouterKind::Judge, deps, true).unwrap();
        let opts = RunOptions {
            json: true,
            ..Default::default()
        };
        let out = ask(router.as_ref(), "What is new?", &opts).await.unwrap();
        let output: ragroute::RagOutput = serde_json::from_str(&out).unwrap();
        assert_eq!(output.route, Route::Web);
        assert_eq!(output.answer, "From the web.");
        assert_eq!(output.judge_decision.as_deref(), Some("NO_DOCS"));
    }

    #[tokio::test]
    async fn ask_propagates_collaborator_error() {
        let retriever = build_retriever(Arc::new(HashEmbedder::new(8)), None, 4).await.unwrap();
        let deps = RouterDeps::new(
            Arc::new(retriever),
            Arc::new(MockLlm::with_reply("x")),
            Arc::new(MockWebSearch::failing("down")),
        );
        let router = build(RouterKind::Judge, deps, false).unwrap();
        let err = ask(router.as_ref(), "q", &RunOptions::default()).await.unwrap_err();
        assert!(matches!(err, CliError::Rag(RagError::WebSearch(_))));
        assert!(err.to_string().contains("down"), "{}", err);
    }
}
