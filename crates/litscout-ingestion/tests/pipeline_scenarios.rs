//! End-to-end pipeline scenarios with stub sources, store, and LLM backend.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use litscout_common::{Article, ArticleStore, LitscoutError, QueryJob, Source};
use litscout_ingestion::enrich::Enricher;
use litscout_ingestion::pipeline::run_query;
use litscout_ingestion::sources::SourceAdapter;
use litscout_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse, TopicReviewer};

// ── Stubs ─────────────────────────────────────────────────────────────────────

struct StubAdapter {
    source: Source,
    titles: Vec<&'static str>,
}

#[async_trait]
impl SourceAdapter for StubAdapter {
    fn source(&self) -> Source { self.source }

    async fn search(
        &self,
        _query: &str,
        max_results: usize,
        _min_date: Option<&str>,
    ) -> litscout_common::Result<Vec<Article>> {
        Ok(self.titles.iter()
            .take(max_results)
            .map(|t| Article::new(*t, format!("abstract of {t}"), "2024-01-01", "https://x", self.source))
            .collect())
    }
}

struct DownAdapter(Source);

#[async_trait]
impl SourceAdapter for DownAdapter {
    fn source(&self) -> Source { self.0 }

    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
        _min_date: Option<&str>,
    ) -> litscout_common::Result<Vec<Article>> {
        Err(LitscoutError::SourceUnavailable {
            adapter: self.0.as_str().to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

#[derive(Default)]
struct MemoryStore {
    titles: Mutex<HashSet<String>>,
    appended: Mutex<Vec<Article>>,
}

impl MemoryStore {
    fn with_titles(titles: &[&str]) -> Self {
        Self {
            titles: Mutex::new(titles.iter().map(|s| s.to_string()).collect()),
            appended: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn existing_titles(&self, _tab: &str, _column: u32) -> litscout_common::Result<HashSet<String>> {
        Ok(self.titles.lock().unwrap().clone())
    }

    async fn append(&self, articles: &[Article], _tab: &str) -> litscout_common::Result<usize> {
        self.appended.lock().unwrap().extend_from_slice(articles);
        Ok(articles.len())
    }
}

struct FixedReplyBackend(&'static str);

#[async_trait]
impl LlmBackend for FixedReplyBackend {
    async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
        Ok(LlmResponse {
            content: self.0.to_string(),
            model: "stub".to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }

    async fn embed(&self, _texts: Vec<String>) -> Result<Vec<Vec<f32>>, LlmError> {
        Err(LlmError::Unavailable("no embeddings".to_string()))
    }

    fn model_id(&self) -> &str { "stub" }
}

/// Fails on the Nth complete() call, succeeds before that.
struct FlakyBackend {
    fail_from: u32,
    calls: Mutex<u32>,
}

#[async_trait]
impl LlmBackend for FlakyBackend {
    async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls >= self.fail_from {
            return Err(LlmError::Unavailable("llm down".to_string()));
        }
        Ok(LlmResponse {
            content: "No".to_string(),
            model: "stub".to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }

    async fn embed(&self, _texts: Vec<String>) -> Result<Vec<Vec<f32>>, LlmError> {
        Err(LlmError::Unavailable("no embeddings".to_string()))
    }

    fn model_id(&self) -> &str { "stub" }
}

fn job(sources: Vec<Source>, topic_phrase: Option<&str>) -> QueryJob {
    QueryJob {
        query: "graph neural networks".to_string(),
        topic_phrase: topic_phrase.map(str::to_string),
        max_results: 2,
        sources,
        min_date: None,
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_both_stages_disabled_appends_all() {
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(StubAdapter {
        source: Source::Arxiv,
        titles: vec!["GNN paper one", "GNN paper two"],
    })];
    let store = MemoryStore::default();
    let enricher = Enricher::disabled();

    let outcome = run_query(
        &job(vec![Source::Arxiv], None),
        &adapters, &store, &enricher, "Papers", 1, "run-1",
    ).await;

    assert_eq!(outcome.articles_found, 2);
    assert_eq!(outcome.appended, 2);
    assert!(outcome.errors.is_empty());

    let appended = store.appended.lock().unwrap();
    assert_eq!(appended.len(), 2);
    for a in appended.iter() {
        assert_eq!(a.topic_check, "N/A");
        assert_eq!(a.topic_check_query, "N/A");
        assert_eq!(a.relevance_pred, "TBD");
        assert_eq!(a.query, "graph neural networks");
        assert_eq!(a.search_run_id, "run-1");
    }
}

#[tokio::test]
async fn scenario_existing_title_filtered_out() {
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(StubAdapter {
        source: Source::Arxiv,
        titles: vec!["GNN paper one", "GNN paper two"],
    })];
    let store = MemoryStore::with_titles(&["GNN paper one"]);
    let enricher = Enricher::disabled();

    let outcome = run_query(
        &job(vec![Source::Arxiv], None),
        &adapters, &store, &enricher, "Papers", 1, "run-1",
    ).await;

    assert_eq!(outcome.articles_found, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.appended, 1);
    assert_eq!(store.appended.lock().unwrap()[0].title, "GNN paper two");
}

#[tokio::test]
async fn scenario_topic_check_stored_verbatim() {
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(StubAdapter {
        source: Source::Arxiv,
        titles: vec!["GNN paper one"],
    })];
    let store = MemoryStore::default();
    let reviewer = TopicReviewer::new(Arc::new(FixedReplyBackend(
        "Yes: mentions transformers directly",
    )));
    let enricher = Enricher::new(Some(reviewer), None);

    let outcome = run_query(
        &job(vec![Source::Arxiv], Some("transformers")),
        &adapters, &store, &enricher, "Papers", 1, "run-1",
    ).await;

    assert_eq!(outcome.appended, 1);
    let appended = store.appended.lock().unwrap();
    assert_eq!(appended[0].topic_check, "Yes: mentions transformers directly");
    assert_eq!(appended[0].topic_check_query, "transformers");
}

#[tokio::test]
async fn scenario_one_source_down_run_continues() {
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(DownAdapter(Source::PubMed)),
        Box::new(StubAdapter { source: Source::Arxiv, titles: vec!["GNN paper one"] }),
    ];
    let store = MemoryStore::default();
    let enricher = Enricher::disabled();

    let outcome = run_query(
        &job(vec![Source::PubMed, Source::Arxiv], None),
        &adapters, &store, &enricher, "Papers", 1, "run-1",
    ).await;

    assert_eq!(outcome.articles_found, 1);
    assert_eq!(outcome.appended, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("PubMed"));
    assert!(!outcome.failed());
}

#[tokio::test]
async fn collaborator_failure_flushes_enriched_articles() {
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(StubAdapter {
        source: Source::Arxiv,
        titles: vec!["first", "second", "third"],
    })];
    let store = MemoryStore::default();
    // First article reviews fine, second hits the outage
    let reviewer = TopicReviewer::new(Arc::new(FlakyBackend {
        fail_from: 2,
        calls: Mutex::new(0),
    }));
    let enricher = Enricher::new(Some(reviewer), None);

    let mut j = job(vec![Source::Arxiv], Some("transformers"));
    j.max_results = 3;

    let outcome = run_query(&j, &adapters, &store, &enricher, "Papers", 1, "run-1").await;

    // Fail-fast: third article never processed, but the first was flushed
    assert_eq!(outcome.appended, 1);
    assert!(outcome.errors.iter().any(|e| e.contains("enrichment aborted")));
    let appended = store.appended.lock().unwrap();
    assert_eq!(appended.len(), 1);
    assert_eq!(appended[0].title, "first");
    assert_eq!(appended[0].topic_check, "No");
}

#[tokio::test]
async fn blank_titles_never_reach_the_store() {
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(StubAdapter {
        source: Source::PubMed,
        titles: vec!["", " ", "real paper"],
    })];
    let store = MemoryStore::default();
    let enricher = Enricher::disabled();

    let mut j = job(vec![Source::PubMed], None);
    j.max_results = 3;

    let outcome = run_query(&j, &adapters, &store, &enricher, "Papers", 1, "run-1").await;

    assert_eq!(outcome.articles_found, 3);
    assert_eq!(outcome.skipped, 2);
    let appended = store.appended.lock().unwrap();
    assert_eq!(appended.len(), 1);
    assert_eq!(appended[0].title, "real paper");
}
