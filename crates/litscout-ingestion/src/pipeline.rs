//! End-to-end discovery pipeline.
//!
//! Orchestrates the full flow for one run:
//!   1. For each configured query, search every enabled source
//!   2. Normalize and concatenate the results in source order
//!   3. Snapshot the destination tab's title column
//!   4. Drop blank and already-seen titles
//!   5. Enrich each survivor (topic check, relevance)
//!   6. Batch-append the survivors to the destination tab
//!
//! Policies: a failing source is skipped (never aborts the batch); a failing
//! collaborator fail-fasts the current query after flushing the articles it
//! already enriched; a failing store read/write fails that query only.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use litscout_common::retry::{with_backoff, DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY};
use litscout_common::sandbox::SandboxClient;
use litscout_common::{Article, ArticleStore, LitscoutError, QueryJob};

use crate::consolidate::consolidate;
use crate::dedup::filter_new;
use crate::enrich::Enricher;
use crate::sources::{build_adapters, SourceAdapter};

// ── Run identifiers ───────────────────────────────────────────────────────────

/// Timestamp-style identifier shared by every article of one run.
pub fn new_run_id() -> String {
    chrono::Local::now().format("%d_%m_%Y_%H_%M_%S").to_string()
}

// ── Result summaries ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub query: String,
    pub articles_found: usize,
    pub skipped: usize,
    pub appended: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl QueryOutcome {
    fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            articles_found: 0,
            skipped: 0,
            appended: 0,
            errors: Vec::new(),
            duration_ms: 0,
        }
    }

    /// A query failed when it appended nothing and recorded at least one
    /// error.
    pub fn failed(&self) -> bool {
        self.appended == 0 && !self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub job_id: Uuid,
    pub run_id: String,
    pub outcomes: Vec<QueryOutcome>,
}

impl RunSummary {
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.failed())
    }
}

// ── Per-query pipeline ────────────────────────────────────────────────────────

/// Run one query end to end: consolidate, dedup, enrich, append.
#[instrument(skip(adapters, store, enricher), fields(query = %job.query))]
pub async fn run_query(
    job: &QueryJob,
    adapters: &[Box<dyn SourceAdapter>],
    store: &dyn ArticleStore,
    enricher: &Enricher,
    tab: &str,
    title_column: u32,
    run_id: &str,
) -> QueryOutcome {
    let t0 = std::time::Instant::now();
    let mut outcome = QueryOutcome::new(&job.query);

    // 1-2. Fan out across sources; a failing source is skipped
    let consolidated = consolidate(adapters, job, run_id).await;
    outcome.articles_found = consolidated.articles.len();
    outcome.errors.extend(consolidated.source_errors);

    // 3. Snapshot the existing titles once for this query
    let existing = match with_backoff(
        "store read",
        DEFAULT_ATTEMPTS,
        DEFAULT_BASE_DELAY,
        || store.existing_titles(tab, title_column),
    )
    .await
    {
        Ok(titles) => titles,
        Err(e) => {
            let msg = format!("store read failed: {e}");
            warn!("{}", &msg);
            outcome.errors.push(msg);
            outcome.duration_ms = t0.elapsed().as_millis() as u64;
            return outcome;
        }
    };

    // 4. Drop blank and already-seen titles
    let survivors = filter_new(consolidated.articles, &existing);
    outcome.skipped = outcome.articles_found - survivors.len();

    // 5. Enrich one article at a time. On a collaborator failure, flush what
    // is already enriched before reporting the error.
    let mut ready: Vec<Article> = Vec::new();
    let mut collaborator_error: Option<LitscoutError> = None;

    for mut article in survivors {
        match enricher.enrich(&mut article, job.topic_phrase.as_deref()).await {
            Ok(()) => ready.push(article),
            Err(e) => {
                warn!(title = %article.title, %e, "enrichment failed, aborting this query");
                collaborator_error = Some(e);
                break;
            }
        }
    }

    // 6. Single batch append
    if !ready.is_empty() {
        match append_with_retry(store, &ready, tab).await {
            Ok(n) => {
                info!(appended = n, tab, "articles appended");
                outcome.appended = n;
            }
            Err(e) => {
                let msg = format!("store append failed: {e}");
                warn!("{}", &msg);
                outcome.errors.push(msg);
            }
        }
    }

    if let Some(e) = collaborator_error {
        outcome.errors.push(format!("enrichment aborted: {e}"));
    }

    outcome.duration_ms = t0.elapsed().as_millis() as u64;
    outcome
}

async fn append_with_retry(
    store: &dyn ArticleStore,
    articles: &[Article],
    tab: &str,
) -> litscout_common::Result<usize> {
    with_backoff("store append", DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY, || {
        store.append(articles, tab)
    })
    .await
}

// ── Batch runner ──────────────────────────────────────────────────────────────

/// Run every configured query sequentially. Queries are independent: one
/// query's failure never stops the next.
pub async fn run_batch(
    jobs: &[QueryJob],
    client: &SandboxClient,
    store: &dyn ArticleStore,
    enricher: &Enricher,
    tab: &str,
    title_column: u32,
) -> RunSummary {
    let job_id = Uuid::new_v4();
    let run_id = new_run_id();
    info!(%job_id, %run_id, queries = jobs.len(), "starting discovery run");

    let mut outcomes = Vec::with_capacity(jobs.len());

    for job in jobs {
        info!(query = %job.query, "processing query");
        let adapters = build_adapters(&job.sources, client);
        let outcome = run_query(job, &adapters, store, enricher, tab, title_column, &run_id).await;
        info!(
            query = %outcome.query,
            found = outcome.articles_found,
            skipped = outcome.skipped,
            appended = outcome.appended,
            errors = outcome.errors.len(),
            duration_ms = outcome.duration_ms,
            "query complete"
        );
        outcomes.push(outcome);
    }

    RunSummary { job_id, run_id, outcomes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_shape() {
        let id = new_run_id();
        // %d_%m_%Y_%H_%M_%S → six underscore-separated numeric fields
        assert_eq!(id.split('_').count(), 6);
        assert!(id.split('_').all(|part| part.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn test_outcome_failed_semantics() {
        let mut o = QueryOutcome::new("q");
        assert!(!o.failed());
        o.errors.push("store read failed".to_string());
        assert!(o.failed());
        o.appended = 2;
        assert!(!o.failed());
    }
}
