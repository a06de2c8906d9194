//! Per-query consolidation across sources.
//!
//! Searches each enabled source in order and concatenates the normalized
//! results, so with sources = [pubmed, arxiv] the PubMed articles always
//! precede the arXiv ones. A failing source is skipped with a warning; a
//! single source outage never aborts the batch.

use tracing::{info, warn};

use litscout_common::{Article, QueryJob};

use crate::sources::SourceAdapter;

/// Outcome of one consolidation pass.
pub struct Consolidated {
    pub articles: Vec<Article>,
    /// One entry per skipped source.
    pub source_errors: Vec<String>,
}

pub async fn consolidate(
    adapters: &[Box<dyn SourceAdapter>],
    job: &QueryJob,
    run_id: &str,
) -> Consolidated {
    let mut articles = Vec::new();
    let mut source_errors = Vec::new();

    for adapter in adapters {
        match adapter
            .search(&job.query, job.max_results, job.min_date.as_deref())
            .await
        {
            Ok(found) => {
                info!(source = adapter.source().as_str(), n = found.len(), "articles retrieved");
                articles.extend(found);
            }
            Err(e) => {
                let msg = format!("Source {} error: {e}", adapter.source().as_str());
                warn!("{}", &msg);
                source_errors.push(msg);
            }
        }
    }

    for article in &mut articles {
        article.query = job.query.clone();
        article.search_run_id = run_id.to_string();
        article.category = "N/A".to_string();
    }

    Consolidated { articles, source_errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use litscout_common::{LitscoutError, Source};

    struct FixedAdapter {
        source: Source,
        titles: Vec<&'static str>,
    }

    #[async_trait]
    impl SourceAdapter for FixedAdapter {
        fn source(&self) -> Source { self.source }

        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
            _min_date: Option<&str>,
        ) -> litscout_common::Result<Vec<Article>> {
            Ok(self.titles.iter()
                .map(|t| Article::new(*t, "", "", "", self.source))
                .collect())
        }
    }

    struct DownAdapter;

    #[async_trait]
    impl SourceAdapter for DownAdapter {
        fn source(&self) -> Source { Source::PubMed }

        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
            _min_date: Option<&str>,
        ) -> litscout_common::Result<Vec<Article>> {
            Err(LitscoutError::SourceUnavailable {
                adapter: "pubmed".to_string(),
                reason: "503".to_string(),
            })
        }
    }

    fn job() -> QueryJob {
        QueryJob {
            query: "graph neural networks".to_string(),
            topic_phrase: None,
            max_results: 10,
            sources: vec![Source::PubMed, Source::Arxiv],
            min_date: None,
        }
    }

    #[tokio::test]
    async fn test_source_order_preserved() {
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(FixedAdapter { source: Source::PubMed, titles: vec!["p1", "p2"] }),
            Box::new(FixedAdapter { source: Source::Arxiv, titles: vec!["a1"] }),
        ];
        let out = consolidate(&adapters, &job(), "run-1").await;
        let sources: Vec<_> = out.articles.iter().map(|a| a.source).collect();
        assert_eq!(sources, vec![Source::PubMed, Source::PubMed, Source::Arxiv]);
        assert!(out.source_errors.is_empty());
    }

    #[tokio::test]
    async fn test_run_metadata_tagged() {
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(FixedAdapter { source: Source::Arxiv, titles: vec!["a1"] }),
        ];
        let out = consolidate(&adapters, &job(), "run-7").await;
        let a = &out.articles[0];
        assert_eq!(a.query, "graph neural networks");
        assert_eq!(a.search_run_id, "run-7");
        assert_eq!(a.category, "N/A");
    }

    #[tokio::test]
    async fn test_failing_source_skipped() {
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(DownAdapter),
            Box::new(FixedAdapter { source: Source::Arxiv, titles: vec!["a1"] }),
        ];
        let out = consolidate(&adapters, &job(), "run-1").await;
        assert_eq!(out.articles.len(), 1);
        assert_eq!(out.articles[0].source, Source::Arxiv);
        assert_eq!(out.source_errors.len(), 1);
        assert!(out.source_errors[0].contains("pubmed"));
    }
}
