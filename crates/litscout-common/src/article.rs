//! Canonical article record and query configuration.

use serde::{Deserialize, Serialize};

/// Which adapter produced an article. Rendered exactly as it appears in the
/// destination sheet's Source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    PubMed,
    Arxiv,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PubMed => "PubMed",
            Source::Arxiv  => "Arxiv",
        }
    }
}

/// One consolidated article, the unit flowing through the whole pipeline.
///
/// Created by a source normalizer, tagged by the consolidator, annotated in
/// place by the enrichment stages, and appended to the sheet exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub abstract_text: String,
    /// Source-native date string; no cross-source normalization.
    pub published: String,
    pub link: String,
    pub source: Source,
    pub query: String,
    pub search_run_id: String,
    pub category: String,
    /// Verbatim LLM topic review, or "N/A" when the stage is disabled.
    pub topic_check: String,
    pub topic_check_query: String,
    /// "Y" | "N" from the relevance model, or "TBD" when disabled.
    pub relevance_pred: String,
}

impl Article {
    /// Build a bare record from normalized source fields. Run metadata is
    /// filled in by the consolidator; annotations by the enrichment stages.
    pub fn new(
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        published: impl Into<String>,
        link: impl Into<String>,
        source: Source,
    ) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
            published: published.into(),
            link: link.into(),
            source,
            query: String::new(),
            search_run_id: String::new(),
            category: "N/A".to_string(),
            topic_check: "N/A".to_string(),
            topic_check_query: "N/A".to_string(),
            relevance_pred: "TBD".to_string(),
        }
    }

    /// The fixed sheet row: column order must never change, the destination
    /// tab's header depends on it.
    pub fn row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.abstract_text.clone(),
            self.published.clone(),
            self.link.clone(),
            self.source.as_str().to_string(),
            self.query.clone(),
            self.search_run_id.clone(),
            self.category.clone(),
            self.topic_check.clone(),
            self.topic_check_query.clone(),
            self.relevance_pred.clone(),
        ]
    }

    pub fn has_blank_title(&self) -> bool {
        self.title.trim().is_empty()
    }
}

/// One entry of the outer batch loop: a query with its own topic phrase,
/// result cap, and enabled sources. The topic phrase lives on the entry
/// itself so a misordered config cannot mismatch phrases to queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryJob {
    pub query: String,
    #[serde(default)]
    pub topic_phrase: Option<String>,
    pub max_results: usize,
    pub sources: Vec<Source>,
    /// Earliest publication date (YYYY/MM/DD) for sources that support
    /// server-side date filtering. arXiv ignores it.
    #[serde(default)]
    pub min_date: Option<String>,
}
