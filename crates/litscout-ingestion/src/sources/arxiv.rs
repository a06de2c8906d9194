//! arXiv Atom API client.
//!
//! Endpoint: https://export.arxiv.org/api/query
//! Results are Atom XML sorted by last-updated date, newest first. The API
//! has no server-side minimum-date filter, so `min_date` is ignored here.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, instrument};

use litscout_common::retry::{with_backoff, DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY};
use litscout_common::sandbox::SandboxClient;
use litscout_common::{Article, LitscoutError, Source};

use super::SourceAdapter;
use crate::normalize::article_from_arxiv;

const ARXIV_QUERY_URL: &str = "https://export.arxiv.org/api/query";

/// One raw Atom entry before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArxivEntry {
    pub title: String,
    pub published: String,
    pub updated: String,
    pub summary: String,
    pub link: String,
}

pub struct ArxivClient {
    client: SandboxClient,
}

impl ArxivClient {
    pub fn new(client: SandboxClient) -> Self {
        Self { client }
    }

    async fn fetch_feed(&self, query: &str, max_results: usize) -> litscout_common::Result<String> {
        let params = [
            ("search_query", format!("all:{query}")),
            ("start", "0".to_string()),
            ("max_results", max_results.to_string()),
            ("sortBy", "lastUpdatedDate".to_string()),
            ("sortOrder", "descending".to_string()),
        ];

        let xml = self.client
            .get(ARXIV_QUERY_URL)?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(xml)
    }
}

#[async_trait]
impl SourceAdapter for ArxivClient {
    fn source(&self) -> Source {
        Source::Arxiv
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        _min_date: Option<&str>,
    ) -> litscout_common::Result<Vec<Article>> {
        let xml = with_backoff("arxiv", DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY, || {
            self.fetch_feed(query, max_results)
        })
        .await
        .map_err(|e| LitscoutError::SourceUnavailable {
            adapter: "arxiv".to_string(),
            reason: e.to_string(),
        })?;

        let entries = parse_arxiv_feed(&xml).map_err(|e| LitscoutError::SourceUnavailable {
            adapter: "arxiv".to_string(),
            reason: e.to_string(),
        })?;

        debug!(count = entries.len(), "arXiv search returned entries");
        Ok(entries.into_iter().map(article_from_arxiv).collect())
    }
}

/// Parse an arXiv Atom feed into raw entries.
///
/// Per entry: title, published, updated, summary, and the href of the
/// `rel="alternate" type="text/html"` link (the canonical abstract page).
pub fn parse_arxiv_feed(xml: &str) -> litscout_common::Result<Vec<ArxivEntry>> {
    let mut entries = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current: Option<ArxivEntry> = None;
    let mut in_title     = false;
    let mut in_published = false;
    let mut in_updated   = false;
    let mut in_summary   = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"entry"     => current = Some(ArxivEntry::default()),
                b"title"     => in_title     = current.is_some(),
                b"published" => in_published = current.is_some(),
                b"updated"   => in_updated   = current.is_some(),
                b"summary"   => in_summary   = current.is_some(),
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"link" => {
                if let Some(ref mut entry) = current {
                    let mut rel = String::new();
                    let mut kind = String::new();
                    let mut href = String::new();
                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value().unwrap_or_default().to_string();
                        match attr.key.as_ref() {
                            b"rel"  => rel = value,
                            b"type" => kind = value,
                            b"href" => href = value,
                            _ => {}
                        }
                    }
                    if rel == "alternate" && kind == "text/html" {
                        entry.link = href;
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if let Some(ref mut entry) = current {
                    if in_title     { entry.title = text.clone(); }
                    if in_published { entry.published = text.clone(); }
                    if in_updated   { entry.updated = text.clone(); }
                    if in_summary   { entry.summary = text.clone(); }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"title"     => in_title     = false,
                b"published" => in_published = false,
                b"updated"   => in_updated   = false,
                b"summary"   => in_summary   = false,
                b"entry" => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(LitscoutError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}
