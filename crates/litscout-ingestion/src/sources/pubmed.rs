//! PubMed E-utilities client.
//!
//! Two-step search:
//!   esearch: https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi
//!            returns the PMID list for a query (pubdate-sorted, mindate
//!            filtered server-side)
//!   efetch:  https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi
//!            returns abstract XML per PMID

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, instrument, warn};

use litscout_common::retry::{with_backoff, DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY};
use litscout_common::sandbox::SandboxClient;
use litscout_common::{Article, LitscoutError, Source};

use super::SourceAdapter;
use crate::normalize::article_from_pubmed;

const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
const EFETCH_URL:  &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

/// One raw efetch record before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PubMedRecord {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
    /// Year-Month-Day joined with '-'; missing parts stay empty.
    pub pubdate: String,
    pub link: String,
}

pub struct PubMedClient {
    client: SandboxClient,
    api_key: Option<String>,
}

impl PubMedClient {
    pub fn new(client: SandboxClient, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    /// Search PubMed and return a list of PMIDs.
    #[instrument(skip(self))]
    async fn esearch(
        &self,
        query: &str,
        max: usize,
        min_date: Option<&str>,
    ) -> litscout_common::Result<Vec<String>> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmode", "json".to_string()),
            ("retmax", max.to_string()),
            ("sort", "pubdate".to_string()),
        ];
        if let Some(date) = min_date {
            params.push(("mindate", date.to_string()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        let resp: serde_json::Value = self.client
            .get(ESEARCH_URL)?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let ids = resp["esearchresult"]["idlist"]
            .as_array()
            .unwrap_or(&vec![])
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();

        debug!(?ids, "PubMed esearch returned PMIDs");
        Ok(ids)
    }

    /// Fetch abstract XML for one PMID and parse it.
    async fn efetch_record(&self, pmid: &str) -> litscout_common::Result<Option<PubMedRecord>> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("id", pmid.to_string()),
            ("retmode", "xml".to_string()),
            ("rettype", "abstract".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        let xml = self.client
            .get(EFETCH_URL)?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let mut records = parse_pubmed_xml(&xml)?;
        if records.is_empty() {
            warn!(pmid, "efetch returned no article");
            return Ok(None);
        }
        Ok(Some(records.remove(0)))
    }
}

#[async_trait]
impl SourceAdapter for PubMedClient {
    fn source(&self) -> Source {
        Source::PubMed
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        min_date: Option<&str>,
    ) -> litscout_common::Result<Vec<Article>> {
        let unavailable = |e: LitscoutError| LitscoutError::SourceUnavailable {
            adapter: "pubmed".to_string(),
            reason: e.to_string(),
        };

        let pmids = with_backoff("pubmed esearch", DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY, || {
            self.esearch(query, max_results, min_date)
        })
        .await
        .map_err(unavailable)?;

        let mut articles = Vec::new();
        for pmid in &pmids {
            let record = with_backoff("pubmed efetch", DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY, || {
                self.efetch_record(pmid)
            })
            .await
            .map_err(unavailable)?;

            if let Some(record) = record {
                articles.push(article_from_pubmed(record));
            }
        }
        Ok(articles)
    }
}

/// Parse PubMed efetch XML (abstract mode) into raw records.
/// Handles the <PubmedArticleSet><PubmedArticle> structure.
pub fn parse_pubmed_xml(xml: &str) -> litscout_common::Result<Vec<PubMedRecord>> {
    let mut records = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // State machine for XML parsing
    let mut current: Option<PubMedRecord> = None;
    let mut in_title    = false;
    let mut in_abstract = false;
    let mut in_pubdate  = false;
    let mut in_year     = false;
    let mut in_month    = false;
    let mut in_day      = false;
    let mut in_pubmed_id = false;
    let mut year  = String::new();
    let mut month = String::new();
    let mut day   = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"PubmedArticle" => {
                    current = Some(PubMedRecord::default());
                    year.clear();
                    month.clear();
                    day.clear();
                }
                b"ArticleTitle" => in_title = true,
                b"AbstractText" => in_abstract = true,
                b"PubDate"      => in_pubdate = true,
                b"Year"  if in_pubdate => in_year = true,
                b"Month" if in_pubdate => in_month = true,
                b"Day"   if in_pubdate => in_day = true,
                b"ArticleId" => {
                    // Only the pubmed-type id builds the canonical URL
                    in_pubmed_id = e.attributes().flatten().any(|a| {
                        a.key.as_ref() == b"IdType"
                            && a.unescape_value().unwrap_or_default() == "pubmed"
                    });
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if let Some(ref mut r) = current {
                    // First occurrence wins for title and abstract
                    if in_title && r.title.is_empty() {
                        r.title = text.clone();
                    }
                    if in_abstract && r.abstract_text.is_empty() {
                        r.abstract_text = text.clone();
                    }
                    if in_year  { year = text.clone(); }
                    if in_month { month = text.clone(); }
                    if in_day   { day = text.clone(); }
                    if in_pubmed_id && r.pmid.is_empty() {
                        r.pmid = text.clone();
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"ArticleTitle" => in_title = false,
                b"AbstractText" => in_abstract = false,
                b"PubDate"      => in_pubdate = false,
                b"Year"         => in_year = false,
                b"Month"        => in_month = false,
                b"Day"          => in_day = false,
                b"ArticleId"    => in_pubmed_id = false,
                b"PubmedArticle" => {
                    if let Some(mut r) = current.take() {
                        r.pubdate = format!("{year}-{month}-{day}");
                        if !r.pmid.is_empty() {
                            r.link = format!("https://pubmed.ncbi.nlm.nih.gov/{}", r.pmid);
                        }
                        records.push(r);
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

    Ok(records)
}
