//! Scholarly source clients.

pub mod arxiv;
pub mod pubmed;

use async_trait::async_trait;
use litscout_common::sandbox::SandboxClient;
use litscout_common::{Article, Source};

use arxiv::ArxivClient;
use pubmed::PubMedClient;

/// Common interface for all source clients.
///
/// `min_date` is the earliest acceptable publication date (YYYY/MM/DD) for
/// sources that support server-side date filtering; adapters without such
/// support ignore it. Zero hits is an empty Vec, never an error.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    async fn search(
        &self,
        query: &str,
        max_results: usize,
        min_date: Option<&str>,
    ) -> litscout_common::Result<Vec<Article>>;
}

/// Build one adapter per enabled source, preserving the caller's order —
/// consolidation output is concatenated in exactly this order.
pub fn build_adapters(
    sources: &[Source],
    client: &SandboxClient,
) -> Vec<Box<dyn SourceAdapter>> {
    sources
        .iter()
        .map(|s| -> Box<dyn SourceAdapter> {
            match s {
                Source::PubMed => Box::new(PubMedClient::new(client.clone(), None)),
                Source::Arxiv  => Box::new(ArxivClient::new(client.clone())),
            }
        })
        .collect()
}
