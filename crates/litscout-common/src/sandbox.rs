use crate::error::LitscoutError;
use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// A sandbox-capped HTTP client that only allows requests to approved
/// domains. Every network call in the pipeline goes through it, which also
/// gives every call the same bounded timeout instead of hanging forever on a
/// stuck upstream.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist of scholarly,
    /// LLM, and spreadsheet API domains.
    pub fn new() -> Result<Self, LitscoutError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Same allowlist with a caller-chosen per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, LitscoutError> {
        let mut allowlist = HashSet::new();
        let domains = vec![
            "eutils.ncbi.nlm.nih.gov",  // PubMed E-utilities
            "pubmed.ncbi.nlm.nih.gov",  // PubMed article pages
            "export.arxiv.org",         // arXiv Atom API
            "api.openai.com",           // OpenAI chat + embeddings
            "sheets.googleapis.com",    // Google Sheets v4
            "oauth2.googleapis.com",    // service-account token exchange
            "localhost",                // local OpenAI-compatible servers
            "127.0.0.1",
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                LitscoutError::Config(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Appends the hostname of `url` to the allowlist. Unparsable URLs are
    /// ignored; the request itself will fail the `is_allowed` check later.
    pub fn allow_url(&mut self, url: &str) {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                self.allowlist.insert(host.to_string());
            }
        }
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, LitscoutError> {
        if !self.is_allowed(url) {
            return Err(LitscoutError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, LitscoutError> {
        if !self.is_allowed(url) {
            return Err(LitscoutError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.post(url))
    }
}
