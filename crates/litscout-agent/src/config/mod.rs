//! Configuration loading for Litscout.
//! Reads litscout.toml from the current directory or path in LITSCOUT_CONFIG.

use serde::{Deserialize, Serialize};
use std::path::Path;

use litscout_common::{QueryJob, Source};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub queries: Vec<QueryEntry>,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub relevance: RelevanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub credentials_path: String,
    pub spreadsheet_id: String,
    #[serde(default = "default_tab")]
    pub tab: String,
    #[serde(default = "default_title_column")]
    pub title_column: u32,
}

fn default_tab()          -> String { "Papers".to_string() }
fn default_title_column() -> u32    { 1 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_min_date")]
    pub min_date: Option<String>,
    #[serde(default = "default_sources")]
    pub sources: Vec<Source>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            min_date: default_min_date(),
            sources: default_sources(),
        }
    }
}

fn default_max_results() -> usize          { 10 }
fn default_min_date()    -> Option<String> { Some("2020/01/01".to_string()) }
fn default_sources()     -> Vec<Source>    { vec![Source::PubMed, Source::Arxiv] }

/// One query paired with its own topic phrase. Explicit pairing: no
/// parallel lists, no positional matching to go wrong.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryEntry {
    pub query: String,
    #[serde(default)]
    pub topic_phrase: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default)]
    pub run_topic_check: bool,
    #[serde(default)]
    pub run_relevance_model: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai" or "openai_compatible"
    #[serde(default = "default_llm_backend")]
    pub backend: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Falls back to LITSCOUT_OPENAI_API_KEY when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_llm_backend(),
            model: default_llm_model(),
            api_key: String::new(),
            base_url: None,
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_llm_backend()     -> String { "openai".to_string() }
fn default_llm_model()       -> String { "gpt-4o-mini".to_string() }
fn default_embedding_model() -> String { "text-embedding-3-small".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self { model_path: default_model_path() }
    }
}

fn default_model_path() -> String { "relevance_model.json".to_string() }


impl Config {
    /// Load configuration from litscout.toml.
    /// Checks LITSCOUT_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("LITSCOUT_CONFIG")
            .unwrap_or_else(|_| "litscout.toml".to_string());

        if !Path::new(&path).exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy litscout.example.toml to litscout.toml and edit it.",
                path
            );
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the sheet range syntax cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store.title_column == 0 {
            anyhow::bail!("store.title_column is 1-based; 0 is not a valid column");
        }
        Ok(())
    }

    /// Expand the configured query entries into per-query jobs, sharing the
    /// run-wide search settings.
    pub fn jobs(&self) -> Vec<QueryJob> {
        self.queries
            .iter()
            .map(|entry| QueryJob {
                query: entry.query.clone(),
                topic_phrase: entry.topic_phrase.clone(),
                max_results: self.search.max_results,
                sources: self.search.sources.clone(),
                min_date: self.search.min_date.clone(),
            })
            .collect()
    }
}
