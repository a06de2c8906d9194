//! Litscout — periodic research-paper discovery pipeline.
//! Entry point for the batch and single-query runs.

mod config;

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use litscout_common::sandbox::SandboxClient;
use litscout_common::QueryJob;
use litscout_ingestion::enrich::Enricher;
use litscout_ingestion::pipeline::run_batch;
use litscout_ingestion::relevance::RelevanceModel;
use litscout_llm::backend::{OpenAiBackend, OpenAiCompatibleBackend};
use litscout_llm::{LlmBackend, TopicReviewer};
use litscout_sheets::{ServiceAccountKey, SheetsClient, TokenProvider};

#[derive(Parser)]
#[command(name = "litscout", about = "Scholarly article discovery pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every query configured in litscout.toml.
    Run,
    /// Run one ad-hoc query with an optional topic phrase.
    Search {
        query: String,
        topic_phrase: Option<String>,
    },
}

/// Build the chat/embeddings backend named in the config. The API key comes
/// from the config or the LITSCOUT_OPENAI_API_KEY env var; it lives on this
/// client object only, never in process-global state. The backend gets its
/// own copy of the sandbox client, so LLM calls share the pipeline's
/// allowlist and bounded timeout.
fn build_llm_backend(
    cfg: &config::LlmConfig,
    client: &SandboxClient,
) -> anyhow::Result<Arc<dyn LlmBackend>> {
    let api_key = if cfg.api_key.is_empty() {
        std::env::var("LITSCOUT_OPENAI_API_KEY").unwrap_or_default()
    } else {
        cfg.api_key.clone()
    };

    match cfg.backend.as_str() {
        "openai" => {
            if api_key.is_empty() {
                anyhow::bail!(
                    "OpenAI backend configured but no API key found \
                     (set llm.api_key or LITSCOUT_OPENAI_API_KEY)"
                );
            }
            Ok(Arc::new(
                OpenAiBackend::new(client.clone(), api_key, cfg.model.clone())
                    .with_embedding_model(cfg.embedding_model.clone()),
            ))
        }
        "openai_compatible" => {
            let base_url = cfg.base_url.clone().ok_or_else(|| {
                anyhow::anyhow!("llm.base_url is required for the openai_compatible backend")
            })?;
            let key = if api_key.is_empty() { None } else { Some(api_key) };
            Ok(Arc::new(
                OpenAiCompatibleBackend::new(client.clone(), base_url, cfg.model.clone(), key)
                    .with_embedding_model(cfg.embedding_model.clone()),
            ))
        }
        other => anyhow::bail!("unknown llm backend {other:?}"),
    }
}

/// Construct the enrichment stages once for the whole run; the relevance
/// classifier weights are loaded here, not per article.
fn build_enricher(config: &config::Config, client: &SandboxClient) -> anyhow::Result<Enricher> {
    let needs_backend =
        config.enrichment.run_topic_check || config.enrichment.run_relevance_model;
    if !needs_backend {
        return Ok(Enricher::disabled());
    }

    let backend = build_llm_backend(&config.llm, client)?;

    let reviewer = config
        .enrichment
        .run_topic_check
        .then(|| TopicReviewer::new(backend.clone()));

    let relevance = if config.enrichment.run_relevance_model {
        Some(RelevanceModel::load(
            backend,
            Path::new(&config.relevance.model_path),
        )?)
    } else {
        None
    };

    Ok(Enricher::new(reviewer, relevance))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("litscout=debug,info")),
        )
        .init();

    info!("Litscout {} starting", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = config::Config::load()?;

    let jobs: Vec<QueryJob> = match cli.command {
        Command::Run => config.jobs(),
        Command::Search { query, topic_phrase } => vec![QueryJob {
            query,
            topic_phrase,
            max_results: config.search.max_results,
            sources: config.search.sources.clone(),
            min_date: config.search.min_date.clone(),
        }],
    };

    if jobs.is_empty() {
        anyhow::bail!("no queries configured; add [[queries]] entries to litscout.toml");
    }

    let client = SandboxClient::new()?;
    let enricher = build_enricher(&config, &client)?;

    let key = ServiceAccountKey::load(Path::new(&config.store.credentials_path))?;
    let store = SheetsClient::new(
        client.clone(),
        TokenProvider::new(key, client.clone()),
        config.store.spreadsheet_id.clone(),
    );

    let summary = run_batch(
        &jobs,
        &client,
        &store,
        &enricher,
        &config.store.tab,
        config.store.title_column,
    )
    .await;

    let appended: usize = summary.outcomes.iter().map(|o| o.appended).sum();
    info!(
        run_id = %summary.run_id,
        queries = summary.outcomes.len(),
        appended,
        "run complete"
    );

    if summary.all_failed() {
        anyhow::bail!("every query in the run failed");
    }
    Ok(())
}
