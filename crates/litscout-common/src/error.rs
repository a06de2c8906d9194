use thiserror::Error;

#[derive(Debug, Error)]
pub enum LitscoutError {
    /// One source adapter's search failed. The batch continues with the
    /// remaining sources.
    #[error("Source {adapter} unavailable: {reason}")]
    SourceUnavailable { adapter: String, reason: String },

    /// An enrichment collaborator (LLM or relevance model) failed.
    /// Fail-fast for the current query's batch.
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// The destination store's read or write path failed.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LitscoutError>;
