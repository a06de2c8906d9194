//! litscout-ingestion — Article discovery pipeline.
//!
//! - Source adapters (arXiv, PubMed)
//! - Normalization into the canonical Article record
//! - Per-query consolidation across sources
//! - Duplicate filtering against the destination sheet's title column
//! - Enrichment (LLM topic check, relevance model)
//! - Batch append via the ArticleStore

pub mod consolidate;
pub mod dedup;
pub mod enrich;
pub mod normalize;
pub mod pipeline;
pub mod relevance;
pub mod sources;
