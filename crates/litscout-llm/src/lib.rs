//! litscout-llm — Chat and embedding backends plus the topic reviewer.
//!
//! The reviewer is the pipeline's only chat consumer; the embeddings path is
//! consumed by the relevance model in litscout-ingestion.

pub mod backend;
pub mod reviewer;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
pub use reviewer::TopicReviewer;
