//! litscout-common — Shared types, errors, and HTTP plumbing used across all
//! Litscout crates.

pub mod article;
pub mod error;
pub mod retry;
pub mod sandbox;
pub mod store;

// Re-export commonly used types
pub use article::{Article, QueryJob, Source};
pub use error::{LitscoutError, Result};
pub use store::ArticleStore;
