//! Destination store interface.
//!
//! The store doubles as the source of truth for duplicate detection: its
//! title column is snapshotted at the start of each query iteration and the
//! surviving articles are appended back in one batch.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::article::Article;
use crate::error::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Snapshot of one column's values for the named tab. Not refreshed
    /// mid-batch; concurrent writers are not detected.
    async fn existing_titles(&self, tab: &str, column: u32) -> Result<HashSet<String>>;

    /// Append all rows in one batch call. All-or-nothing: a partial-batch
    /// failure surfaces as a single error. Returns the number appended.
    async fn append(&self, articles: &[Article], tab: &str) -> Result<usize>;
}
