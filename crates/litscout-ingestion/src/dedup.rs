//! Duplicate filtering against the destination store's title column.
//!
//! A candidate is dropped when its title is blank or already present in the
//! snapshot. Matching is exact and case-sensitive: no whitespace, case, or
//! punctuation normalization. The snapshot is read once per query iteration
//! and never refreshed mid-batch, so duplicates introduced by concurrent
//! runs (or by two queries in the same run) are not detected.

use std::collections::HashSet;
use tracing::info;

use litscout_common::Article;

/// Keep only articles that are new to the store and have a usable title.
pub fn filter_new(candidates: Vec<Article>, existing_titles: &HashSet<String>) -> Vec<Article> {
    candidates
        .into_iter()
        .filter(|article| {
            if article.has_blank_title() {
                info!("not added: empty article title");
                return false;
            }
            if existing_titles.contains(&article.title) {
                info!(title = %article.title, "not added: article title already in list");
                return false;
            }
            true
        })
        .collect()
}
