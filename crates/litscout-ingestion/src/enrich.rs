//! Enrichment stages — topic check then relevance, each independently
//! toggleable, order fixed.
//!
//! Disabled stages write their sentinel values ("N/A" / "TBD") and never
//! fail. Enabled stages annotate the article in place; any collaborator
//! failure propagates and fail-fasts the current query's batch.

use tracing::{debug, info};

use litscout_common::{Article, LitscoutError};
use litscout_llm::TopicReviewer;

use crate::relevance::RelevanceModel;

pub struct Enricher {
    topic_reviewer: Option<TopicReviewer>,
    relevance_model: Option<RelevanceModel>,
}

impl Enricher {
    pub fn new(
        topic_reviewer: Option<TopicReviewer>,
        relevance_model: Option<RelevanceModel>,
    ) -> Self {
        Self { topic_reviewer, relevance_model }
    }

    /// Both stages disabled; articles pass through with sentinel values.
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    /// Run the stages over one article. `topic_phrase` is the query's own
    /// phrase; the topic stage only runs when it is both enabled and the
    /// query carries a phrase.
    pub async fn enrich(
        &self,
        article: &mut Article,
        topic_phrase: Option<&str>,
    ) -> Result<(), LitscoutError> {
        match (&self.topic_reviewer, topic_phrase) {
            (Some(reviewer), Some(phrase)) => {
                let review = reviewer
                    .review_topic_mention(phrase, &article.abstract_text)
                    .await
                    .map_err(|e| LitscoutError::CollaboratorUnavailable(e.to_string()))?;
                // Stored verbatim; downstream consumers tolerate free text
                debug!(title = %article.title, review = %review, "topic review");
                article.topic_check = review;
                article.topic_check_query = phrase.to_string();
            }
            _ => {
                info!("topic check not run");
                article.topic_check = "N/A".to_string();
                article.topic_check_query = "N/A".to_string();
            }
        }

        match &self.relevance_model {
            Some(model) => {
                let pred = model.predict_title(&article.title).await?;
                debug!(title = %article.title, pred, "relevance prediction");
                article.relevance_pred = pred.to_string();
            }
            None => {
                info!("relevance model not run");
                article.relevance_pred = "TBD".to_string();
            }
        }

        Ok(())
    }
}
