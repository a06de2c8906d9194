//! Topic reviewer — asks the chat backend whether an abstract mentions a
//! configured topic phrase.
//!
//! Single-turn by design: no prior turns are retained between articles, and
//! sampling is pinned to temperature 0 for reproducibility. The response is
//! stored verbatim downstream; the "Yes: …"/"No" format is requested, never
//! enforced.

use std::sync::Arc;
use tracing::instrument;

use crate::backend::{LlmBackend, LlmError, LlmRequest, Message};

pub const REVIEWER_SYSTEM_PROMPT: &str =
    "You are an expert scientific reviewer that reviews and summarises \
     scientific text in an unbiased, scholarly tone";

pub struct TopicReviewer {
    backend: Arc<dyn LlmBackend>,
    system_prompt: String,
}

impl TopicReviewer {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend,
            system_prompt: REVIEWER_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Ask whether `abstract_text` mentions `topic`. Returns the model's raw
    /// textual answer.
    #[instrument(skip(self, abstract_text))]
    pub async fn review_topic_mention(
        &self,
        topic: &str,
        abstract_text: &str,
    ) -> Result<String, LlmError> {
        let req = LlmRequest {
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: self.system_prompt.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: topic_mention_prompt(topic, abstract_text),
                },
            ],
            model: None,
            max_tokens: None,
            temperature: Some(0.0),
        };

        let resp = self.backend.complete(req).await?;
        Ok(resp.content)
    }
}

/// The fixed topic-mention prompt.
pub fn topic_mention_prompt(topic: &str, abstract_text: &str) -> String {
    format!(
        "Does the abstract below mention {topic}?\n\
         \n\
         If the answer is yes, please respond with \"Yes: <Example sentence that mentions topic>\"\n\
         If the answer is no, please respond with \"No\"\n\
         \n\
         {abstract_text}"
    )
}
