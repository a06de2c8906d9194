//! Relevance model — title embedding + binary classifier.
//!
//! The encoder is the configured embeddings backend; the classifier is a
//! linear head whose weights are loaded from a JSON file once per run and
//! shared read-only for the whole batch. Reloading per article is the
//! failure mode this layout exists to rule out.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use litscout_common::LitscoutError;
use litscout_llm::LlmBackend;

/// Serialized classifier head: `{"weights": [...], "bias": -0.2}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearClassifier {
    pub weights: Vec<f32>,
    pub bias: f32,
}

impl LinearClassifier {
    pub fn load(path: &Path) -> litscout_common::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LitscoutError::Config(format!(
                "cannot read relevance model {}: {e}",
                path.display()
            ))
        })?;
        let classifier: LinearClassifier = serde_json::from_str(&content)?;
        if classifier.weights.is_empty() {
            return Err(LitscoutError::Config(
                "relevance model has no weights".to_string(),
            ));
        }
        Ok(classifier)
    }

    /// Scalar class label for one embedding: 1.0 above the decision
    /// boundary, 0.0 below.
    pub fn predict(&self, embedding: &[f32]) -> litscout_common::Result<f32> {
        if embedding.len() != self.weights.len() {
            return Err(LitscoutError::CollaboratorUnavailable(format!(
                "embedding dim {} does not match classifier dim {}",
                embedding.len(),
                self.weights.len()
            )));
        }
        let score: f32 = self
            .weights
            .iter()
            .zip(embedding)
            .map(|(w, x)| w * x)
            .sum::<f32>()
            + self.bias;
        Ok(if score > 0.0 { 1.0 } else { 0.0 })
    }
}

/// Map a raw classifier label to the sheet's relevance column.
/// Only an exact 1 is a "Y"; everything else is "N".
pub fn map_prediction(raw: f32) -> &'static str {
    if raw == 1.0 { "Y" } else { "N" }
}

/// Encoder + classifier pair, constructed once per run.
pub struct RelevanceModel {
    encoder: Arc<dyn LlmBackend>,
    classifier: LinearClassifier,
}

impl RelevanceModel {
    pub fn new(encoder: Arc<dyn LlmBackend>, classifier: LinearClassifier) -> Self {
        Self { encoder, classifier }
    }

    pub fn load(encoder: Arc<dyn LlmBackend>, path: &Path) -> litscout_common::Result<Self> {
        Ok(Self::new(encoder, LinearClassifier::load(path)?))
    }

    /// Encode one title and classify it. Any encoder failure is a
    /// collaborator outage, not a source outage.
    #[instrument(skip(self))]
    pub async fn predict_title(&self, title: &str) -> litscout_common::Result<&'static str> {
        let mut vectors = self
            .encoder
            .embed(vec![title.to_string()])
            .await
            .map_err(|e| LitscoutError::CollaboratorUnavailable(e.to_string()))?;

        let embedding = vectors.pop().ok_or_else(|| {
            LitscoutError::CollaboratorUnavailable("encoder returned no embedding".to_string())
        })?;

        let raw = self.classifier.predict(&embedding)?;
        debug!(raw, "relevance raw prediction");
        Ok(map_prediction(raw))
    }
}
