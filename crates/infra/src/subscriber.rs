//! Reacts to saved reviews by analyzing and upserting their sentiment.

use tracing::debug;

use revsense_events::ReviewEvent;
use revsense_sentiment::InferenceService;

use crate::read_model::{ReadModelError, ReviewSentimentStore, UpsertOutcome};

/// Analysis never fails here; only the upsert can.
#[derive(Debug, Clone)]
pub struct ReviewSentimentSubscriber<R> {
    inference: InferenceService,
    store: R,
}

impl<R> ReviewSentimentSubscriber<R>
where
    R: ReviewSentimentStore,
{
    pub fn new(inference: InferenceService, store: R) -> Self {
        Self { inference, store }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Idempotent: redelivery re-analyzes and updates the same record.
    pub fn handle(&self, event: &ReviewEvent) -> Result<UpsertOutcome, ReadModelError> {
        match event {
            ReviewEvent::Saved { review_id, text, .. } => {
                let result = self.inference.analyze(text.as_deref());
                let outcome = self.store.upsert(*review_id, result.clone())?;
                debug!(
                    review_id = %review_id,
                    label = %result.sentiment_label,
                    confidence = result.confidence_score,
                    outcome = ?outcome,
                    "review sentiment stored"
                );
                Ok(outcome)
            }
        }
    }
}
