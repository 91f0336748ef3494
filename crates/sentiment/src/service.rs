//! Inference over the active model.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::normalize::normalize_opt;
use crate::result::{AnalysisResult, SentimentError};
use crate::slot::ModelSlot;

/// Single and batch analysis against whatever model the slot currently holds.
///
/// Cheap to clone; clones share the slot.
#[derive(Debug, Clone)]
pub struct InferenceService {
    slot: Arc<ModelSlot>,
}

impl InferenceService {
    pub fn new(slot: Arc<ModelSlot>) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &Arc<ModelSlot> {
        &self.slot
    }

    /// Analyze `text`, surfacing why a real prediction was not possible.
    ///
    /// Text that normalizes to nothing is not an error: it yields the fallback.
    pub fn try_analyze<'a>(&self, text: impl Into<Option<&'a str>>) -> Result<AnalysisResult, SentimentError> {
        let normalized = normalize_opt(text.into());
        if normalized.is_empty() {
            return Ok(AnalysisResult::fallback());
        }

        let model = self.slot.current().ok_or(SentimentError::ModelUnavailable)?;
        let probs = model.predict_proba(&normalized);
        let (label, _) = probs
            .argmax()
            .ok_or_else(|| SentimentError::Inference("model produced no class probabilities".to_string()))?;
        AnalysisResult::from_prediction(label, &probs)
    }

    /// Analyze `text`; never fails. Any error degrades to
    /// [`AnalysisResult::fallback`] and is logged.
    pub fn analyze<'a>(&self, text: impl Into<Option<&'a str>>) -> AnalysisResult {
        match self.try_analyze(text) {
            Ok(result) => result,
            Err(SentimentError::ModelUnavailable) => {
                debug!("no active sentiment model, returning fallback");
                AnalysisResult::fallback()
            }
            Err(err) => {
                warn!(error = %err, "sentiment analysis failed, returning fallback");
                AnalysisResult::fallback()
            }
        }
    }

    /// One result per input, in input order. Each item is analyzed in isolation.
    pub fn batch_analyze<'a, I, T>(&self, texts: I) -> Vec<AnalysisResult>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'a str>>,
    {
        texts.into_iter().map(|t| self.analyze(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_a_model_everything_falls_back() {
        let service = InferenceService::new(Arc::new(ModelSlot::new()));
        assert_eq!(service.try_analyze("great product"), Err(SentimentError::ModelUnavailable));
        assert!(service.analyze("great product").is_fallback());
        assert!(service.analyze(None).is_fallback());
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let service = InferenceService::new(Arc::new(ModelSlot::new()));
        assert_eq!(service.try_analyze("  \t "), Ok(AnalysisResult::fallback()));
        assert_eq!(service.try_analyze(""), Ok(AnalysisResult::fallback()));
    }

    #[test]
    fn batch_keeps_length_and_order() {
        let service = InferenceService::new(Arc::new(ModelSlot::new()));
        let results = service.batch_analyze([Some("one"), None, Some("")]);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(AnalysisResult::is_fallback));
    }
}
