use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::label::SentimentLabel;

/// Per-label probabilities over the labels a model saw during fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities(BTreeMap<SentimentLabel, f64>);

impl ClassProbabilities {
    pub fn new(probs: BTreeMap<SentimentLabel, f64>) -> Self {
        Self(probs)
    }

    /// Probability of `label`; labels never seen in training have probability 0.
    pub fn get(&self, label: SentimentLabel) -> f64 {
        self.0.get(&label).copied().unwrap_or(0.0)
    }

    /// Most probable label (earliest label wins ties).
    pub fn argmax(&self) -> Option<(SentimentLabel, f64)> {
        let mut best: Option<(SentimentLabel, f64)> = None;
        for (&label, &p) in &self.0 {
            match best {
                Some((_, bp)) if p <= bp => {}
                _ => best = Some((label, p)),
            }
        }
        best
    }

    pub fn iter(&self) -> impl Iterator<Item = (SentimentLabel, f64)> + '_ {
        self.0.iter().map(|(l, p)| (*l, *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Output of one sentiment analysis.
///
/// Invariants: class scores lie in \[0, 1\] and sum to 1, `confidence_score` is the
/// largest class score and `sentiment_score = positive_score - negative_score`
/// clamped to \[-1, 1\]. The two derived scores can disagree (a narrow neutral win
/// still carries a signed polarity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    pub confidence_score: f64,
    pub positive_score: f64,
    pub negative_score: f64,
    pub neutral_score: f64,
}

impl AnalysisResult {
    /// The documented default returned whenever no usable prediction exists.
    ///
    /// Only `confidence_score == 0.5` distinguishes it from a real neutral call.
    pub fn fallback() -> Self {
        Self {
            sentiment_label: SentimentLabel::Neutral,
            sentiment_score: 0.0,
            confidence_score: 0.5,
            positive_score: 0.33,
            negative_score: 0.33,
            neutral_score: 0.34,
        }
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }

    /// Derive the result from a predicted label and its class distribution.
    pub fn from_prediction(
        label: SentimentLabel,
        probs: &ClassProbabilities,
    ) -> Result<Self, SentimentError> {
        if probs.is_empty() {
            return Err(SentimentError::Inference("empty class distribution".to_string()));
        }
        if let Some((l, p)) = probs.iter().find(|(_, p)| !p.is_finite() || *p < 0.0 || *p > 1.0) {
            return Err(SentimentError::Inference(format!(
                "probability for {l} out of range: {p}"
            )));
        }

        let positive_score = probs.get(SentimentLabel::Positive);
        let negative_score = probs.get(SentimentLabel::Negative);
        let neutral_score = probs.get(SentimentLabel::Neutral);
        let confidence_score = probs.iter().map(|(_, p)| p).fold(0.0_f64, f64::max);
        let sentiment_score = (positive_score - negative_score).clamp(-1.0, 1.0);

        Ok(Self {
            sentiment_label: label,
            sentiment_score,
            confidence_score,
            positive_score,
            negative_score,
            neutral_score,
        })
    }
}

/// Errors raised by training, persistence and (internally) inference.
///
/// Inference callers never see these through `analyze`; they are converted to
/// [`AnalysisResult::fallback`] and logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SentimentError {
    #[error("insufficient training data: {found} usable examples, at least {required} required")]
    InsufficientData { found: usize, required: usize },

    #[error("empty vocabulary after document-frequency pruning (min_df={min_df}, max_df={max_df})")]
    InsufficientVocabulary { min_df: usize, max_df: f64 },

    #[error("no sentiment model is active")]
    ModelUnavailable,

    #[error("model persistence failed: {0}")]
    Persistence(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probs(pairs: &[(SentimentLabel, f64)]) -> ClassProbabilities {
        ClassProbabilities::new(pairs.iter().copied().collect())
    }

    #[test]
    fn fallback_matches_documented_values() {
        let r = AnalysisResult::fallback();
        assert_eq!(r.sentiment_label, SentimentLabel::Neutral);
        assert_eq!(r.sentiment_score, 0.0);
        assert_eq!(r.confidence_score, 0.5);
        assert_eq!((r.positive_score, r.negative_score, r.neutral_score), (0.33, 0.33, 0.34));
        assert!(r.is_fallback());
    }

    #[test]
    fn derives_scores_from_distribution() {
        let p = probs(&[
            (SentimentLabel::Negative, 0.1),
            (SentimentLabel::Neutral, 0.2),
            (SentimentLabel::Positive, 0.7),
        ]);
        let r = AnalysisResult::from_prediction(SentimentLabel::Positive, &p).unwrap();
        assert_eq!(r.confidence_score, 0.7);
        assert!((r.sentiment_score - 0.6).abs() < 1e-12);
        assert!(!r.is_fallback());
    }

    #[test]
    fn neutral_win_keeps_signed_polarity() {
        let p = probs(&[
            (SentimentLabel::Negative, 0.05),
            (SentimentLabel::Neutral, 0.48),
            (SentimentLabel::Positive, 0.47),
        ]);
        let r = AnalysisResult::from_prediction(SentimentLabel::Neutral, &p).unwrap();
        assert_eq!(r.sentiment_label, SentimentLabel::Neutral);
        assert!(r.sentiment_score > 0.4);
        assert_eq!(r.confidence_score, 0.48);
    }

    #[test]
    fn unseen_labels_score_zero() {
        let p = probs(&[(SentimentLabel::Negative, 0.4), (SentimentLabel::Positive, 0.6)]);
        let r = AnalysisResult::from_prediction(SentimentLabel::Positive, &p).unwrap();
        assert_eq!(r.neutral_score, 0.0);
    }

    #[test]
    fn rejects_non_finite_probabilities() {
        let p = probs(&[(SentimentLabel::Positive, f64::NAN)]);
        assert!(matches!(
            AnalysisResult::from_prediction(SentimentLabel::Positive, &p),
            Err(SentimentError::Inference(_))
        ));
    }

    #[test]
    fn argmax_prefers_earliest_label_on_ties() {
        let p = probs(&[(SentimentLabel::Negative, 0.5), (SentimentLabel::Positive, 0.5)]);
        assert_eq!(p.argmax().unwrap().0, SentimentLabel::Negative);
    }
}
