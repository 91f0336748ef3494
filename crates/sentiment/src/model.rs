//! The trained model unit: feature extractor + classifier + metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use revsense_core::ModelVersion;

use crate::classifier::MultinomialNb;
use crate::features::{SparseVector, TfidfVectorizer};
use crate::label::SentimentLabel;
use crate::metrics::TrainingMetrics;
use crate::result::{ClassProbabilities, SentimentError};
use crate::training::TrainingConfig;

/// Human-readable algorithm name reported by model info.
pub const ALGORITHM: &str = "Multinomial Naive Bayes with TF-IDF";

/// A trained, immutable sentiment model.
///
/// Replaced wholesale on retrain, never mutated in place once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentModel {
    version: ModelVersion,
    trained_at: DateTime<Utc>,
    sample_count: usize,
    config: TrainingConfig,
    vectorizer: TfidfVectorizer,
    classifier: MultinomialNb,
    metrics: Option<TrainingMetrics>,
}

impl SentimentModel {
    /// Fit extractor and classifier on already-normalized texts.
    pub fn fit<S: AsRef<str>>(
        config: &TrainingConfig,
        texts: &[S],
        labels: &[SentimentLabel],
    ) -> Result<Self, SentimentError> {
        let vectorizer = TfidfVectorizer::fit(&config.vectorizer, texts)?;
        let samples: Vec<SparseVector> = texts.iter().map(|t| vectorizer.transform(t.as_ref())).collect();
        let classifier =
            MultinomialNb::fit(&config.classifier, &samples, labels, vectorizer.feature_count())?;

        Ok(Self {
            version: ModelVersion::new(),
            trained_at: Utc::now(),
            sample_count: texts.len(),
            config: config.clone(),
            vectorizer,
            classifier,
            metrics: None,
        })
    }

    pub(crate) fn with_metrics(mut self, metrics: TrainingMetrics, sample_count: usize) -> Self {
        self.metrics = Some(metrics);
        self.sample_count = sample_count;
        self
    }

    /// Check a loaded model before it can be published: the vectorizer and
    /// classifier must agree on the feature space and label set.
    pub fn validate(&self) -> Result<(), SentimentError> {
        self.vectorizer.validate()?;
        self.classifier.validate(self.vectorizer.feature_count())
    }

    pub fn transform(&self, normalized: &str) -> SparseVector {
        self.vectorizer.transform(normalized)
    }

    pub fn predict(&self, normalized: &str) -> SentimentLabel {
        self.classifier.predict(&self.transform(normalized))
    }

    pub fn predict_proba(&self, normalized: &str) -> ClassProbabilities {
        self.classifier.predict_proba(&self.transform(normalized))
    }

    pub fn version(&self) -> ModelVersion {
        self.version
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Number of usable examples in the corpus the model was trained from.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn labels(&self) -> &[SentimentLabel] {
        self.classifier.labels()
    }

    pub fn feature_count(&self) -> usize {
        self.vectorizer.feature_count()
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Held-out and cross-validation metrics recorded when the model was trained.
    pub fn metrics(&self) -> Option<&TrainingMetrics> {
        self.metrics.as_ref()
    }
}
