//! Multinomial naive Bayes over TF-IDF weighted features.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::features::SparseVector;
use crate::label::SentimentLabel;
use crate::result::{ClassProbabilities, SentimentError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Additive (Laplace) smoothing constant.
    pub alpha: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

/// Fitted classifier parameters.
///
/// The label set is fixed at fit time; a label absent from the training data can
/// never be predicted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    labels: Vec<SentimentLabel>,
    class_log_prior: Vec<f64>,
    /// `feature_log_prob[class][feature]`.
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    pub fn fit(
        config: &ClassifierConfig,
        samples: &[SparseVector],
        labels: &[SentimentLabel],
        n_features: usize,
    ) -> Result<Self, SentimentError> {
        if !(config.alpha.is_finite() && config.alpha > 0.0) {
            return Err(SentimentError::InvalidInput(format!(
                "alpha must be a finite positive number, got {}",
                config.alpha
            )));
        }
        if samples.len() != labels.len() {
            return Err(SentimentError::InvalidInput(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        if samples.is_empty() || n_features == 0 {
            return Err(SentimentError::InvalidInput(
                "cannot fit a classifier without samples or features".to_string(),
            ));
        }

        let mut class_counts: BTreeMap<SentimentLabel, usize> = BTreeMap::new();
        for label in labels {
            *class_counts.entry(*label).or_insert(0) += 1;
        }
        let classes: Vec<SentimentLabel> = class_counts.keys().copied().collect();
        let class_index: BTreeMap<SentimentLabel, usize> =
            classes.iter().enumerate().map(|(i, l)| (*l, i)).collect();

        let mut feature_count = vec![vec![0.0_f64; n_features]; classes.len()];
        for (x, label) in samples.iter().zip(labels) {
            let row = &mut feature_count[class_index[label]];
            for (j, v) in x.iter() {
                if j >= n_features {
                    return Err(SentimentError::InvalidInput(format!(
                        "feature index {j} out of range for {n_features} features"
                    )));
                }
                row[j] += v;
            }
        }

        let total = labels.len() as f64;
        let class_log_prior = classes
            .iter()
            .map(|l| (class_counts[l] as f64 / total).ln())
            .collect();

        let alpha = config.alpha;
        let feature_log_prob = feature_count
            .into_iter()
            .map(|row| {
                let denom = (row.iter().sum::<f64>() + alpha * n_features as f64).ln();
                row.into_iter().map(|c| (c + alpha).ln() - denom).collect()
            })
            .collect();

        Ok(Self {
            alpha,
            labels: classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    fn joint_log_likelihood(&self, x: &SparseVector) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, flp)| {
                prior + x.iter().filter_map(|(j, v)| flp.get(j).map(|lp| v * lp)).sum::<f64>()
            })
            .collect()
    }

    pub fn predict(&self, x: &SparseVector) -> SentimentLabel {
        let jll = self.joint_log_likelihood(x);
        let mut best = 0;
        for (i, score) in jll.iter().enumerate() {
            if *score > jll[best] {
                best = i;
            }
        }
        self.labels[best]
    }

    /// Posterior over the fitted labels (log-sum-exp normalized).
    pub fn predict_proba(&self, x: &SparseVector) -> ClassProbabilities {
        let jll = self.joint_log_likelihood(x);
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let log_norm = max + jll.iter().map(|s| (s - max).exp()).sum::<f64>().ln();

        ClassProbabilities::new(
            self.labels
                .iter()
                .zip(&jll)
                .map(|(label, s)| (*label, (s - log_norm).exp()))
                .collect(),
        )
    }

    pub fn labels(&self) -> &[SentimentLabel] {
        &self.labels
    }

    /// Check that deserialized parameters agree with each other and with
    /// the `n_features` of the vectorizer they are paired with.
    pub fn validate(&self, n_features: usize) -> Result<(), SentimentError> {
        if self.labels.is_empty() {
            return Err(SentimentError::InvalidInput("classifier has no labels".to_string()));
        }
        if self.class_log_prior.len() != self.labels.len() || self.feature_log_prob.len() != self.labels.len() {
            return Err(SentimentError::InvalidInput(format!(
                "{} labels, {} priors, {} feature rows",
                self.labels.len(),
                self.class_log_prior.len(),
                self.feature_log_prob.len()
            )));
        }
        if let Some(row) = self.feature_log_prob.iter().find(|row| row.len() != n_features) {
            return Err(SentimentError::InvalidInput(format!(
                "feature row has {} entries, expected {n_features}",
                row.len()
            )));
        }
        let finite = self
            .class_log_prior
            .iter()
            .chain(self.feature_log_prob.iter().flatten())
            .all(|v| v.is_finite());
        if !finite {
            return Err(SentimentError::InvalidInput("non-finite log probability".to_string()));
        }
        Ok(())
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}
