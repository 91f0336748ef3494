//! TF-IDF feature extraction over a corpus-derived n-gram vocabulary.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::result::SentimentError;
use crate::stopwords::StopWords;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern"));

/// Extractor parameters. Persisted with the model so inference uses the exact
/// analyzer the model was fit with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Vocabulary cap (highest corpus frequency wins).
    pub max_features: usize,
    /// Inclusive n-gram range, e.g. `(1, 2)` for unigrams and bigrams.
    pub ngram_range: (usize, usize),
    /// Ignore terms appearing in fewer documents than this.
    pub min_df: usize,
    /// Ignore terms appearing in more than this fraction of documents.
    pub max_df: f64,
    pub stop_words: StopWords,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_range: (1, 2),
            min_df: 2,
            max_df: 0.8,
            stop_words: StopWords::English,
        }
    }
}

impl VectorizerConfig {
    fn validate(&self) -> Result<(), SentimentError> {
        let (lo, hi) = self.ngram_range;
        if lo == 0 || hi < lo {
            return Err(SentimentError::InvalidInput(format!(
                "invalid ngram_range ({lo}, {hi})"
            )));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(SentimentError::InvalidInput(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == 0 {
            return Err(SentimentError::InvalidInput("max_features must be positive".to_string()));
        }
        Ok(())
    }

    /// Split normalized text into stop-word-filtered n-gram terms.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = TOKEN
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(t))
            .collect();

        let (lo, hi) = self.ngram_range;
        let mut terms = Vec::new();
        for n in lo..=hi {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }
}

/// Sparse row vector: `(feature index, weight)` pairs in ascending index order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }
}

/// Fitted TF-IDF vectorizer.
///
/// Weights are raw term counts times smoothed idf `ln((1 + n) / (1 + df)) + 1`,
/// L2-normalized per document. Feature indices follow lexicographic term order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and idf weights from normalized documents.
    pub fn fit<S: AsRef<str>>(config: &VectorizerConfig, documents: &[S]) -> Result<Self, SentimentError> {
        config.validate()?;

        let n_docs = documents.len();
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        let mut term_freq: BTreeMap<String, usize> = BTreeMap::new();

        for doc in documents {
            let terms = config.analyze(doc.as_ref());
            let unique: BTreeSet<&String> = terms.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *term_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = config.max_df * n_docs as f64;
        let mut kept: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= config.min_df && (*df as f64) <= max_doc_count)
            .collect();

        if kept.is_empty() {
            return Err(SentimentError::InsufficientVocabulary {
                min_df: config.min_df,
                max_df: config.max_df,
            });
        }

        if kept.len() > config.max_features {
            let freq = |t: &str| term_freq.get(t).copied().unwrap_or(0);
            kept.sort_by(|(a, _), (b, _)| freq(b.as_str()).cmp(&freq(a.as_str())).then_with(|| a.cmp(b)));
            kept.truncate(config.max_features);
            kept.sort_by(|(a, _), (b, _)| a.cmp(b));
        }

        let n = n_docs as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (index, (term, df)) in kept.into_iter().enumerate() {
            vocabulary.insert(term, index);
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        Ok(Self {
            config: config.clone(),
            vocabulary,
            idf,
        })
    }

    /// Vectorize one normalized document. Out-of-vocabulary terms are ignored,
    /// so a document with no known terms yields an empty vector.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.config.analyze(document) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .filter_map(|(index, tf)| self.idf.get(index).map(|idf| (index, tf * idf)))
            .collect();

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut entries {
                *v /= norm;
            }
        }

        SparseVector { entries }
    }

    pub fn feature_count(&self) -> usize {
        self.vocabulary.len()
    }

    /// Check that a deserialized vectorizer is internally consistent.
    pub fn validate(&self) -> Result<(), SentimentError> {
        if self.vocabulary.is_empty() {
            return Err(SentimentError::InvalidInput("empty vocabulary".to_string()));
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(SentimentError::InvalidInput(format!(
                "{} idf weights for {} terms",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        if let Some((term, index)) = self.vocabulary.iter().find(|(_, i)| **i >= self.idf.len()) {
            return Err(SentimentError::InvalidInput(format!(
                "term {term:?} maps to feature {index} beyond {} features",
                self.idf.len()
            )));
        }
        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err(SentimentError::InvalidInput("non-finite idf weight".to_string()));
        }
        Ok(())
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }
}
