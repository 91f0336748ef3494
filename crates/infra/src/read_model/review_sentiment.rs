//! One stored analysis per review, upserted by the subscriber and backfill.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use revsense_core::ReviewId;
use revsense_sentiment::{AnalysisResult, SentimentLabel};

use crate::fs::write_atomic;

#[derive(Debug, Error)]
pub enum ReadModelError {
    #[error("read model lock poisoned")]
    Poisoned,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: malformed JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Presentation class the storefront uses for a sentiment badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayHint {
    Success,
    Danger,
    Secondary,
}

impl DisplayHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Secondary => "secondary",
        }
    }
}

/// The persisted analysis for a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSentiment {
    pub review_id: ReviewId,
    #[serde(flatten)]
    pub result: AnalysisResult,
    /// First analysis; preserved across re-analysis.
    pub analyzed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewSentiment {
    pub fn display_hint(&self) -> DisplayHint {
        match self.result.sentiment_label {
            SentimentLabel::Positive => DisplayHint::Success,
            SentimentLabel::Negative => DisplayHint::Danger,
            SentimentLabel::Neutral => DisplayHint::Secondary,
        }
    }

    fn upserted(existing: Option<&ReviewSentiment>, review_id: ReviewId, result: AnalysisResult) -> Self {
        let now = Utc::now();
        Self {
            review_id,
            result,
            analyzed_at: existing.map(|e| e.analyzed_at).unwrap_or(now),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Review-keyed sentiment storage with create-or-update semantics.
pub trait ReviewSentimentStore: Send + Sync {
    fn get(&self, review_id: &ReviewId) -> Result<Option<ReviewSentiment>, ReadModelError>;

    fn upsert(&self, review_id: ReviewId, result: AnalysisResult) -> Result<UpsertOutcome, ReadModelError>;

    /// Upsert many results at once, returning one outcome per record in order.
    ///
    /// The default applies records one at a time and stops at the first error;
    /// stores that can apply a batch atomically override it.
    fn upsert_batch(&self, batch: Vec<(ReviewId, AnalysisResult)>) -> Result<Vec<UpsertOutcome>, ReadModelError> {
        batch
            .into_iter()
            .map(|(review_id, result)| self.upsert(review_id, result))
            .collect()
    }

    /// All stored results ordered by review id.
    fn list(&self) -> Result<Vec<ReviewSentiment>, ReadModelError>;

    fn contains(&self, review_id: &ReviewId) -> Result<bool, ReadModelError> {
        Ok(self.get(review_id)?.is_some())
    }
}

impl<S> ReviewSentimentStore for Arc<S>
where
    S: ReviewSentimentStore + ?Sized,
{
    fn get(&self, review_id: &ReviewId) -> Result<Option<ReviewSentiment>, ReadModelError> {
        (**self).get(review_id)
    }

    fn upsert(&self, review_id: ReviewId, result: AnalysisResult) -> Result<UpsertOutcome, ReadModelError> {
        (**self).upsert(review_id, result)
    }

    fn upsert_batch(&self, batch: Vec<(ReviewId, AnalysisResult)>) -> Result<Vec<UpsertOutcome>, ReadModelError> {
        (**self).upsert_batch(batch)
    }

    fn list(&self) -> Result<Vec<ReviewSentiment>, ReadModelError> {
        (**self).list()
    }

    fn contains(&self, review_id: &ReviewId) -> Result<bool, ReadModelError> {
        (**self).contains(review_id)
    }
}

fn upsert_into(
    map: &mut BTreeMap<ReviewId, ReviewSentiment>,
    review_id: ReviewId,
    result: AnalysisResult,
) -> UpsertOutcome {
    let record = ReviewSentiment::upserted(map.get(&review_id), review_id, result);
    match map.insert(review_id, record) {
        Some(_) => UpsertOutcome::Updated,
        None => UpsertOutcome::Created,
    }
}

/// In-memory store for tests and single-process use.
#[derive(Debug, Default)]
pub struct InMemoryReviewSentimentStore {
    inner: RwLock<BTreeMap<ReviewId, ReviewSentiment>>,
}

impl InMemoryReviewSentimentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReviewSentimentStore for InMemoryReviewSentimentStore {
    fn get(&self, review_id: &ReviewId) -> Result<Option<ReviewSentiment>, ReadModelError> {
        let map = self.inner.read().map_err(|_| ReadModelError::Poisoned)?;
        Ok(map.get(review_id).cloned())
    }

    fn upsert(&self, review_id: ReviewId, result: AnalysisResult) -> Result<UpsertOutcome, ReadModelError> {
        let mut map = self.inner.write().map_err(|_| ReadModelError::Poisoned)?;
        Ok(upsert_into(&mut map, review_id, result))
    }

    fn upsert_batch(&self, batch: Vec<(ReviewId, AnalysisResult)>) -> Result<Vec<UpsertOutcome>, ReadModelError> {
        let mut map = self.inner.write().map_err(|_| ReadModelError::Poisoned)?;
        Ok(batch
            .into_iter()
            .map(|(review_id, result)| upsert_into(&mut map, review_id, result))
            .collect())
    }

    fn list(&self) -> Result<Vec<ReviewSentiment>, ReadModelError> {
        let map = self.inner.read().map_err(|_| ReadModelError::Poisoned)?;
        Ok(map.values().cloned().collect())
    }
}

/// Store backed by a JSON array file, rewritten atomically on every upsert
/// (once per batch for [`ReviewSentimentStore::upsert_batch`]).
#[derive(Debug)]
pub struct JsonFileReviewSentimentStore {
    path: PathBuf,
    inner: RwLock<BTreeMap<ReviewId, ReviewSentiment>>,
}

impl JsonFileReviewSentimentStore {
    /// Open `path`, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ReadModelError> {
        let path = path.into();
        let records: Vec<ReviewSentiment> = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| ReadModelError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(ReadModelError::Io { path, source }),
        };
        let inner = records.into_iter().map(|r| (r.review_id, r)).collect();
        Ok(Self {
            path,
            inner: RwLock::new(inner),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, map: &BTreeMap<ReviewId, ReviewSentiment>) -> Result<(), ReadModelError> {
        let records: Vec<&ReviewSentiment> = map.values().collect();
        let bytes = serde_json::to_vec_pretty(&records).map_err(|source| ReadModelError::Json {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &bytes).map_err(|source| ReadModelError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl ReviewSentimentStore for JsonFileReviewSentimentStore {
    fn get(&self, review_id: &ReviewId) -> Result<Option<ReviewSentiment>, ReadModelError> {
        let map = self.inner.read().map_err(|_| ReadModelError::Poisoned)?;
        Ok(map.get(review_id).cloned())
    }

    fn upsert(&self, review_id: ReviewId, result: AnalysisResult) -> Result<UpsertOutcome, ReadModelError> {
        let mut map = self.inner.write().map_err(|_| ReadModelError::Poisoned)?;
        let previous = map.get(&review_id).cloned();
        let outcome = upsert_into(&mut map, review_id, result);
        if let Err(err) = self.flush(&map) {
            match previous {
                Some(record) => map.insert(review_id, record),
                None => map.remove(&review_id),
            };
            return Err(err);
        }
        Ok(outcome)
    }

    /// All-or-nothing: a failed write leaves none of the batch applied.
    fn upsert_batch(&self, batch: Vec<(ReviewId, AnalysisResult)>) -> Result<Vec<UpsertOutcome>, ReadModelError> {
        let mut map = self.inner.write().map_err(|_| ReadModelError::Poisoned)?;
        let snapshot = map.clone();
        let outcomes = batch
            .into_iter()
            .map(|(review_id, result)| upsert_into(&mut map, review_id, result))
            .collect();
        if let Err(err) = self.flush(&map) {
            *map = snapshot;
            return Err(err);
        }
        Ok(outcomes)
    }

    fn list(&self) -> Result<Vec<ReviewSentiment>, ReadModelError> {
        let map = self.inner.read().map_err(|_| ReadModelError::Poisoned)?;
        Ok(map.values().cloned().collect())
    }
}
