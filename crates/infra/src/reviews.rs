//! Review sources for bulk (re-)analysis.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use revsense_core::ReviewId;

use crate::read_model::ReadModelError;

/// The slice of a storefront review that sentiment analysis needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: ReviewId,
    /// Review body; absent when the customer left only a rating.
    #[serde(default, alias = "comment")]
    pub text: Option<String>,
}

impl Review {
    pub fn new(review_id: ReviewId, text: impl Into<String>) -> Self {
        Self {
            review_id,
            text: Some(text.into()),
        }
    }
}

/// Bulk query over all reviews known to the storefront.
pub trait ReviewSource: Send + Sync {
    fn all_reviews(&self) -> Result<Vec<Review>, ReadModelError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryReviewSource {
    reviews: Vec<Review>,
}

impl InMemoryReviewSource {
    pub fn new(reviews: Vec<Review>) -> Self {
        Self { reviews }
    }
}

impl ReviewSource for InMemoryReviewSource {
    fn all_reviews(&self) -> Result<Vec<Review>, ReadModelError> {
        Ok(self.reviews.clone())
    }
}

/// Reviews exported as a JSON array of `{"review_id": .., "text": ..}`.
#[derive(Debug, Clone)]
pub struct JsonReviewSource {
    path: PathBuf,
}

impl JsonReviewSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReviewSource for JsonReviewSource {
    fn all_reviews(&self) -> Result<Vec<Review>, ReadModelError> {
        let text = fs::read_to_string(&self.path).map_err(|source| ReadModelError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ReadModelError::Json {
            path: self.path.clone(),
            source,
        })
    }
}
