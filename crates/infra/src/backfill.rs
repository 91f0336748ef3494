//! Bulk analysis of stored reviews.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use revsense_sentiment::InferenceService;

use crate::read_model::{ReadModelError, ReviewSentimentStore, UpsertOutcome};
use crate::reviews::{Review, ReviewSource};

/// Results stored per [`ReviewSentimentStore::upsert_batch`] call.
pub const BACKFILL_BATCH_SIZE: usize = 500;

/// Which reviews to (re-)analyze.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Backfill {
    /// Re-analyze reviews that already have a stored result.
    pub force: bool,
    /// Process at most this many reviews.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    pub analyzed: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: usize,
}

impl Backfill {
    /// Reviews this backfill would process, in source order.
    pub fn pending<S, R>(&self, source: &S, store: &R) -> Result<Vec<Review>, ReadModelError>
    where
        S: ReviewSource,
        R: ReviewSentimentStore,
    {
        let mut pending = Vec::new();
        for review in source.all_reviews()? {
            if self.limit.is_some_and(|limit| pending.len() >= limit) {
                break;
            }
            if self.force || !store.contains(&review.review_id)? {
                pending.push(review);
            }
        }
        Ok(pending)
    }

    /// Analyze pending reviews and upsert their results in batches.
    ///
    /// Failing to list reviews aborts the run; a failed batch counts each of
    /// its reviews as an error and the run continues.
    pub fn run<S, R>(&self, source: &S, store: &R, inference: &InferenceService) -> Result<BackfillReport, ReadModelError>
    where
        S: ReviewSource,
        R: ReviewSentimentStore,
    {
        let pending = self.pending(source, store)?;
        info!(reviews = pending.len(), force = self.force, limit = ?self.limit, "starting sentiment backfill");

        let mut report = BackfillReport::default();
        for chunk in pending.chunks(BACKFILL_BATCH_SIZE) {
            let results = inference.batch_analyze(chunk.iter().map(|r| r.text.as_deref()));
            report.analyzed += chunk.len();
            let batch = chunk.iter().map(|r| r.review_id).zip(results).collect();
            match store.upsert_batch(batch) {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        match outcome {
                            UpsertOutcome::Created => report.created += 1,
                            UpsertOutcome::Updated => report.updated += 1,
                        }
                    }
                }
                Err(err) => {
                    report.errors += chunk.len();
                    warn!(reviews = chunk.len(), error = %err, "failed to store review sentiment batch");
                }
            }
        }

        info!(
            analyzed = report.analyzed,
            created = report.created,
            updated = report.updated,
            errors = report.errors,
            "sentiment backfill finished"
        );
        Ok(report)
    }
}
