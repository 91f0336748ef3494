//! Infrastructure layer: file persistence, read models, event workers, jobs.

pub mod backfill;
pub mod config;
pub mod corpus;
pub mod fs;
pub mod model_store;
pub mod read_model;
pub mod retry;
pub mod reviews;
pub mod subscriber;
pub mod training_log;
pub mod workers;

pub use backfill::{BACKFILL_BATCH_SIZE, Backfill, BackfillReport};
pub use config::{ConfigError, RevsenseConfig};
pub use corpus::{CorpusError, load_corpus};
pub use model_store::FileModelStore;
pub use read_model::{
    DisplayHint, InMemoryReviewSentimentStore, JsonFileReviewSentimentStore, ReadModelError, ReviewSentiment,
    ReviewSentimentStore, UpsertOutcome,
};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use reviews::{InMemoryReviewSource, JsonReviewSource, Review, ReviewSource};
pub use subscriber::ReviewSentimentSubscriber;
pub use training_log::JsonlTrainingLog;
pub use workers::{SentimentWorker, WorkerHandle};
