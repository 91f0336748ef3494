//! Disposable read models derived from sentiment analysis.

pub mod review_sentiment;

pub use review_sentiment::{
    DisplayHint, InMemoryReviewSentimentStore, JsonFileReviewSentimentStore, ReadModelError, ReviewSentiment,
    ReviewSentimentStore, UpsertOutcome,
};
