//! Background event consumers.

pub mod sentiment_worker;

pub use sentiment_worker::{SentimentWorker, WorkerHandle};
