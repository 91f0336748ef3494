//! Durable training run audit log.

pub mod jsonl;

pub use jsonl::JsonlTrainingLog;
