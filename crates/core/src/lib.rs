//! `revsense-core` — shared foundation building blocks.
//!
//! Identifiers and the domain error model. No IO, no infrastructure concerns.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{ModelVersion, ReviewId, TrainingRunId};
