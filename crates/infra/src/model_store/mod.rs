//! Durable sentiment model storage.

pub mod file;

pub use file::{ARTIFACT_FORMAT_VERSION, FileModelStore};
