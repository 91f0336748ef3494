//! Single-file JSON model artifact with an integrity checksum.
//!
//! Layout: `{"format_version": 1, "checksum": "<sha256 hex>", "model": {...}}`.
//! The checksum covers the exact bytes of `model`. Any mismatch, unknown
//! version or parse failure makes the artifact corrupt.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};
use tracing::debug;

use revsense_sentiment::{ModelStore, SentimentError, SentimentModel};

use crate::fs::write_atomic;
use crate::retry::RetryPolicy;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Artifact<'a> {
    format_version: u32,
    checksum: String,
    #[serde(borrow)]
    model: &'a RawValue,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Stores the active model as one JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
    retry: RetryPolicy,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, reason: impl std::fmt::Display) -> SentimentError {
        SentimentError::Persistence(format!("corrupt model artifact {}: {reason}", self.path.display()))
    }

    fn encode(model: &SentimentModel) -> Result<Vec<u8>, SentimentError> {
        let raw = serde_json::value::to_raw_value(model)
            .map_err(|e| SentimentError::Persistence(format!("serialize model: {e}")))?;
        let artifact = Artifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            checksum: sha256_hex(raw.get().as_bytes()),
            model: &raw,
        };
        serde_json::to_vec(&artifact).map_err(|e| SentimentError::Persistence(format!("serialize artifact: {e}")))
    }

    fn decode(&self, text: &str) -> Result<SentimentModel, SentimentError> {
        let artifact: Artifact<'_> = serde_json::from_str(text).map_err(|e| self.corrupt(e))?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(self.corrupt(format!("unsupported format version {}", artifact.format_version)));
        }
        let actual = sha256_hex(artifact.model.get().as_bytes());
        if actual != artifact.checksum {
            return Err(self.corrupt("checksum mismatch"));
        }
        let model: SentimentModel = serde_json::from_str(artifact.model.get()).map_err(|e| self.corrupt(e))?;
        model.validate().map_err(|e| self.corrupt(e))?;
        Ok(model)
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, model: &SentimentModel) -> Result<(), SentimentError> {
        let bytes = Self::encode(model)?;
        self.retry
            .run("save model artifact", || write_atomic(&self.path, &bytes))
            .map_err(|e| SentimentError::Persistence(format!("write {}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), model_version = %model.version(), "model artifact written");
        Ok(())
    }

    fn load(&self) -> Result<Option<SentimentModel>, SentimentError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SentimentError::Persistence(format!("read {}: {e}", self.path.display())));
            }
        };
        self.decode(&text).map(Some)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revsense_sentiment::{SentimentLabel, TrainingConfig, TrainingCorpus, fit_model};

    fn model() -> SentimentModel {
        let base = [
            ("Great sound and solid build, love it", SentimentLabel::Positive),
            ("Stopped charging after a week, awful", SentimentLabel::Negative),
            ("Average headphones, fine for the price", SentimentLabel::Neutral),
        ];
        let corpus = TrainingCorpus::from_pairs((0..5).flat_map(|_| base));
        fit_model(&TrainingConfig::default(), &corpus).unwrap()
    }

    #[test]
    fn missing_artifact_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path().join("model.json"));
        assert!(!store.exists());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn saved_model_loads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path().join("models").join("model.json"));
        let model = model();
        store.save(&model).unwrap();

        assert!(store.exists());
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, model);
        assert_eq!(
            loaded.predict_proba("love the solid build"),
            model.predict_proba("love the solid build")
        );
    }

    #[test]
    fn tampered_model_fails_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let store = FileModelStore::new(&path);
        store.save(&model()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let tampered = text.replacen("\"alpha\":1.0", "\"alpha\":2.0", 1);
        assert_ne!(text, tampered);
        fs::write(&path, tampered).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, SentimentError::Persistence(msg) if msg.contains("checksum")));
    }

    #[test]
    fn garbage_and_unknown_versions_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let store = FileModelStore::new(&path);

        fs::write(&path, "not json").unwrap();
        assert!(store.load().is_err());

        fs::write(&path, r#"{"format_version":99,"checksum":"","model":{}}"#).unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, SentimentError::Persistence(msg) if msg.contains("format version 99")));
    }

    #[test]
    fn inconsistent_model_with_valid_checksum_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let store = FileModelStore::new(&path);

        let mut model = serde_json::to_value(model()).unwrap();
        model["vectorizer"]["idf"] = serde_json::json!([]);
        let raw = serde_json::value::to_raw_value(&model).unwrap();
        let artifact = Artifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            checksum: sha256_hex(raw.get().as_bytes()),
            model: &raw,
        };
        fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, SentimentError::Persistence(msg) if msg.contains("corrupt")));
    }

    #[test]
    fn save_replaces_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path().join("model.json"));
        let first = model();
        let second = model();
        store.save(&first).unwrap();
        store.save(&second).unwrap();
        assert_eq!(store.load().unwrap().unwrap().version(), second.version());
    }
}
