//! Loading training corpora from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use revsense_sentiment::{SentimentLabel, TrainingCorpus};

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("read corpus {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse corpus {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a JSON array of `{"text": "...", "label": "positive|negative|neutral"}`.
pub fn load_corpus(path: &Path) -> Result<TrainingCorpus, CorpusError> {
    let text = fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let corpus: TrainingCorpus = serde_json::from_str(&text).map_err(|source| CorpusError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        examples = corpus.len(),
        positive = corpus.count(SentimentLabel::Positive),
        negative = corpus.count(SentimentLabel::Negative),
        neutral = corpus.count(SentimentLabel::Neutral),
        "loaded training corpus"
    );
    Ok(corpus)
}
