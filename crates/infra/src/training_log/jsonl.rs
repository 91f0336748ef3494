//! Append-only JSON-lines training log (one `TrainingRun` per line).

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use revsense_sentiment::{SentimentError, TrainingLog, TrainingRun};

#[derive(Debug)]
pub struct JsonlTrainingLog {
    path: PathBuf,
    append: Mutex<()>,
}

impl JsonlTrainingLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: io::Error) -> SentimentError {
        SentimentError::Persistence(format!("training log {}: {e}", self.path.display()))
    }
}

impl TrainingLog for JsonlTrainingLog {
    fn record(&self, run: &TrainingRun) -> Result<(), SentimentError> {
        let mut line = serde_json::to_string(run)
            .map_err(|e| SentimentError::Persistence(format!("serialize training run: {e}")))?;
        line.push('\n');

        let _append = self.append.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes()).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    /// Runs in append order. Lines that fail to parse are skipped with a warning.
    fn list(&self) -> Result<Vec<TrainingRun>, SentimentError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut runs = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(run) => runs.push(run),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "skipping malformed training log entry"
                ),
            }
        }
        Ok(runs)
    }
}
