//! Training run audit log.

use std::sync::{Arc, Mutex};

use crate::result::SentimentError;
use crate::run::TrainingRun;

/// Append-only record of training runs.
pub trait TrainingLog: Send + Sync {
    fn record(&self, run: &TrainingRun) -> Result<(), SentimentError>;

    /// All recorded runs, oldest first.
    fn list(&self) -> Result<Vec<TrainingRun>, SentimentError>;

    fn latest(&self) -> Result<Option<TrainingRun>, SentimentError> {
        Ok(self.list()?.pop())
    }
}

impl<T> TrainingLog for Arc<T>
where
    T: TrainingLog + ?Sized,
{
    fn record(&self, run: &TrainingRun) -> Result<(), SentimentError> {
        (**self).record(run)
    }

    fn list(&self) -> Result<Vec<TrainingRun>, SentimentError> {
        (**self).list()
    }

    fn latest(&self) -> Result<Option<TrainingRun>, SentimentError> {
        (**self).latest()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTrainingLog {
    runs: Mutex<Vec<TrainingRun>>,
}

impl InMemoryTrainingLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrainingLog for InMemoryTrainingLog {
    fn record(&self, run: &TrainingRun) -> Result<(), SentimentError> {
        let mut runs = self
            .runs
            .lock()
            .map_err(|_| SentimentError::Persistence("training log lock poisoned".to_string()))?;
        runs.push(run.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<TrainingRun>, SentimentError> {
        let runs = self
            .runs
            .lock()
            .map_err(|_| SentimentError::Persistence("training log lock poisoned".to_string()))?;
        Ok(runs.clone())
    }
}
