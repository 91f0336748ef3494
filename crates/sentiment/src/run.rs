//! Immutable records of training runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use revsense_core::{ModelVersion, TrainingRunId};

use crate::metrics::TrainingMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
    AlreadyTrained,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::AlreadyTrained => "already_trained",
        }
    }
}

/// Audit record of one `train` invocation.
///
/// Only constructed through [`RunStarted`], once the outcome is known, so a
/// partially populated run is never observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRun {
    pub id: TrainingRunId,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub sample_count: usize,
    pub metrics: Option<TrainingMetrics>,
    pub status: RunStatus,
    pub model_version: Option<ModelVersion>,
    pub notes: String,
}

impl TrainingRun {
    pub fn accuracy(&self) -> Option<f64> {
        self.metrics.as_ref().map(|m| m.accuracy)
    }

    pub fn is_success(&self) -> bool {
        self.status != RunStatus::Failed
    }
}

/// A run that has started but not finished. Consumed by exactly one of the
/// closing methods.
#[derive(Debug)]
pub struct RunStarted {
    id: TrainingRunId,
    started_at: DateTime<Utc>,
}

impl RunStarted {
    pub fn begin() -> Self {
        Self {
            id: TrainingRunId::new(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> TrainingRunId {
        self.id
    }

    fn close(
        self,
        status: RunStatus,
        sample_count: usize,
        metrics: Option<TrainingMetrics>,
        model_version: Option<ModelVersion>,
        notes: String,
    ) -> TrainingRun {
        TrainingRun {
            id: self.id,
            started_at: self.started_at,
            completed_at: Some(Utc::now()),
            sample_count,
            metrics,
            status,
            model_version,
            notes,
        }
    }

    pub fn completed(self, sample_count: usize, metrics: TrainingMetrics, version: ModelVersion) -> TrainingRun {
        let notes = format!("trained on {sample_count} examples");
        self.close(RunStatus::Completed, sample_count, Some(metrics), Some(version), notes)
    }

    pub fn failed(self, notes: impl Into<String>) -> TrainingRun {
        self.close(RunStatus::Failed, 0, None, None, notes.into())
    }

    /// Skipped fit: carries the active model's metrics and a sample count of 0.
    pub fn already_trained(self, metrics: Option<TrainingMetrics>, version: ModelVersion) -> TrainingRun {
        self.close(
            RunStatus::AlreadyTrained,
            0,
            metrics,
            Some(version),
            "model already trained; pass force to retrain".to_string(),
        )
    }
}
