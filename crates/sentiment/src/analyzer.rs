//! The sentiment analyzer facade: model lifecycle plus inference.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use revsense_core::ModelVersion;

use crate::corpus::TrainingCorpus;
use crate::log::TrainingLog;
use crate::model::ALGORITHM;
use crate::result::{AnalysisResult, SentimentError};
use crate::run::TrainingRun;
use crate::service::InferenceService;
use crate::slot::{ModelSlot, ModelState};
use crate::store::ModelStore;
use crate::training::{TrainingConfig, TrainingPipeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    NotTrained,
    Trained,
}

/// Observability snapshot of the active model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub status: ModelStatus,
    pub state: ModelState,
    pub algorithm: String,
    pub feature_count: Option<usize>,
    pub artifact_location: String,
    pub artifact_exists: bool,
    pub model_version: Option<ModelVersion>,
    pub trained_at: Option<DateTime<Utc>>,
}

/// Owns one model slot, the pipeline that replaces it and the service that
/// reads it.
///
/// Construct with [`SentimentAnalyzer::new`] for an unloaded analyzer or
/// [`SentimentAnalyzer::open`] to load or train a model immediately.
pub struct SentimentAnalyzer<S, L> {
    pipeline: TrainingPipeline<S, L>,
    inference: InferenceService,
}

impl<S, L> SentimentAnalyzer<S, L>
where
    S: ModelStore,
    L: TrainingLog,
{
    pub fn new(config: TrainingConfig, store: S, log: L) -> Self {
        let slot = Arc::new(ModelSlot::new());
        Self {
            pipeline: TrainingPipeline::new(config, store, log, Arc::clone(&slot)),
            inference: InferenceService::new(slot),
        }
    }

    /// Build an analyzer and immediately run [`load_or_train`](Self::load_or_train).
    pub fn open(config: TrainingConfig, store: S, log: L, corpus: &TrainingCorpus) -> Self {
        let analyzer = Self::new(config, store, log);
        analyzer.load_or_train(corpus);
        analyzer
    }

    /// Publish the persisted model if there is one. `Ok(false)` means nothing
    /// was ever saved; `Err` means the artifact exists but is unusable.
    pub fn load(&self) -> Result<bool, SentimentError> {
        let store = self.pipeline.store();
        match store.load()? {
            Some(model) => {
                model.validate().map_err(|e| {
                    SentimentError::Persistence(format!("inconsistent model at {}: {e}", store.location()))
                })?;
                info!(
                    model_version = %model.version(),
                    location = %store.location(),
                    "loaded sentiment model"
                );
                self.inference.slot().publish(model);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Load the persisted model; if it is missing or corrupt, train on `corpus`.
    ///
    /// Ends `Active` on success, `Unavailable` when both fail. Never panics and
    /// never replaces an already active model with nothing.
    pub fn load_or_train(&self, corpus: &TrainingCorpus) -> ModelState {
        let slot = self.inference.slot();
        slot.begin_loading();

        let location = self.pipeline.store().location();
        match self.load() {
            Ok(true) => return slot.state(),
            Ok(false) => info!(%location, "no sentiment model artifact, training from corpus"),
            Err(err) => warn!(error = %err, %location, "sentiment model artifact unreadable, retraining"),
        }

        if let Err(err) = self.pipeline.train(corpus, true) {
            warn!(error = %err, "implicit training failed, sentiment analysis will fall back");
            slot.mark_unavailable();
        }
        slot.state()
    }

    pub fn train(&self, corpus: &TrainingCorpus, force: bool) -> Result<TrainingRun, SentimentError> {
        self.pipeline.train(corpus, force)
    }

    pub fn analyze<'a>(&self, text: impl Into<Option<&'a str>>) -> AnalysisResult {
        self.inference.analyze(text)
    }

    pub fn try_analyze<'a>(&self, text: impl Into<Option<&'a str>>) -> Result<AnalysisResult, SentimentError> {
        self.inference.try_analyze(text)
    }

    pub fn batch_analyze<'a, I, T>(&self, texts: I) -> Vec<AnalysisResult>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'a str>>,
    {
        self.inference.batch_analyze(texts)
    }

    /// A handle sharing this analyzer's active model, for subscribers and workers.
    pub fn inference(&self) -> InferenceService {
        self.inference.clone()
    }

    pub fn state(&self) -> ModelState {
        self.inference.slot().state()
    }

    pub fn store(&self) -> &S {
        self.pipeline.store()
    }

    pub fn log(&self) -> &L {
        self.pipeline.log()
    }

    pub fn config(&self) -> &TrainingConfig {
        self.pipeline.config()
    }

    pub fn model_info(&self) -> ModelInfo {
        let model = self.inference.slot().current();
        let store = self.pipeline.store();
        ModelInfo {
            status: if model.is_some() {
                ModelStatus::Trained
            } else {
                ModelStatus::NotTrained
            },
            state: self.state(),
            algorithm: ALGORITHM.to_string(),
            feature_count: model.as_ref().map(|m| m.feature_count()),
            artifact_location: store.location(),
            artifact_exists: store.exists(),
            model_version: model.as_ref().map(|m| m.version()),
            trained_at: model.as_ref().map(|m| m.trained_at()),
        }
    }
}
