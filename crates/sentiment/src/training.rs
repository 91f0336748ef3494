//! Training pipeline: normalize, split, fit, evaluate, persist, publish.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use revsense_core::ModelVersion;

use crate::classifier::ClassifierConfig;
use crate::corpus::TrainingCorpus;
use crate::features::VectorizerConfig;
use crate::label::SentimentLabel;
use crate::log::TrainingLog;
use crate::metrics::{ClassificationReport, TrainingMetrics};
use crate::model::SentimentModel;
use crate::normalize::normalize;
use crate::result::SentimentError;
use crate::run::{RunStarted, TrainingRun};
use crate::slot::ModelSlot;
use crate::split::{stratified_folds, stratified_split};
use crate::store::ModelStore;

/// Minimum usable examples before a fit is attempted.
pub const MIN_TRAINING_EXAMPLES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Seed for the stratified train/test shuffle.
    pub seed: u64,
    pub test_fraction: f64,
    pub cv_folds: usize,
    pub min_examples: usize,
    pub vectorizer: VectorizerConfig,
    pub classifier: ClassifierConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            cv_folds: 5,
            min_examples: MIN_TRAINING_EXAMPLES,
            vectorizer: VectorizerConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<(), SentimentError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(SentimentError::InvalidInput(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.cv_folds < 2 {
            return Err(SentimentError::InvalidInput(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        Ok(())
    }
}

fn pick<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|i| items[*i].clone()).collect()
}

fn accuracy_of(model: &SentimentModel, texts: &[String], truth: &[SentimentLabel]) -> f64 {
    let predicted: Vec<SentimentLabel> = texts.iter().map(|t| model.predict(t)).collect();
    ClassificationReport::compute(truth, &predicted).accuracy
}

/// Fit a model on `corpus` without persisting or publishing it.
///
/// Deterministic: the same corpus and config always yield the same parameters
/// and metrics (only the version and timestamp differ).
pub fn fit_model(config: &TrainingConfig, corpus: &TrainingCorpus) -> Result<SentimentModel, SentimentError> {
    config.validate()?;

    let (texts, labels): (Vec<String>, Vec<SentimentLabel>) = corpus
        .iter()
        .map(|e| (normalize(&e.text), e.label))
        .filter(|(t, _)| !t.is_empty())
        .unzip();

    if texts.len() < config.min_examples {
        return Err(SentimentError::InsufficientData {
            found: texts.len(),
            required: config.min_examples,
        });
    }

    let split = stratified_split(&labels, config.test_fraction, config.seed);
    if split.test.is_empty() {
        return Err(SentimentError::InsufficientData {
            found: texts.len(),
            required: config.min_examples,
        });
    }

    let train_texts = pick(&texts, &split.train);
    let train_labels = pick(&labels, &split.train);
    let test_texts = pick(&texts, &split.test);
    let test_labels = pick(&labels, &split.test);

    let model = SentimentModel::fit(config, &train_texts, &train_labels)?;
    let predicted: Vec<SentimentLabel> = test_texts.iter().map(|t| model.predict(t)).collect();
    let report = ClassificationReport::compute(&test_labels, &predicted);

    let mut cv_scores = Vec::with_capacity(config.cv_folds);
    for fold in stratified_folds(&labels, config.cv_folds) {
        let fold_model = SentimentModel::fit(config, &pick(&texts, &fold.train), &pick(&labels, &fold.train))?;
        cv_scores.push(accuracy_of(&fold_model, &pick(&texts, &fold.test), &pick(&labels, &fold.test)));
    }

    let metrics = TrainingMetrics::new(report, &cv_scores, split.train.len(), split.test.len());
    info!(
        samples = texts.len(),
        features = model.feature_count(),
        accuracy = metrics.accuracy,
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        cv_mean = metrics.cv_mean,
        cv_std = metrics.cv_std,
        "sentiment model fitted"
    );
    for class in &metrics.per_class {
        info!(
            label = %class.label,
            precision = class.precision,
            recall = class.recall,
            f1 = class.f1,
            support = class.support,
            "held-out class report"
        );
    }

    Ok(model.with_metrics(metrics, texts.len()))
}

struct Published {
    sample_count: usize,
    metrics: TrainingMetrics,
    version: ModelVersion,
}

/// Orchestrates training runs against a store, a log and the active model slot.
///
/// At most one run executes at a time. The slot is only swapped after the
/// store has accepted the new artifact.
pub struct TrainingPipeline<S, L> {
    config: TrainingConfig,
    store: S,
    log: L,
    slot: Arc<ModelSlot>,
    guard: Mutex<()>,
}

impl<S, L> TrainingPipeline<S, L>
where
    S: ModelStore,
    L: TrainingLog,
{
    pub fn new(config: TrainingConfig, store: S, log: L, slot: Arc<ModelSlot>) -> Self {
        Self {
            config,
            store,
            log,
            slot,
            guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn slot(&self) -> &Arc<ModelSlot> {
        &self.slot
    }

    /// Train on `corpus` and publish the result.
    ///
    /// Without `force`, an already active model is kept and an
    /// `already_trained` run is returned. Every outcome is recorded in the log
    /// before this returns; failures are also returned as `Err`.
    pub fn train(&self, corpus: &TrainingCorpus, force: bool) -> Result<TrainingRun, SentimentError> {
        let _serialized = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let started = RunStarted::begin();

        if !force {
            if let Some(active) = self.slot.current() {
                let run = started.already_trained(active.metrics().cloned(), active.version());
                info!(model_version = %active.version(), "model already trained, skipping fit");
                self.record(&run);
                return Ok(run);
            }
        }

        match self.fit_and_publish(corpus) {
            Ok(published) => {
                let run = started.completed(published.sample_count, published.metrics, published.version);
                info!(
                    run_id = %run.id,
                    model_version = %published.version,
                    location = %self.store.location(),
                    "sentiment model published"
                );
                self.record(&run);
                Ok(run)
            }
            Err(err) => {
                let run = started.failed(format!("training failed: {err}"));
                warn!(run_id = %run.id, error = %err, "training run failed");
                self.record(&run);
                Err(err)
            }
        }
    }

    fn fit_and_publish(&self, corpus: &TrainingCorpus) -> Result<Published, SentimentError> {
        let model = fit_model(&self.config, corpus)?;
        let metrics = model
            .metrics()
            .cloned()
            .ok_or_else(|| SentimentError::Inference("fitted model has no metrics".to_string()))?;
        self.store.save(&model)?;

        let published = Published {
            sample_count: model.sample_count(),
            metrics,
            version: model.version(),
        };
        self.slot.publish(model);
        Ok(published)
    }

    fn record(&self, run: &TrainingRun) {
        if let Err(err) = self.log.record(run) {
            warn!(run_id = %run.id, error = %err, "failed to record training run");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::InMemoryTrainingLog;
    use crate::run::RunStatus;
    use crate::store::InMemoryModelStore;
    use SentimentLabel::*;

    fn tiny_corpus(copies: usize) -> TrainingCorpus {
        let base = [
            ("I love this, excellent!", Positive),
            ("Terrible, broke immediately", Negative),
            ("It's fine, average", Neutral),
        ];
        TrainingCorpus::from_pairs((0..copies).flat_map(|_| base))
    }

    fn pipeline() -> TrainingPipeline<InMemoryModelStore, InMemoryTrainingLog> {
        TrainingPipeline::new(
            TrainingConfig::default(),
            InMemoryModelStore::new(),
            InMemoryTrainingLog::new(),
            Arc::new(ModelSlot::new()),
        )
    }

    #[test]
    fn empty_texts_do_not_count_toward_the_minimum() {
        let mut corpus = tiny_corpus(3);
        corpus = corpus.with_examples((0..5).map(|_| crate::corpus::LabeledExample::new("   ", Neutral)));
        let err = fit_model(&TrainingConfig::default(), &corpus).unwrap_err();
        assert_eq!(err, SentimentError::InsufficientData { found: 9, required: 10 });
    }

    #[test]
    fn fit_records_split_sizes() {
        let model = fit_model(&TrainingConfig::default(), &tiny_corpus(5)).unwrap();
        let metrics = model.metrics().unwrap();
        assert_eq!(metrics.train_size, 12);
        assert_eq!(metrics.test_size, 3);
        assert_eq!(model.sample_count(), 15);
        assert_eq!(metrics.accuracy, 1.0);
    }

    #[test]
    fn single_fold_cross_validation_is_rejected() {
        let config = TrainingConfig {
            cv_folds: 1,
            ..TrainingConfig::default()
        };
        assert!(matches!(
            fit_model(&config, &tiny_corpus(5)),
            Err(SentimentError::InvalidInput(_))
        ));
    }

    #[test]
    fn failed_runs_are_logged_before_the_error_returns() {
        let pipeline = pipeline();
        let err = pipeline.train(&tiny_corpus(1), true).unwrap_err();
        assert!(matches!(err, SentimentError::InsufficientData { found: 3, .. }));

        let logged = pipeline.log().latest().unwrap().unwrap();
        assert_eq!(logged.status, RunStatus::Failed);
        assert!(logged.notes.contains("insufficient"));
        assert!(pipeline.slot().current().is_none());
    }

    #[test]
    fn successful_run_saves_then_publishes() {
        let pipeline = pipeline();
        let run = pipeline.train(&tiny_corpus(5), false).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.sample_count, 15);

        let active = pipeline.slot().current().unwrap();
        assert_eq!(Some(active.version()), run.model_version);
        assert_eq!(pipeline.store().load().unwrap().unwrap().version(), active.version());
    }
}
