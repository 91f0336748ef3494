//! `revsense-sentiment`
//!
//! **Responsibility:** product-review sentiment classification.
//!
//! - Normalizes review text, extracts TF-IDF features and classifies with
//!   multinomial naive Bayes.
//! - Trains reproducibly (fixed seed, stratified split, k-fold CV) and
//!   publishes the model only after it is persisted.
//! - Inference is total: callers on a write path always get a result, falling
//!   back to a fixed neutral default when no prediction is possible.
//!
//! Persistence and audit are behind the [`ModelStore`] and [`TrainingLog`]
//! traits; file-backed implementations live in `revsense-infra`.

pub mod analyzer;
pub mod classifier;
pub mod corpus;
pub mod features;
pub mod label;
pub mod log;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod result;
pub mod run;
pub mod service;
pub mod slot;
pub mod split;
pub mod stopwords;
pub mod store;
pub mod summary;
pub mod training;

pub use analyzer::{ModelInfo, ModelStatus, SentimentAnalyzer};
pub use classifier::{ClassifierConfig, MultinomialNb};
pub use corpus::{LabeledExample, TrainingCorpus};
pub use features::{SparseVector, TfidfVectorizer, VectorizerConfig};
pub use label::SentimentLabel;
pub use log::{InMemoryTrainingLog, TrainingLog};
pub use metrics::{ClassMetrics, ClassificationReport, TrainingMetrics};
pub use model::{ALGORITHM, SentimentModel};
pub use normalize::{normalize, normalize_opt};
pub use result::{AnalysisResult, ClassProbabilities, SentimentError};
pub use run::{RunStarted, RunStatus, TrainingRun};
pub use service::InferenceService;
pub use slot::{ModelSlot, ModelState};
pub use stopwords::StopWords;
pub use store::{InMemoryModelStore, ModelStore};
pub use summary::SentimentSummary;
pub use training::{MIN_TRAINING_EXAMPLES, TrainingConfig, TrainingPipeline, fit_model};
