//! Environment-driven configuration.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use revsense_observability::LogFormat;
use revsense_sentiment::TrainingConfig;

pub const DATA_DIR: &str = "REVSENSE_DATA_DIR";
pub const MODEL_PATH: &str = "REVSENSE_MODEL_PATH";
pub const TRAINING_LOG: &str = "REVSENSE_TRAINING_LOG";
pub const RESULTS_PATH: &str = "REVSENSE_RESULTS_PATH";
pub const SEED: &str = "REVSENSE_SEED";
pub const LOG_FORMAT: &str = "REVSENSE_LOG_FORMAT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevsenseConfig {
    pub data_dir: PathBuf,
    pub model_path: PathBuf,
    pub training_log_path: PathBuf,
    pub results_path: PathBuf,
    pub training: TrainingConfig,
    pub log_format: LogFormat,
}

impl Default for RevsenseConfig {
    fn default() -> Self {
        Self::with_data_dir(PathBuf::from("./data"))
    }
}

impl RevsenseConfig {
    /// Defaults with every file under `data_dir`.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            model_path: data_dir.join("sentiment_model.json"),
            training_log_path: data_dir.join("training_log.jsonl"),
            results_path: data_dir.join("review_sentiment.json"),
            data_dir,
            training: TrainingConfig::default(),
            log_format: LogFormat::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = match get(DATA_DIR) {
            Some(dir) => Self::with_data_dir(PathBuf::from(dir)),
            None => Self::default(),
        };
        if let Some(path) = get(MODEL_PATH) {
            config.model_path = PathBuf::from(path);
        }
        if let Some(path) = get(TRAINING_LOG) {
            config.training_log_path = PathBuf::from(path);
        }
        if let Some(path) = get(RESULTS_PATH) {
            config.results_path = PathBuf::from(path);
        }
        if let Some(value) = get(SEED) {
            let seed = value.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: SEED,
                value: value.clone(),
                reason: e.to_string(),
            })?;
            config.training.seed = seed;
        }
        if let Some(value) = get(LOG_FORMAT) {
            config.log_format = value.parse().map_err(|e: revsense_observability::UnknownLogFormat| {
                ConfigError::Invalid {
                    key: LOG_FORMAT,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(config)
    }
}
