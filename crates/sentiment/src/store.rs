//! Model artifact persistence boundary.

use std::sync::{Arc, RwLock};

use crate::model::SentimentModel;
use crate::result::SentimentError;

/// Persists the trained model unit.
///
/// `save` must be atomic from a reader's point of view. `load` returns
/// `Ok(None)` when nothing was ever saved and `Err(Persistence)` when an
/// artifact exists but cannot be read back.
pub trait ModelStore: Send + Sync {
    fn save(&self, model: &SentimentModel) -> Result<(), SentimentError>;

    fn load(&self) -> Result<Option<SentimentModel>, SentimentError>;

    /// Where the artifact lives, for model info.
    fn location(&self) -> String;

    fn exists(&self) -> bool;
}

impl<T> ModelStore for Arc<T>
where
    T: ModelStore + ?Sized,
{
    fn save(&self, model: &SentimentModel) -> Result<(), SentimentError> {
        (**self).save(model)
    }

    fn load(&self) -> Result<Option<SentimentModel>, SentimentError> {
        (**self).load()
    }

    fn location(&self) -> String {
        (**self).location()
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }
}

/// Process-local store, mostly for tests and ephemeral analyzers.
#[derive(Debug, Default)]
pub struct InMemoryModelStore {
    model: RwLock<Option<SentimentModel>>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for InMemoryModelStore {
    fn save(&self, model: &SentimentModel) -> Result<(), SentimentError> {
        let mut slot = self
            .model
            .write()
            .map_err(|_| SentimentError::Persistence("model store lock poisoned".to_string()))?;
        *slot = Some(model.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<SentimentModel>, SentimentError> {
        let slot = self
            .model
            .read()
            .map_err(|_| SentimentError::Persistence("model store lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn exists(&self) -> bool {
        self.model.read().map(|m| m.is_some()).unwrap_or(false)
    }
}
