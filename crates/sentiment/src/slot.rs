//! The single active model reference shared by inference and training.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::model::SentimentModel;

/// Lifecycle of the active model.
///
/// `Unloaded -> Loading -> Active | Unavailable`; `Active` only ever moves to
/// `Active` again (on a successful retrain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    Unloaded,
    Loading,
    Active,
    Unavailable,
}

#[derive(Debug)]
struct SlotInner {
    state: ModelState,
    model: Option<Arc<SentimentModel>>,
}

/// Swap point between training and inference.
///
/// Readers clone the `Arc` and release the lock immediately, so in-flight
/// inference keeps using the model it started with while a retrain publishes.
#[derive(Debug)]
pub struct ModelSlot {
    inner: RwLock<SlotInner>,
}

impl Default for ModelSlot {
    fn default() -> Self {
        Self {
            inner: RwLock::new(SlotInner {
                state: ModelState::Unloaded,
                model: None,
            }),
        }
    }
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot with an already-published model.
    pub fn with_model(model: SentimentModel) -> Self {
        Self {
            inner: RwLock::new(SlotInner {
                state: ModelState::Active,
                model: Some(Arc::new(model)),
            }),
        }
    }

    /// The active model; `None` when nothing is published or the lock is poisoned.
    pub fn current(&self) -> Option<Arc<SentimentModel>> {
        self.inner.read().ok().and_then(|inner| inner.model.clone())
    }

    pub fn state(&self) -> ModelState {
        self.inner
            .read()
            .map(|inner| inner.state)
            .unwrap_or(ModelState::Unavailable)
    }

    /// Atomically replace the active model.
    pub fn publish(&self, model: SentimentModel) {
        let model = Arc::new(model);
        match self.inner.write() {
            Ok(mut inner) => {
                inner.model = Some(model);
                inner.state = ModelState::Active;
            }
            Err(poisoned) => {
                let mut inner = poisoned.into_inner();
                inner.model = Some(model);
                inner.state = ModelState::Active;
            }
        }
    }

    /// Enter `Loading` unless a model is already active.
    pub fn begin_loading(&self) {
        if let Ok(mut inner) = self.inner.write() {
            if inner.state != ModelState::Active {
                inner.state = ModelState::Loading;
            }
        }
    }

    /// Mark the slot unusable. A published model is never discarded.
    pub fn mark_unavailable(&self) {
        if let Ok(mut inner) = self.inner.write() {
            if inner.model.is_none() {
                inner.state = ModelState::Unavailable;
            }
        }
    }
}
