use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Event;

/// Transport envelope for an event.
///
/// `sequence_number` is assigned by the publisher and is monotonically
/// increasing per publisher; subscribers may use it to drop stale redeliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    source: String,
    sequence_number: u64,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(event_id: Uuid, source: impl Into<String>, sequence_number: u64, payload: E) -> Self {
        Self {
            event_id,
            source: source.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Publishing component (e.g. "storefront.reviews").
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap an event with a fresh UUIDv7 id.
    pub fn wrap(source: impl Into<String>, sequence_number: u64, payload: E) -> Self {
        Self::new(Uuid::now_v7(), source, sequence_number, payload)
    }

    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }
}
