//! Review lifecycle events consumed by the sentiment subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use revsense_core::ReviewId;

use crate::Event;

/// Review write-path notifications.
///
/// Created and updated reviews are the same event: the subscriber upserts one
/// analysis per review regardless of which happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewEvent {
    Saved {
        review_id: ReviewId,
        text: Option<String>,
        created: bool,
        occurred_at: DateTime<Utc>,
    },
}

impl ReviewEvent {
    pub fn saved(review_id: ReviewId, text: impl Into<String>, created: bool) -> Self {
        Self::Saved {
            review_id,
            text: Some(text.into()),
            created,
            occurred_at: Utc::now(),
        }
    }

    pub fn review_id(&self) -> ReviewId {
        match self {
            ReviewEvent::Saved { review_id, .. } => *review_id,
        }
    }

    /// Review body. `None` when the storefront saved a review without a comment.
    pub fn text(&self) -> Option<&str> {
        match self {
            ReviewEvent::Saved { text, .. } => text.as_deref(),
        }
    }
}

impl Event for ReviewEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReviewEvent::Saved { .. } => "review.saved",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ReviewEvent::Saved { occurred_at, .. } => *occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventEnvelope;

    #[test]
    fn saved_event_exposes_review_fields() {
        let id = ReviewId::new();
        let ev = ReviewEvent::saved(id, "works great", true);
        assert_eq!(ev.review_id(), id);
        assert_eq!(ev.text(), Some("works great"));
        assert_eq!(ev.event_type(), "review.saved");
        assert_eq!(ev.version(), 1);
    }

    #[test]
    fn envelope_serializes_tagged_payload() {
        let ev = ReviewEvent::saved(ReviewId::new(), "fine", false);
        let env = EventEnvelope::wrap("storefront.reviews", 7, ev.clone());
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["payload"]["type"], "saved");
        assert_eq!(json["sequence_number"], 7);

        let back: EventEnvelope<ReviewEvent> = serde_json::from_value(json).unwrap();
        assert_eq!(back.payload(), &ev);
        assert_eq!(back.event_type(), "review.saved");
    }
}
