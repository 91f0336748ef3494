//! `revsense-events` — integration events published by the storefront.
//!
//! The sentiment pipeline never hooks into persistence directly. The write path
//! publishes a [`ReviewEvent`] and subscribers decide what to do with it.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;
pub mod review;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use review::ReviewEvent;
