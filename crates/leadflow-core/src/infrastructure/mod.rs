//! Infrastructure layer
//!
//! Concrete adapters for the outbound ports.

pub mod persistence;
pub mod events;
pub mod import;

pub use persistence::InMemoryStore;
pub use events::{NoOpEventPublisher, TracingEventPublisher};
pub use import::RawLead;
