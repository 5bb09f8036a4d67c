//! Domain module
//!
//! Aggregates, value objects, events and the assignment domain services.

pub mod aggregates;
pub mod value_objects;
pub mod events;
pub mod services;

pub use aggregates::*;
pub use value_objects::*;
pub use events::*;
