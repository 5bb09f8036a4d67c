//! Domain services module
//!
//! The lead assignment engine and the state it runs against: rotation
//! cursors and daily usage accounting.

pub mod rotation;
pub mod usage;
pub mod engine;

pub use rotation::{RotationCursors, RotationKey};
pub use usage::{start_of_utc_day, DailyUsage};
pub use engine::{pick_round_robin, AssignmentEngine, Choice, MatchType, SkipReason};
