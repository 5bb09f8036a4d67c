//! API Routes

pub mod assignments;
pub mod callers;
pub mod health;
pub mod leads;
