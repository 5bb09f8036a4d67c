//! Aggregates module

pub mod lead;
pub mod sales_caller;
pub mod assignment;

pub use lead::{Lead, LeadStatus};
pub use sales_caller::{CallerError, SalesCaller};
pub use assignment::AssignmentRecord;
