//! Practitioner harvest
//!
//! Walks every organization page of a postal-code search and turns each
//! qualified practitioner role into a [`crate::domain::PractitionerRecord`].

pub mod coordinator;
pub mod summary;

pub use coordinator::HarvestCoordinator;
pub use summary::{HarvestReport, HarvestSummary, SkipReason};
