//! Substitute-teacher assignment: who is busy, who is preferred, and the
//! batch that ties them together for one leave.

pub mod assigner;
pub mod availability;
pub mod ranker;

pub use assigner::{AssignOutcome, SubstitutionAssigner};
pub use availability::AvailabilityIndex;
