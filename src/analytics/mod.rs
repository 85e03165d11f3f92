//! Attendance aggregation and the reports built on it.

pub mod aggregator;
pub mod promotion;
pub mod report;
pub mod student;
pub mod summary;
pub mod syllabus;

pub use aggregator::ZeroSessionPolicy;
