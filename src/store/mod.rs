//! Access to the institution's relational store.
//!
//! Handlers receive a `web::Data<dyn Store>` per request; nothing reaches a
//! global client. `MySqlStore` is the production implementation.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use derive_more::Display;

use crate::model::{
    attendance::{AttendanceRecord, AttendanceSession},
    faculty::FacultyMember,
    faculty_leave::{FacultyLeave, LeaveQuery, LeaveStatus, NewLeave},
    student::Student,
    substitution::{AssignmentStatus, NewSubstitution, SubstitutionAssignment, SubstitutionQuery},
    syllabus::SyllabusTopic,
    timetable::{DayOfWeek, SlotDetail},
    transfer::{LectureTransfer, NewTransfer, TransferQuery, TransferStatus},
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Display)]
pub enum StoreError {
    /// Connection, pool or transport failure. Nothing further can be done in
    /// this request.
    #[display(fmt = "store unavailable: {}", _0)]
    Unavailable(String),
    /// A single statement failed (constraint, syntax, ...).
    #[display(fmt = "query failed: {}", _0)]
    Query(String),
    /// A row came back that does not map onto a domain entity.
    #[display(fmt = "decode failed: {}", _0)]
    Decode(String),
}

impl StoreError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => StoreError::Unavailable(e.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
                StoreError::Decode(e.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    // ---------- timetable / faculty (read-only) ----------

    /// Slots taught by `faculty_id` on `day` whose validity contains `date`,
    /// ordered by start time.
    async fn faculty_slots_on(
        &self,
        faculty_id: u64,
        day: DayOfWeek,
        date: NaiveDate,
    ) -> StoreResult<Vec<SlotDetail>>;

    /// Faculty ids holding any slot at `day`/`start_time` valid on `date`.
    async fn busy_faculty(
        &self,
        day: DayOfWeek,
        start_time: NaiveTime,
        date: NaiveDate,
    ) -> StoreResult<HashSet<u64>>;

    /// All active faculty except `faculty_id`, in store order.
    async fn active_faculty_except(&self, faculty_id: u64) -> StoreResult<Vec<FacultyMember>>;

    async fn faculty_department(&self, faculty_id: u64) -> StoreResult<Option<String>>;

    async fn faculty_name(&self, faculty_id: u64) -> StoreResult<Option<String>>;

    /// One slot with its class and subject labels.
    async fn timetable_slot(&self, slot_id: u64) -> StoreResult<Option<SlotDetail>>;

    /// Faculty ids allocated to teach `subject_id`.
    async fn subject_allocations(&self, subject_id: u64) -> StoreResult<HashSet<u64>>;

    async fn faculty_on_leave(&self, date: NaiveDate) -> StoreResult<HashSet<u64>>;

    /// Faculty already covering a non-cancelled substitution at `date`/`start_time`.
    async fn substituting_at(&self, date: NaiveDate, start_time: NaiveTime) -> StoreResult<HashSet<u64>>;

    // ---------- substitutions / activity (write) ----------

    async fn insert_substitution(&self, row: NewSubstitution) -> StoreResult<u64>;

    async fn list_substitutions(&self, query: &SubstitutionQuery) -> StoreResult<Vec<SubstitutionAssignment>>;

    /// Returns false when no row has that id.
    async fn set_substitution_status(&self, id: u64, status: AssignmentStatus) -> StoreResult<bool>;

    async fn insert_activity(&self, message: &str) -> StoreResult<u64>;

    // ---------- leaves ----------

    async fn insert_leave(&self, leave: NewLeave) -> StoreResult<u64>;

    async fn get_leave(&self, id: u64) -> StoreResult<Option<FacultyLeave>>;

    async fn list_leaves(&self, query: &LeaveQuery) -> StoreResult<Vec<FacultyLeave>>;

    /// Moves a pending leave to `status`. Returns false if the leave does not
    /// exist or was already decided.
    async fn decide_leave(&self, id: u64, status: LeaveStatus) -> StoreResult<bool>;

    // ---------- lecture transfers ----------

    async fn insert_transfer(&self, transfer: NewTransfer) -> StoreResult<u64>;

    async fn get_transfer(&self, id: u64) -> StoreResult<Option<LectureTransfer>>;

    /// Newest request first.
    async fn list_transfers(&self, query: &TransferQuery) -> StoreResult<Vec<LectureTransfer>>;

    /// Moves a pending transfer to `status`, stamping `responded_at` for an
    /// accept or reject. Returns false if it does not exist or is no longer
    /// pending.
    async fn settle_transfer(&self, id: u64, status: TransferStatus) -> StoreResult<bool>;

    // ---------- attendance (read-only) ----------

    /// Active students of a class ordered by roll number, or of the whole
    /// institution when `class_id` is `None`.
    async fn active_students(&self, class_id: Option<u64>) -> StoreResult<Vec<Student>>;

    async fn sessions_between(
        &self,
        class_id: Option<u64>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceSession>>;

    async fn records_for_sessions(&self, session_ids: &[u64]) -> StoreResult<Vec<AttendanceRecord>>;

    /// Every record of the given students, regardless of date.
    async fn records_for_students(&self, student_ids: &[u64]) -> StoreResult<Vec<AttendanceRecord>>;

    /// Records of one student whose session date lies in the optional range.
    async fn student_records(
        &self,
        student_id: u64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> StoreResult<Vec<AttendanceRecord>>;

    /// Display labels ("name division") for the given classes.
    async fn class_labels(&self, class_ids: &[u64]) -> StoreResult<HashMap<u64, String>>;

    // ---------- syllabus ----------

    async fn syllabus_topics(&self, subject_id: u64) -> StoreResult<Vec<SyllabusTopic>>;

    /// Ids of topics of `subject_id` with at least one coverage row.
    async fn covered_topics(&self, subject_id: u64) -> StoreResult<HashSet<u64>>;
}
