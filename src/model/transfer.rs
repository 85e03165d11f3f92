use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TransferStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

/// One faculty member handing a single lecture on a given date to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LectureTransfer {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = 12)]
    pub from_faculty_id: u64,
    #[schema(example = 31)]
    pub to_faculty_id: u64,
    #[schema(example = 41)]
    pub timetable_slot_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Exam duty", nullable = true)]
    pub reason: Option<String>,
    pub status: TransferStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub requested_at: Option<DateTime<Utc>>,
    #[schema(example = "2026-01-02T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub from_faculty_id: u64,
    pub to_faculty_id: u64,
    pub timetable_slot_id: u64,
    pub date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TransferQuery {
    pub from_faculty_id: Option<u64>,
    pub to_faculty_id: Option<u64>,
    pub status: Option<TransferStatus>,
    pub date: Option<NaiveDate>,
}
