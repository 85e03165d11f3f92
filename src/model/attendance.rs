use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One taken lecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSession {
    pub id: u64,
    pub class_id: u64,
    pub subject_id: u64,
    pub faculty_id: u64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub is_substitution: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: u64,
    pub session_id: u64,
    pub student_id: u64,
    pub status: AttendanceStatus,
}
