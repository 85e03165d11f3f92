use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus},
    student::Student,
};

/// Integer percentage of `part` in `whole`, rounded half away from zero.
/// `None` when `whole` is zero.
pub fn rounded_percentage(part: u32, whole: u32) -> Option<u8> {
    if whole == 0 {
        return None;
    }
    let (part, whole) = (part as u64, whole as u64);
    Some(((200 * part + whole) / (2 * whole)) as u8)
}

/// Present/total counter for one student (or one class, or everybody).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub present: u32,
    pub total: u32,
}

impl Tally {
    pub fn record(&mut self, status: AttendanceStatus) {
        self.total += 1;
        if status == AttendanceStatus::Present {
            self.present += 1;
        }
    }

    pub fn absent(&self) -> u32 {
        self.total - self.present
    }

    pub fn percentage(&self) -> Option<u8> {
        rounded_percentage(self.present, self.total)
    }

    pub fn from_records<'r>(records: impl IntoIterator<Item = &'r AttendanceRecord>) -> Self {
        let mut tally = Tally::default();
        for r in records {
            tally.record(r.status);
        }
        tally
    }
}

/// What to do with a student who has no records in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZeroSessionPolicy {
    /// Treat as 0% and list among defaulters.
    Flag,
    /// Leave out of defaulter lists and counts.
    Exclude,
}

impl ZeroSessionPolicy {
    /// Percentage used for threshold comparison, or `None` when the student
    /// should not be judged at all.
    pub fn judged_percentage(self, tally: &Tally) -> Option<u8> {
        match (tally.percentage(), self) {
            (Some(p), _) => Some(p),
            (None, ZeroSessionPolicy::Flag) => Some(0),
            (None, ZeroSessionPolicy::Exclude) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentAttendance {
    pub student: Student,
    pub tally: Tally,
}

/// Per-student tallies for every student in `students`, in the same order.
///
/// Every student is seeded with an empty tally before any record is read so
/// that students without records still come back. Records of students
/// outside the scope are ignored; duplicates are counted as-is.
pub fn aggregate(students: &[Student], records: &[AttendanceRecord]) -> Vec<StudentAttendance> {
    let mut tallies: HashMap<u64, Tally> = students.iter().map(|s| (s.id, Tally::default())).collect();

    for record in records {
        if let Some(tally) = tallies.get_mut(&record.student_id) {
            tally.record(record.status);
        }
    }

    students
        .iter()
        .map(|s| StudentAttendance {
            student: s.clone(),
            tally: tallies.get(&s.id).copied().unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Defaulter {
    #[schema(example = 501)]
    pub student_id: u64,
    #[schema(example = 17, nullable = true)]
    pub roll_no: Option<u32>,
    #[schema(example = "R. Patil")]
    pub name: String,
    #[schema(example = "EN2023017", nullable = true)]
    pub enrollment_no: Option<String>,
    #[schema(example = 12)]
    pub present: u32,
    #[schema(example = 20)]
    pub total: u32,
    #[schema(example = 60)]
    pub percentage: u8,
}

/// Students below `threshold`, lowest percentage first. Ties keep the
/// input (roll number) order.
pub fn defaulters(rows: &[StudentAttendance], threshold: u8, policy: ZeroSessionPolicy) -> Vec<Defaulter> {
    let mut list: Vec<Defaulter> = rows
        .iter()
        .filter_map(|row| {
            let percentage = policy.judged_percentage(&row.tally)?;
            (percentage < threshold).then(|| Defaulter {
                student_id: row.student.id,
                roll_no: row.student.roll_no,
                name: row.student.name.clone(),
                enrollment_no: row.student.enrollment_no.clone(),
                present: row.tally.present,
                total: row.tally.total,
                percentage,
            })
        })
        .collect();
    list.sort_by_key(|d| d.percentage);
    list
}
