use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::aggregator::{aggregate, defaulters, Defaulter, ZeroSessionPolicy};
use crate::store::{Store, StoreResult};

pub const NO_STUDENTS: &str = "No active students found in this class";
pub const NO_SESSIONS: &str = "No attendance sessions found in the given date range";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DefaulterReport {
    #[schema(example = 12)]
    pub class_id: u64,
    #[schema(value_type = String, example = "2024-01-01")]
    pub from: NaiveDate,
    #[schema(value_type = String, example = "2024-01-31")]
    pub to: NaiveDate,
    #[schema(example = 75)]
    pub threshold: u8,
    pub total_students: usize,
    pub total_sessions: usize,
    pub defaulters: Vec<Defaulter>,
    /// Set when the report is empty because nothing was in scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DefaulterReport {
    fn empty(class_id: u64, from: NaiveDate, to: NaiveDate, threshold: u8, total_students: usize, message: &str) -> Self {
        Self {
            class_id,
            from,
            to,
            threshold,
            total_students,
            total_sessions: 0,
            defaulters: Vec::new(),
            message: Some(message.to_string()),
        }
    }
}

/// Active students of `class_id` whose attendance over sessions held between
/// `from` and `to` (inclusive) is below `threshold`.
pub async fn defaulter_report(
    store: &dyn Store,
    class_id: u64,
    from: NaiveDate,
    to: NaiveDate,
    threshold: u8,
    policy: ZeroSessionPolicy,
) -> StoreResult<DefaulterReport> {
    info!(class_id, %from, %to, threshold, %policy, "Generating defaulter report");

    let students = store.active_students(Some(class_id)).await?;
    if students.is_empty() {
        return Ok(DefaulterReport::empty(class_id, from, to, threshold, 0, NO_STUDENTS));
    }

    let sessions = store.sessions_between(Some(class_id), from, to).await?;
    if sessions.is_empty() {
        return Ok(DefaulterReport::empty(class_id, from, to, threshold, students.len(), NO_SESSIONS));
    }

    let session_ids: Vec<u64> = sessions.iter().map(|s| s.id).collect();
    let records = store.records_for_sessions(&session_ids).await?;

    let rows = aggregate(&students, &records);
    let defaulters = defaulters(&rows, threshold, policy);

    info!(
        class_id,
        defaulters = defaulters.len(),
        students = students.len(),
        "Defaulter report ready"
    );

    Ok(DefaulterReport {
        class_id,
        from,
        to,
        threshold,
        total_students: students.len(),
        total_sessions: sessions.len(),
        defaulters,
        message: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    use crate::model::attendance::{AttendanceRecord, AttendanceSession, AttendanceStatus};
    use crate::model::student::{Student, StudentStatus};
    use crate::store::memory::{MemoryData, MemoryStore};
    use crate::store::StoreError;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn student(id: u64, class_id: u64, roll: u32, status: StudentStatus) -> Student {
        Student {
            id,
            class_id,
            roll_no: Some(roll),
            name: format!("S{}", id),
            enrollment_no: Some(format!("EN{}", id)),
            status,
        }
    }

    fn session(id: u64, class_id: u64, date: NaiveDate) -> AttendanceSession {
        AttendanceSession {
            id,
            class_id,
            subject_id: 1,
            faculty_id: 1,
            date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            is_substitution: false,
        }
    }

    fn record(id: u64, session_id: u64, student_id: u64, present: bool) -> AttendanceRecord {
        AttendanceRecord {
            id,
            session_id,
            student_id,
            status: if present {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Absent
            },
        }
    }

    /// Class 1: S1 attends 4/4, S2 attends 1/4, S3 has no records, S4 is YD.
    /// Session 5 is outside the range; session 6 belongs to another class.
    fn fixture() -> MemoryData {
        let mut records = Vec::new();
        let mut id = 0;
        for session_id in 1..=4 {
            id += 1;
            records.push(record(id, session_id, 1, true));
            id += 1;
            records.push(record(id, session_id, 2, session_id == 1));
            id += 1;
            records.push(record(id, session_id, 4, false));
        }
        records.push(record(100, 5, 2, true));
        records.push(record(101, 6, 1, false));

        MemoryData {
            students: vec![
                student(1, 1, 1, StudentStatus::Active),
                student(2, 1, 2, StudentStatus::Active),
                student(3, 1, 3, StudentStatus::Active),
                student(4, 1, 4, StudentStatus::Yd),
                student(5, 2, 1, StudentStatus::Active),
            ],
            sessions: vec![
                session(1, 1, d(2)),
                session(2, 1, d(3)),
                session(3, 1, d(4)),
                session(4, 1, d(5)),
                session(5, 1, d(20)),
                session(6, 2, d(3)),
            ],
            records,
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn report_lists_defaulters_in_range() {
        let store = MemoryStore::new(fixture());
        let report = defaulter_report(&store, 1, d(1), d(10), 75, ZeroSessionPolicy::Flag)
            .await
            .unwrap();

        assert_eq!(report.total_students, 3);
        assert_eq!(report.total_sessions, 4);
        assert!(report.message.is_none());

        let ids: Vec<u64> = report.defaulters.iter().map(|d| d.student_id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(report.defaulters[1].present, 1);
        assert_eq!(report.defaulters[1].total, 4);
        assert_eq!(report.defaulters[1].percentage, 25);
        assert_eq!(report.defaulters[1].enrollment_no.as_deref(), Some("EN2"));
    }

    #[actix_web::test]
    async fn excluded_zero_session_students_are_not_listed() {
        let store = MemoryStore::new(fixture());
        let report = defaulter_report(&store, 1, d(1), d(10), 75, ZeroSessionPolicy::Exclude)
            .await
            .unwrap();
        let ids: Vec<u64> = report.defaulters.iter().map(|d| d.student_id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[actix_web::test]
    async fn empty_class_yields_message() {
        let store = MemoryStore::new(fixture());
        let report = defaulter_report(&store, 9, d(1), d(10), 75, ZeroSessionPolicy::Flag)
            .await
            .unwrap();
        assert_eq!(report.message.as_deref(), Some(NO_STUDENTS));
        assert_eq!(report.total_students, 0);
        assert!(report.defaulters.is_empty());
    }

    #[actix_web::test]
    async fn no_sessions_in_range_yields_message() {
        let store = MemoryStore::new(fixture());
        let report = defaulter_report(&store, 1, d(21), d(31), 75, ZeroSessionPolicy::Flag)
            .await
            .unwrap();
        assert_eq!(report.message.as_deref(), Some(NO_SESSIONS));
        assert_eq!(report.total_students, 3);
        assert_eq!(report.total_sessions, 0);
        assert!(report.defaulters.is_empty());
    }

    #[actix_web::test]
    async fn unreachable_store_is_an_error() {
        let store = MemoryStore::new(MemoryData {
            unreachable: true,
            ..fixture()
        });
        let err = defaulter_report(&store, 1, d(1), d(10), 75, ZeroSessionPolicy::Flag)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
