use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::aggregator::Tally;
use crate::store::{Store, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StudentAttendanceStats {
    pub student_id: u64,
    pub present: u32,
    pub absent: u32,
    pub total: u32,
    pub percentage: u8,
}

/// One student's attendance, optionally bounded by session date.
pub async fn student_stats(
    store: &dyn Store,
    student_id: u64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> StoreResult<StudentAttendanceStats> {
    let records = store.student_records(student_id, from, to).await?;
    let tally = Tally::from_records(&records);

    Ok(StudentAttendanceStats {
        student_id,
        present: tally.present,
        absent: tally.absent(),
        total: tally.total,
        percentage: tally.percentage().unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    use crate::model::attendance::{AttendanceRecord, AttendanceSession, AttendanceStatus};
    use crate::store::memory::{MemoryData, MemoryStore};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[actix_web::test]
    async fn stats_within_range() {
        let sessions = (1..=4)
            .map(|i| AttendanceSession {
                id: i,
                class_id: 1,
                subject_id: 1,
                faculty_id: 1,
                date: d(i as u32 * 5),
                start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                is_substitution: false,
            })
            .collect();
        let records = vec![
            (1, AttendanceStatus::Present),
            (2, AttendanceStatus::Absent),
            (3, AttendanceStatus::Present),
            (4, AttendanceStatus::Present),
        ]
        .into_iter()
        .map(|(session_id, status)| AttendanceRecord {
            id: session_id,
            session_id,
            student_id: 8,
            status,
        })
        .collect();
        let store = MemoryStore::new(MemoryData {
            sessions,
            records,
            ..Default::default()
        });

        let all = student_stats(&store, 8, None, None).await.unwrap();
        assert_eq!((all.present, all.absent, all.total, all.percentage), (3, 1, 4, 75));

        // sessions on the 10th and 15th only
        let some = student_stats(&store, 8, Some(d(6)), Some(d(15))).await.unwrap();
        assert_eq!((some.present, some.absent, some.total, some.percentage), (1, 1, 2, 50));
    }

    #[actix_web::test]
    async fn no_records_is_zero() {
        let store = MemoryStore::new(MemoryData::default());
        let s = student_stats(&store, 8, None, None).await.unwrap();
        assert_eq!(s.total, 0);
        assert_eq!(s.percentage, 0);
    }
}
