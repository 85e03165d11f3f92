//! In-memory store used by unit and handler tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};

use super::{Store, StoreError, StoreResult};
use crate::model::{
    attendance::{AttendanceRecord, AttendanceSession},
    faculty::FacultyMember,
    faculty_leave::{FacultyLeave, LeaveQuery, LeaveStatus, NewLeave},
    student::{Student, StudentStatus},
    substitution::{AssignmentStatus, NewSubstitution, SubstitutionAssignment, SubstitutionQuery},
    syllabus::SyllabusTopic,
    timetable::{DayOfWeek, SlotDetail, TimetableSlot},
    transfer::{LectureTransfer, NewTransfer, TransferQuery, TransferStatus},
};

#[derive(Default)]
pub struct MemoryData {
    pub slots: Vec<TimetableSlot>,
    pub class_names: HashMap<u64, String>,
    pub subject_names: HashMap<u64, String>,
    /// (member, is_active)
    pub faculty: Vec<(FacultyMember, bool)>,
    /// (faculty_id, subject_id)
    pub allocations: Vec<(u64, u64)>,
    pub leaves: Vec<FacultyLeave>,
    pub substitutions: Vec<SubstitutionAssignment>,
    pub transfers: Vec<LectureTransfer>,
    pub activity: Vec<String>,
    pub students: Vec<Student>,
    pub sessions: Vec<AttendanceSession>,
    pub records: Vec<AttendanceRecord>,
    pub topics: Vec<SyllabusTopic>,
    /// (topic_id, session_id)
    pub coverage: Vec<(u64, u64)>,

    /// Every call fails with `Unavailable`.
    pub unreachable: bool,
    /// Timetable lookups fail with `Unavailable`; everything else works.
    pub timetable_down: bool,
    /// Substitution inserts for these subjects fail with `Query`.
    pub failing_subjects: HashSet<u64>,
    /// Activity-log inserts fail with `Query`.
    pub failing_activity: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn new(data: MemoryData) -> Self {
        Self { data: Mutex::new(data) }
    }

    pub fn data(&self) -> MutexGuard<'_, MemoryData> {
        self.data.lock().unwrap()
    }

    fn read(&self) -> StoreResult<MutexGuard<'_, MemoryData>> {
        let guard = self.data();
        if guard.unreachable {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(guard)
    }
}

impl MemoryData {
    fn detail(&self, slot: &TimetableSlot) -> SlotDetail {
        SlotDetail {
            slot: slot.clone(),
            class_name: self.class_names.get(&slot.class_id).cloned().unwrap_or_default(),
            subject_name: self.subject_names.get(&slot.subject_id).cloned().unwrap_or_default(),
        }
    }

    fn timetable(&self) -> StoreResult<&[TimetableSlot]> {
        if self.timetable_down {
            return Err(StoreError::Unavailable("timetable_slots unreachable".to_string()));
        }
        Ok(&self.slots)
    }
}

fn in_range(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t)
}

#[async_trait]
impl Store for MemoryStore {
    async fn faculty_slots_on(
        &self,
        faculty_id: u64,
        day: DayOfWeek,
        date: NaiveDate,
    ) -> StoreResult<Vec<SlotDetail>> {
        let data = self.read()?;
        let mut slots: Vec<SlotDetail> = data
            .timetable()?
            .iter()
            .filter(|s| s.faculty_id == faculty_id && s.day_of_week == day && s.is_valid_on(date))
            .map(|s| data.detail(s))
            .collect();
        slots.sort_by_key(|d| d.slot.start_time);
        Ok(slots)
    }

    async fn busy_faculty(
        &self,
        day: DayOfWeek,
        start_time: NaiveTime,
        date: NaiveDate,
    ) -> StoreResult<HashSet<u64>> {
        let data = self.read()?;
        Ok(data
            .timetable()?
            .iter()
            .filter(|s| s.occupies(day, start_time, date))
            .map(|s| s.faculty_id)
            .collect())
    }

    async fn active_faculty_except(&self, faculty_id: u64) -> StoreResult<Vec<FacultyMember>> {
        let data = self.read()?;
        Ok(data
            .faculty
            .iter()
            .filter(|(f, active)| *active && f.id != faculty_id)
            .map(|(f, _)| f.clone())
            .collect())
    }

    async fn faculty_department(&self, faculty_id: u64) -> StoreResult<Option<String>> {
        let data = self.read()?;
        Ok(data
            .faculty
            .iter()
            .find(|(f, _)| f.id == faculty_id)
            .and_then(|(f, _)| f.department.clone()))
    }

    async fn faculty_name(&self, faculty_id: u64) -> StoreResult<Option<String>> {
        let data = self.read()?;
        Ok(data
            .faculty
            .iter()
            .find(|(f, _)| f.id == faculty_id)
            .map(|(f, _)| f.name.clone()))
    }

    async fn timetable_slot(&self, slot_id: u64) -> StoreResult<Option<SlotDetail>> {
        let data = self.read()?;
        Ok(data.timetable()?.iter().find(|s| s.id == slot_id).map(|s| data.detail(s)))
    }

    async fn subject_allocations(&self, subject_id: u64) -> StoreResult<HashSet<u64>> {
        let data = self.read()?;
        Ok(data
            .allocations
            .iter()
            .filter(|(_, s)| *s == subject_id)
            .map(|(f, _)| *f)
            .collect())
    }

    async fn faculty_on_leave(&self, date: NaiveDate) -> StoreResult<HashSet<u64>> {
        let data = self.read()?;
        Ok(data
            .leaves
            .iter()
            .filter(|l| l.date == date && l.status == LeaveStatus::Approved)
            .map(|l| l.faculty_id)
            .collect())
    }

    async fn substituting_at(&self, date: NaiveDate, start_time: NaiveTime) -> StoreResult<HashSet<u64>> {
        let data = self.read()?;
        Ok(data
            .substitutions
            .iter()
            .filter(|s| {
                s.date == date && s.start_time == Some(start_time) && s.status != AssignmentStatus::Cancelled
            })
            .map(|s| s.sub_faculty_id)
            .collect())
    }

    async fn insert_substitution(&self, row: NewSubstitution) -> StoreResult<u64> {
        let mut data = self.read()?;
        if data.failing_subjects.contains(&row.subject_id) {
            return Err(StoreError::Query("insert rejected".to_string()));
        }
        let id = data.substitutions.len() as u64 + 1;
        data.substitutions.push(SubstitutionAssignment {
            id,
            src_faculty_id: row.src_faculty_id,
            sub_faculty_id: row.sub_faculty_id,
            class_id: Some(row.class_id),
            subject_id: Some(row.subject_id),
            date: row.date,
            start_time: Some(row.start_time),
            status: row.status,
            assignment_type: row.assignment_type,
            notes: row.notes,
            created_at: None,
        });
        Ok(id)
    }

    async fn list_substitutions(&self, query: &SubstitutionQuery) -> StoreResult<Vec<SubstitutionAssignment>> {
        let data = self.read()?;
        let mut rows: Vec<SubstitutionAssignment> = data
            .substitutions
            .iter()
            .filter(|s| query.date.is_none_or(|d| s.date == d))
            .filter(|s| in_range(s.date, query.from, query.to))
            .filter(|s| query.src_faculty_id.is_none_or(|id| s.src_faculty_id == id))
            .filter(|s| query.sub_faculty_id.is_none_or(|id| s.sub_faculty_id == id))
            .filter(|s| query.status.is_none_or(|st| s.status == st))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(a.start_time.cmp(&b.start_time)));
        Ok(rows)
    }

    async fn set_substitution_status(&self, id: u64, status: AssignmentStatus) -> StoreResult<bool> {
        let mut data = self.read()?;
        match data.substitutions.iter_mut().find(|s| s.id == id) {
            Some(row) => {
                row.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_activity(&self, message: &str) -> StoreResult<u64> {
        let mut data = self.read()?;
        if data.failing_activity {
            return Err(StoreError::Query("activity_log insert rejected".to_string()));
        }
        data.activity.push(message.to_string());
        Ok(data.activity.len() as u64)
    }

    async fn insert_leave(&self, leave: NewLeave) -> StoreResult<u64> {
        let mut data = self.read()?;
        let id = data.leaves.len() as u64 + 1;
        data.leaves.push(FacultyLeave {
            id,
            faculty_id: leave.faculty_id,
            date: leave.date,
            leave_type: leave.leave_type,
            reason: leave.reason,
            status: LeaveStatus::Pending,
            created_at: None,
        });
        Ok(id)
    }

    async fn get_leave(&self, id: u64) -> StoreResult<Option<FacultyLeave>> {
        let data = self.read()?;
        Ok(data.leaves.iter().find(|l| l.id == id).cloned())
    }

    async fn list_leaves(&self, query: &LeaveQuery) -> StoreResult<Vec<FacultyLeave>> {
        let data = self.read()?;
        let mut rows: Vec<FacultyLeave> = data
            .leaves
            .iter()
            .filter(|l| query.faculty_id.is_none_or(|id| l.faculty_id == id))
            .filter(|l| query.status.is_none_or(|st| l.status == st))
            .filter(|l| in_range(l.date, query.from, query.to))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn decide_leave(&self, id: u64, status: LeaveStatus) -> StoreResult<bool> {
        let mut data = self.read()?;
        match data
            .leaves
            .iter_mut()
            .find(|l| l.id == id && l.status == LeaveStatus::Pending)
        {
            Some(leave) => {
                leave.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_transfer(&self, transfer: NewTransfer) -> StoreResult<u64> {
        let mut data = self.read()?;
        let id = data.transfers.len() as u64 + 1;
        data.transfers.push(LectureTransfer {
            id,
            from_faculty_id: transfer.from_faculty_id,
            to_faculty_id: transfer.to_faculty_id,
            timetable_slot_id: transfer.timetable_slot_id,
            date: transfer.date,
            reason: transfer.reason,
            status: TransferStatus::Pending,
            requested_at: Some(Utc::now()),
            responded_at: None,
        });
        Ok(id)
    }

    async fn get_transfer(&self, id: u64) -> StoreResult<Option<LectureTransfer>> {
        let data = self.read()?;
        Ok(data.transfers.iter().find(|t| t.id == id).cloned())
    }

    async fn list_transfers(&self, query: &TransferQuery) -> StoreResult<Vec<LectureTransfer>> {
        let data = self.read()?;
        let mut rows: Vec<LectureTransfer> = data
            .transfers
            .iter()
            .filter(|t| query.from_faculty_id.is_none_or(|id| t.from_faculty_id == id))
            .filter(|t| query.to_faculty_id.is_none_or(|id| t.to_faculty_id == id))
            .filter(|t| query.status.is_none_or(|st| t.status == st))
            .filter(|t| query.date.is_none_or(|d| t.date == d))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn settle_transfer(&self, id: u64, status: TransferStatus) -> StoreResult<bool> {
        let mut data = self.read()?;
        match data
            .transfers
            .iter_mut()
            .find(|t| t.id == id && t.status == TransferStatus::Pending)
        {
            Some(transfer) => {
                transfer.status = status;
                if matches!(status, TransferStatus::Accepted | TransferStatus::Rejected) {
                    transfer.responded_at = Some(Utc::now());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn active_students(&self, class_id: Option<u64>) -> StoreResult<Vec<Student>> {
        let data = self.read()?;
        let mut students: Vec<Student> = data
            .students
            .iter()
            .filter(|s| s.status == StudentStatus::Active)
            .filter(|s| class_id.is_none_or(|c| s.class_id == c))
            .cloned()
            .collect();
        students.sort_by_key(|s| (s.class_id, s.roll_no));
        Ok(students)
    }

    async fn sessions_between(
        &self,
        class_id: Option<u64>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceSession>> {
        let data = self.read()?;
        Ok(data
            .sessions
            .iter()
            .filter(|s| class_id.is_none_or(|c| s.class_id == c))
            .filter(|s| in_range(s.date, Some(from), Some(to)))
            .cloned()
            .collect())
    }

    async fn records_for_sessions(&self, session_ids: &[u64]) -> StoreResult<Vec<AttendanceRecord>> {
        let data = self.read()?;
        Ok(data
            .records
            .iter()
            .filter(|r| session_ids.contains(&r.session_id))
            .cloned()
            .collect())
    }

    async fn records_for_students(&self, student_ids: &[u64]) -> StoreResult<Vec<AttendanceRecord>> {
        let data = self.read()?;
        Ok(data
            .records
            .iter()
            .filter(|r| student_ids.contains(&r.student_id))
            .cloned()
            .collect())
    }

    async fn student_records(
        &self,
        student_id: u64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let data = self.read()?;
        let dates: HashMap<u64, NaiveDate> = data.sessions.iter().map(|s| (s.id, s.date)).collect();
        Ok(data
            .records
            .iter()
            .filter(|r| r.student_id == student_id)
            .filter(|r| {
                dates
                    .get(&r.session_id)
                    .is_some_and(|d| in_range(*d, from, to))
            })
            .cloned()
            .collect())
    }

    async fn class_labels(&self, class_ids: &[u64]) -> StoreResult<HashMap<u64, String>> {
        let data = self.read()?;
        Ok(class_ids
            .iter()
            .filter_map(|id| data.class_names.get(id).map(|name| (*id, name.clone())))
            .collect())
    }

    async fn syllabus_topics(&self, subject_id: u64) -> StoreResult<Vec<SyllabusTopic>> {
        let data = self.read()?;
        let mut topics: Vec<SyllabusTopic> = data
            .topics
            .iter()
            .filter(|t| t.subject_id == subject_id)
            .cloned()
            .collect();
        topics.sort_by_key(|t| t.unit_no);
        Ok(topics)
    }

    async fn covered_topics(&self, subject_id: u64) -> StoreResult<HashSet<u64>> {
        let data = self.read()?;
        let topic_ids: HashSet<u64> = data
            .topics
            .iter()
            .filter(|t| t.subject_id == subject_id)
            .map(|t| t.id)
            .collect();
        Ok(data
            .coverage
            .iter()
            .map(|(topic, _)| *topic)
            .filter(|topic| topic_ids.contains(topic))
            .collect())
    }
}
