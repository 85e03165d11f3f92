use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

use super::{Store, StoreError, StoreResult};
use crate::model::{
    attendance::{AttendanceRecord, AttendanceSession, AttendanceStatus},
    faculty::FacultyMember,
    faculty_leave::{FacultyLeave, LeaveQuery, LeaveStatus, NewLeave},
    student::{Student, StudentStatus},
    substitution::{
        AssignmentStatus, AssignmentType, NewSubstitution, SubstitutionAssignment, SubstitutionQuery,
    },
    syllabus::SyllabusTopic,
    timetable::{DayOfWeek, LeaveWindow, SlotDetail, TimetableSlot},
    transfer::{LectureTransfer, NewTransfer, TransferQuery, TransferStatus},
};

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
    Date(NaiveDate),
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn parse_enum<T: FromStr>(column: &str, raw: &str) -> StoreResult<T> {
    T::from_str(raw).map_err(|_| StoreError::Decode(format!("unexpected {} value '{}'", column, raw)))
}

/* =========================
Row records
========================= */

#[derive(FromRow)]
struct SlotRow {
    id: u64,
    faculty_id: u64,
    class_id: u64,
    subject_id: u64,
    day_of_week: String,
    start_time: NaiveTime,
    valid_from: NaiveDate,
    valid_to: NaiveDate,
    room_no: Option<String>,
    batch_id: Option<u64>,
    class_name: Option<String>,
    class_division: Option<String>,
    subject_name: Option<String>,
}

impl TryFrom<SlotRow> for SlotDetail {
    type Error = StoreError;

    fn try_from(row: SlotRow) -> StoreResult<Self> {
        let class_name = match (row.class_name, row.class_division) {
            (Some(name), Some(div)) => format!("{} {}", name, div),
            (Some(name), None) => name,
            _ => String::new(),
        };
        Ok(SlotDetail {
            slot: TimetableSlot {
                id: row.id,
                faculty_id: row.faculty_id,
                class_id: row.class_id,
                subject_id: row.subject_id,
                day_of_week: parse_enum("day_of_week", &row.day_of_week)?,
                start_time: row.start_time,
                valid_from: row.valid_from,
                valid_to: row.valid_to,
                room_no: row.room_no,
                batch_id: row.batch_id,
            },
            class_name,
            subject_name: row.subject_name.unwrap_or_default(),
        })
    }
}

#[derive(FromRow)]
struct FacultyRow {
    id: u64,
    name: Option<String>,
    department: Option<String>,
}

impl From<FacultyRow> for FacultyMember {
    fn from(row: FacultyRow) -> Self {
        FacultyMember {
            id: row.id,
            name: row.name.unwrap_or_else(|| "Unknown".to_string()),
            department: row.department,
        }
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    faculty_id: u64,
    date: NaiveDate,
    leave_type: String,
    reason: Option<String>,
    status: String,
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<LeaveRow> for FacultyLeave {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> StoreResult<Self> {
        Ok(FacultyLeave {
            id: row.id,
            faculty_id: row.faculty_id,
            date: row.date,
            leave_type: parse_enum::<LeaveWindow>("leave_type", &row.leave_type)?,
            reason: row.reason,
            status: parse_enum::<LeaveStatus>("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct SubstitutionRow {
    id: u64,
    src_faculty_id: u64,
    sub_faculty_id: u64,
    class_id: Option<u64>,
    subject_id: Option<u64>,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    status: String,
    assignment_type: String,
    notes: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubstitutionRow> for SubstitutionAssignment {
    type Error = StoreError;

    fn try_from(row: SubstitutionRow) -> StoreResult<Self> {
        Ok(SubstitutionAssignment {
            id: row.id,
            src_faculty_id: row.src_faculty_id,
            sub_faculty_id: row.sub_faculty_id,
            class_id: row.class_id,
            subject_id: row.subject_id,
            date: row.date,
            start_time: row.start_time,
            status: parse_enum::<AssignmentStatus>("status", &row.status)?,
            assignment_type: parse_enum::<AssignmentType>("assignment_type", &row.assignment_type)?,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct TransferRow {
    id: u64,
    from_faculty_id: u64,
    to_faculty_id: u64,
    timetable_slot_id: u64,
    date: NaiveDate,
    reason: Option<String>,
    status: String,
    requested_at: Option<DateTime<Utc>>,
    responded_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransferRow> for LectureTransfer {
    type Error = StoreError;

    fn try_from(row: TransferRow) -> StoreResult<Self> {
        Ok(LectureTransfer {
            id: row.id,
            from_faculty_id: row.from_faculty_id,
            to_faculty_id: row.to_faculty_id,
            timetable_slot_id: row.timetable_slot_id,
            date: row.date,
            reason: row.reason,
            status: parse_enum::<TransferStatus>("status", &row.status)?,
            requested_at: row.requested_at,
            responded_at: row.responded_at,
        })
    }
}

const TRANSFER_COLUMNS: &str =
    "id, from_faculty_id, to_faculty_id, timetable_slot_id, date, reason, status, requested_at, responded_at";

#[derive(FromRow)]
struct StudentRow {
    id: u64,
    class_id: u64,
    roll_no: Option<u32>,
    name: String,
    enrollment_no: Option<String>,
    status: String,
}

impl TryFrom<StudentRow> for Student {
    type Error = StoreError;

    fn try_from(row: StudentRow) -> StoreResult<Self> {
        Ok(Student {
            id: row.id,
            class_id: row.class_id,
            roll_no: row.roll_no,
            name: row.name,
            enrollment_no: row.enrollment_no,
            status: parse_enum::<StudentStatus>("status", &row.status)?,
        })
    }
}

#[derive(FromRow)]
struct SessionRow {
    id: u64,
    class_id: u64,
    subject_id: u64,
    faculty_id: u64,
    date: NaiveDate,
    start_time: NaiveTime,
    is_substitution: bool,
}

impl From<SessionRow> for AttendanceSession {
    fn from(row: SessionRow) -> Self {
        AttendanceSession {
            id: row.id,
            class_id: row.class_id,
            subject_id: row.subject_id,
            faculty_id: row.faculty_id,
            date: row.date,
            start_time: row.start_time,
            is_substitution: row.is_substitution,
        }
    }
}

#[derive(FromRow)]
struct RecordRow {
    id: u64,
    session_id: u64,
    student_id: u64,
    status: String,
}

impl TryFrom<RecordRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> StoreResult<Self> {
        Ok(AttendanceRecord {
            id: row.id,
            session_id: row.session_id,
            student_id: row.student_id,
            status: parse_enum::<AttendanceStatus>("status", &row.status)?,
        })
    }
}

#[derive(FromRow)]
struct TopicRow {
    id: u64,
    subject_id: u64,
    unit_no: u32,
    topic_text: String,
}

fn map_rows<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const RECORD_COLUMNS: &str = "r.id, r.session_id, r.student_id, r.status";

#[async_trait]
impl Store for MySqlStore {
    async fn faculty_slots_on(
        &self,
        faculty_id: u64,
        day: DayOfWeek,
        date: NaiveDate,
    ) -> StoreResult<Vec<SlotDetail>> {
        let rows = sqlx::query_as::<_, SlotRow>(
            r#"
            SELECT
                t.id, t.faculty_id, t.class_id, t.subject_id, t.day_of_week, t.start_time,
                t.valid_from, t.valid_to, t.room_no, t.batch_id,
                c.name AS class_name, c.division AS class_division,
                s.name AS subject_name
            FROM timetable_slots t
            LEFT JOIN classes c ON c.id = t.class_id
            LEFT JOIN subjects s ON s.id = t.subject_id
            WHERE t.faculty_id = ?
              AND t.day_of_week = ?
              AND t.valid_from <= ?
              AND t.valid_to >= ?
            ORDER BY t.start_time ASC
            "#,
        )
        .bind(faculty_id)
        .bind(day.as_ref())
        .bind(date)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        map_rows(rows)
    }

    async fn busy_faculty(
        &self,
        day: DayOfWeek,
        start_time: NaiveTime,
        date: NaiveDate,
    ) -> StoreResult<HashSet<u64>> {
        let ids = sqlx::query_scalar::<_, u64>(
            r#"
            SELECT faculty_id
            FROM timetable_slots
            WHERE day_of_week = ?
              AND start_time = ?
              AND valid_from <= ?
              AND valid_to >= ?
            "#,
        )
        .bind(day.as_ref())
        .bind(start_time)
        .bind(date)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn active_faculty_except(&self, faculty_id: u64) -> StoreResult<Vec<FacultyMember>> {
        let rows = sqlx::query_as::<_, FacultyRow>(
            r#"
            SELECT f.id, p.name, f.department
            FROM faculty f
            LEFT JOIN profiles p ON p.id = f.profile_id
            WHERE f.status = 'Active'
              AND f.id <> ?
            "#,
        )
        .bind(faculty_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FacultyMember::from).collect())
    }

    async fn faculty_department(&self, faculty_id: u64) -> StoreResult<Option<String>> {
        let department = sqlx::query_scalar::<_, Option<String>>(
            "SELECT department FROM faculty WHERE id = ?",
        )
        .bind(faculty_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(department.flatten())
    }

    async fn faculty_name(&self, faculty_id: u64) -> StoreResult<Option<String>> {
        let name = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT p.name
            FROM faculty f
            LEFT JOIN profiles p ON p.id = f.profile_id
            WHERE f.id = ?
            "#,
        )
        .bind(faculty_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name.flatten())
    }

    async fn timetable_slot(&self, slot_id: u64) -> StoreResult<Option<SlotDetail>> {
        let row = sqlx::query_as::<_, SlotRow>(
            r#"
            SELECT
                t.id, t.faculty_id, t.class_id, t.subject_id, t.day_of_week, t.start_time,
                t.valid_from, t.valid_to, t.room_no, t.batch_id,
                c.name AS class_name, c.division AS class_division,
                s.name AS subject_name
            FROM timetable_slots t
            LEFT JOIN classes c ON c.id = t.class_id
            LEFT JOIN subjects s ON s.id = t.subject_id
            WHERE t.id = ?
            "#,
        )
        .bind(slot_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SlotDetail::try_from).transpose()
    }

    async fn subject_allocations(&self, subject_id: u64) -> StoreResult<HashSet<u64>> {
        let ids = sqlx::query_scalar::<_, u64>(
            "SELECT faculty_id FROM subject_allocations WHERE subject_id = ?",
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn faculty_on_leave(&self, date: NaiveDate) -> StoreResult<HashSet<u64>> {
        let ids = sqlx::query_scalar::<_, u64>(
            "SELECT faculty_id FROM faculty_leaves WHERE date = ? AND status = 'APPROVED'",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn substituting_at(&self, date: NaiveDate, start_time: NaiveTime) -> StoreResult<HashSet<u64>> {
        let ids = sqlx::query_scalar::<_, u64>(
            r#"
            SELECT sub_faculty_id
            FROM substitution_assignments
            WHERE date = ?
              AND start_time = ?
              AND status <> 'CANCELLED'
            "#,
        )
        .bind(date)
        .bind(start_time)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn insert_substitution(&self, row: NewSubstitution) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO substitution_assignments
                (src_faculty_id, sub_faculty_id, class_id, subject_id, date, start_time,
                 status, assignment_type, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.src_faculty_id)
        .bind(row.sub_faculty_id)
        .bind(row.class_id)
        .bind(row.subject_id)
        .bind(row.date)
        .bind(row.start_time)
        .bind(row.status.as_ref())
        .bind(row.assignment_type.as_ref())
        .bind(row.notes)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id())
    }

    async fn list_substitutions(&self, query: &SubstitutionQuery) -> StoreResult<Vec<SubstitutionAssignment>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(date) = query.date {
            where_sql.push_str(" AND date = ?");
            args.push(FilterValue::Date(date));
        }
        if let Some(from) = query.from {
            where_sql.push_str(" AND date >= ?");
            args.push(FilterValue::Date(from));
        }
        if let Some(to) = query.to {
            where_sql.push_str(" AND date <= ?");
            args.push(FilterValue::Date(to));
        }
        if let Some(src) = query.src_faculty_id {
            where_sql.push_str(" AND src_faculty_id = ?");
            args.push(FilterValue::U64(src));
        }
        if let Some(sub) = query.sub_faculty_id {
            where_sql.push_str(" AND sub_faculty_id = ?");
            args.push(FilterValue::U64(sub));
        }
        if let Some(status) = query.status.as_ref() {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_ref()));
        }

        let sql = format!(
            r#"
            SELECT id, src_faculty_id, sub_faculty_id, class_id, subject_id, date, start_time,
                   status, assignment_type, notes, created_at
            FROM substitution_assignments
            {}
            ORDER BY date DESC, start_time ASC
            "#,
            where_sql
        );
        debug!(sql = %sql, "Listing substitutions");

        let mut q = sqlx::query_as::<_, SubstitutionRow>(&sql);
        for arg in args {
            q = match arg {
                FilterValue::U64(v) => q.bind(v),
                FilterValue::Str(s) => q.bind(s),
                FilterValue::Date(d) => q.bind(d),
            };
        }

        map_rows(q.fetch_all(&self.pool).await?)
    }

    async fn set_substitution_status(&self, id: u64, status: AssignmentStatus) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE substitution_assignments SET status = ? WHERE id = ?")
            .bind(status.as_ref())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_activity(&self, message: &str) -> StoreResult<u64> {
        let result = sqlx::query("INSERT INTO activity_log (message) VALUES (?)")
            .bind(message)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_id())
    }

    async fn insert_leave(&self, leave: NewLeave) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO faculty_leaves (faculty_id, date, leave_type, reason, status)
            VALUES (?, ?, ?, ?, 'PENDING')
            "#,
        )
        .bind(leave.faculty_id)
        .bind(leave.date)
        .bind(leave.leave_type.as_ref())
        .bind(leave.reason)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id())
    }

    async fn get_leave(&self, id: u64) -> StoreResult<Option<FacultyLeave>> {
        let row = sqlx::query_as::<_, LeaveRow>(
            r#"
            SELECT id, faculty_id, date, leave_type, reason, status, created_at
            FROM faculty_leaves
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(FacultyLeave::try_from).transpose()
    }

    async fn list_leaves(&self, query: &LeaveQuery) -> StoreResult<Vec<FacultyLeave>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(faculty_id) = query.faculty_id {
            where_sql.push_str(" AND faculty_id = ?");
            args.push(FilterValue::U64(faculty_id));
        }
        if let Some(status) = query.status.as_ref() {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_ref()));
        }
        if let Some(from) = query.from {
            where_sql.push_str(" AND date >= ?");
            args.push(FilterValue::Date(from));
        }
        if let Some(to) = query.to {
            where_sql.push_str(" AND date <= ?");
            args.push(FilterValue::Date(to));
        }

        let sql = format!(
            r#"
            SELECT id, faculty_id, date, leave_type, reason, status, created_at
            FROM faculty_leaves
            {}
            ORDER BY date DESC
            "#,
            where_sql
        );

        let mut q = sqlx::query_as::<_, LeaveRow>(&sql);
        for arg in args {
            q = match arg {
                FilterValue::U64(v) => q.bind(v),
                FilterValue::Str(s) => q.bind(s),
                FilterValue::Date(d) => q.bind(d),
            };
        }

        map_rows(q.fetch_all(&self.pool).await?)
    }

    async fn decide_leave(&self, id: u64, status: LeaveStatus) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE faculty_leaves
            SET status = ?
            WHERE id = ?
            AND status = 'PENDING'
            "#,
        )
        .bind(status.as_ref())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_transfer(&self, transfer: NewTransfer) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO lecture_transfers
                (from_faculty_id, to_faculty_id, timetable_slot_id, date, reason, status, requested_at)
            VALUES (?, ?, ?, ?, ?, 'PENDING', UTC_TIMESTAMP())
            "#,
        )
        .bind(transfer.from_faculty_id)
        .bind(transfer.to_faculty_id)
        .bind(transfer.timetable_slot_id)
        .bind(transfer.date)
        .bind(transfer.reason)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id())
    }

    async fn get_transfer(&self, id: u64) -> StoreResult<Option<LectureTransfer>> {
        let sql = format!("SELECT {} FROM lecture_transfers WHERE id = ?", TRANSFER_COLUMNS);
        let row = sqlx::query_as::<_, TransferRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(LectureTransfer::try_from).transpose()
    }

    async fn list_transfers(&self, query: &TransferQuery) -> StoreResult<Vec<LectureTransfer>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(from) = query.from_faculty_id {
            where_sql.push_str(" AND from_faculty_id = ?");
            args.push(FilterValue::U64(from));
        }
        if let Some(to) = query.to_faculty_id {
            where_sql.push_str(" AND to_faculty_id = ?");
            args.push(FilterValue::U64(to));
        }
        if let Some(status) = query.status.as_ref() {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_ref()));
        }
        if let Some(date) = query.date {
            where_sql.push_str(" AND date = ?");
            args.push(FilterValue::Date(date));
        }

        let sql = format!(
            "SELECT {} FROM lecture_transfers {} ORDER BY requested_at DESC, id DESC",
            TRANSFER_COLUMNS, where_sql
        );
        debug!(sql = %sql, "Listing lecture transfers");

        let mut q = sqlx::query_as::<_, TransferRow>(&sql);
        for arg in args {
            q = match arg {
                FilterValue::U64(v) => q.bind(v),
                FilterValue::Str(s) => q.bind(s),
                FilterValue::Date(d) => q.bind(d),
            };
        }

        map_rows(q.fetch_all(&self.pool).await?)
    }

    async fn settle_transfer(&self, id: u64, status: TransferStatus) -> StoreResult<bool> {
        let responded = matches!(status, TransferStatus::Accepted | TransferStatus::Rejected);
        let result = sqlx::query(
            r#"
            UPDATE lecture_transfers
            SET status = ?,
                responded_at = IF(?, UTC_TIMESTAMP(), responded_at)
            WHERE id = ?
            AND status = 'PENDING'
            "#,
        )
        .bind(status.as_ref())
        .bind(responded)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn active_students(&self, class_id: Option<u64>) -> StoreResult<Vec<Student>> {
        let rows = match class_id {
            Some(class_id) => {
                sqlx::query_as::<_, StudentRow>(
                    r#"
                    SELECT id, class_id, roll_no, name, enrollment_no, status
                    FROM students
                    WHERE class_id = ? AND status = 'ACTIVE'
                    ORDER BY roll_no ASC
                    "#,
                )
                .bind(class_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, StudentRow>(
                    r#"
                    SELECT id, class_id, roll_no, name, enrollment_no, status
                    FROM students
                    WHERE status = 'ACTIVE'
                    ORDER BY class_id ASC, roll_no ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        map_rows(rows)
    }

    async fn sessions_between(
        &self,
        class_id: Option<u64>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceSession>> {
        let mut sql = String::from(
            r#"
            SELECT id, class_id, subject_id, faculty_id, date, start_time, is_substitution
            FROM attendance_sessions
            WHERE date >= ? AND date <= ?
            "#,
        );
        if class_id.is_some() {
            sql.push_str(" AND class_id = ?");
        }
        sql.push_str(" ORDER BY date ASC, start_time ASC");

        let mut q = sqlx::query_as::<_, SessionRow>(&sql).bind(from).bind(to);
        if let Some(class_id) = class_id {
            q = q.bind(class_id);
        }

        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(AttendanceSession::from).collect())
    }

    async fn records_for_sessions(&self, session_ids: &[u64]) -> StoreResult<Vec<AttendanceRecord>> {
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM attendance_records r WHERE r.session_id IN ({})",
            RECORD_COLUMNS,
            placeholders(session_ids.len())
        );
        let mut q = sqlx::query_as::<_, RecordRow>(&sql);
        for id in session_ids {
            q = q.bind(*id);
        }

        map_rows(q.fetch_all(&self.pool).await?)
    }

    async fn records_for_students(&self, student_ids: &[u64]) -> StoreResult<Vec<AttendanceRecord>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM attendance_records r WHERE r.student_id IN ({})",
            RECORD_COLUMNS,
            placeholders(student_ids.len())
        );
        let mut q = sqlx::query_as::<_, RecordRow>(&sql);
        for id in student_ids {
            q = q.bind(*id);
        }

        map_rows(q.fetch_all(&self.pool).await?)
    }

    async fn student_records(
        &self,
        student_id: u64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let mut sql = format!(
            r#"
            SELECT {}
            FROM attendance_records r
            INNER JOIN attendance_sessions s ON s.id = r.session_id
            WHERE r.student_id = ?
            "#,
            RECORD_COLUMNS
        );
        if from.is_some() {
            sql.push_str(" AND s.date >= ?");
        }
        if to.is_some() {
            sql.push_str(" AND s.date <= ?");
        }

        let mut q = sqlx::query_as::<_, RecordRow>(&sql).bind(student_id);
        if let Some(from) = from {
            q = q.bind(from);
        }
        if let Some(to) = to {
            q = q.bind(to);
        }

        map_rows(q.fetch_all(&self.pool).await?)
    }

    async fn class_labels(&self, class_ids: &[u64]) -> StoreResult<HashMap<u64, String>> {
        if class_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT id, name, division FROM classes WHERE id IN ({})",
            placeholders(class_ids.len())
        );
        let mut q = sqlx::query_as::<_, (u64, String, Option<String>)>(&sql);
        for id in class_ids {
            q = q.bind(*id);
        }

        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(id, name, division)| {
                let label = format!("{} {}", name, division.unwrap_or_default());
                (id, label.trim().to_string())
            })
            .collect())
    }

    async fn syllabus_topics(&self, subject_id: u64) -> StoreResult<Vec<SyllabusTopic>> {
        let rows = sqlx::query_as::<_, TopicRow>(
            r#"
            SELECT id, subject_id, unit_no, topic_text
            FROM syllabus_topics
            WHERE subject_id = ?
            ORDER BY unit_no ASC, created_at ASC
            "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SyllabusTopic {
                id: row.id,
                subject_id: row.subject_id,
                unit_no: row.unit_no,
                topic_text: row.topic_text,
            })
            .collect())
    }

    async fn covered_topics(&self, subject_id: u64) -> StoreResult<HashSet<u64>> {
        let ids = sqlx::query_scalar::<_, u64>(
            r#"
            SELECT DISTINCT c.syllabus_topic_id
            FROM syllabus_coverage c
            INNER JOIN syllabus_topics t ON t.id = c.syllabus_topic_id
            WHERE t.subject_id = ?
            "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
