use crate::analytics::{
    aggregator::{Defaulter, ZeroSessionPolicy},
    promotion::PromotionCandidate,
    report::DefaulterReport,
    student::StudentAttendanceStats,
    summary::{AttendanceTier, ClassStat, MonthlySummary},
    syllabus::{SyllabusProgress, UnitProgress},
};
use crate::api::leave_request::{ApproveResponse, CreateLeave, LeaveFilter};
use crate::api::reports::{DefaulterRequest, SummaryRequest};
use crate::api::substitution::{AssignRequest, AssignResponse, ManualSubstitution, StatusUpdate, SubstitutionFilter};
use crate::api::transfer::{CreateTransfer, TransferFilter, TransferResponse};
use crate::api::{LeavePage, SubstitutionPage, TransferPage};
use crate::model::{
    faculty::FacultyMember,
    faculty_leave::{FacultyLeave, LeaveStatus},
    substitution::{AssignmentStatus, AssignmentType, SubstitutionAssignment},
    timetable::LeaveWindow,
    transfer::{LectureTransfer, TransferStatus},
};
use crate::scheduling::{
    assigner::{AssignedSlot, SkipReason, SkippedSlot},
    ranker::Tier,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Core API",
        version = "1.0.0",
        description = r#"
## Substitution and Attendance Analytics

Backend for a college attendance system.

### 🔹 Key Features
- **Substitute Assignment**
  - Cover every lecture a faculty member misses during a full or half day leave
  - Preference: same subject, then same department, then anyone free
- **Leave Management**
  - Apply for leave; approving it assigns substitutes immediately
- **Lecture Transfers**
  - Hand one lecture to a colleague; accepting books them as a confirmed substitute
- **Manual Substitution**
  - Find free faculty for a time slot and record a hand-picked cover
- **Attendance Reports**
  - Defaulter lists, monthly summaries, student totals, promotion lists, syllabus coverage

### 📦 Response Format
- JSON-based RESTful responses
- Errors: `{"error": ..., "field"?: ..., "details"?: ...}`
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::substitution::assign_substitute,
        crate::api::substitution::list_substitutions,
        crate::api::substitution::available_faculty,
        crate::api::substitution::create_manual,
        crate::api::substitution::update_status,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::transfer::create_transfer,
        crate::api::transfer::list_transfers,
        crate::api::transfer::respond_transfer,
        crate::api::transfer::cancel_transfer,

        crate::api::reports::defaulters,
        crate::api::reports::summary,
        crate::api::reports::student_attendance,
        crate::api::reports::promotion,
        crate::api::reports::syllabus
    ),
    components(
        schemas(
            AssignRequest,
            AssignResponse,
            AssignedSlot,
            SkippedSlot,
            SkipReason,
            Tier,
            ManualSubstitution,
            StatusUpdate,
            SubstitutionFilter,
            SubstitutionAssignment,
            SubstitutionPage,
            AssignmentStatus,
            AssignmentType,
            FacultyMember,
            CreateLeave,
            LeaveFilter,
            FacultyLeave,
            LeavePage,
            LeaveStatus,
            LeaveWindow,
            ApproveResponse,
            CreateTransfer,
            TransferFilter,
            TransferResponse,
            LectureTransfer,
            TransferStatus,
            TransferPage,
            DefaulterRequest,
            DefaulterReport,
            Defaulter,
            ZeroSessionPolicy,
            SummaryRequest,
            MonthlySummary,
            ClassStat,
            AttendanceTier,
            StudentAttendanceStats,
            PromotionCandidate,
            SyllabusProgress,
            UnitProgress
        )
    ),
    tags(
        (name = "Substitution", description = "Substitute assignment APIs"),
        (name = "Leave", description = "Faculty leave APIs"),
        (name = "Transfer", description = "Lecture transfer APIs"),
        (name = "Reports", description = "Attendance and syllabus reports"),
    )
)]
pub struct ApiDoc;
