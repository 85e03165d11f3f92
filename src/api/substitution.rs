use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use super::{Page, SubstitutionPage, parse_date, parse_enum, parse_opt_date, parse_time, require};
use crate::config::Config;
use crate::error::AppError;
use crate::model::{
    faculty::FacultyMember,
    substitution::{AssignmentStatus, AssignmentType, NewSubstitution, SubstitutionQuery},
    timetable::LeaveWindow,
};
use crate::scheduling::{
    AssignOutcome, AvailabilityIndex, SubstitutionAssigner,
    assigner::{AssignedSlot, SkippedSlot},
};
use crate::store::Store;

const WINDOWS: &str = "FULL_DAY, HALF_MORNING, HALF_AFTERNOON";
const STATUSES: &str = "PENDING, CONFIRMED, COMPLETED, CANCELLED";

#[derive(Deserialize, ToSchema)]
pub struct AssignRequest {
    #[schema(example = 12)]
    pub faculty_id: Option<u64>,
    #[schema(example = "2026-01-05", format = "date")]
    pub date: Option<String>,
    #[schema(example = "HALF_MORNING")]
    pub window: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AssignResponse {
    pub assigned: Vec<AssignedSlot>,
    /// Slot ids that got no substitute.
    #[schema(example = json!([42]))]
    pub skipped: Vec<u64>,
    pub skip_details: Vec<SkippedSlot>,
    #[schema(example = "Assigned 2 substitutes, skipped 1 slots")]
    pub message: String,
}

impl From<AssignOutcome> for AssignResponse {
    fn from(outcome: AssignOutcome) -> Self {
        let message = outcome.message();
        Self {
            skipped: outcome.skipped.iter().map(|s| s.slot_id).collect(),
            skip_details: outcome.skipped,
            assigned: outcome.assigned,
            message,
        }
    }
}

/// Assign substitutes for every lecture a faculty member misses
#[utoipa::path(
    post,
    path = "/api/substitutions/assign",
    request_body(content = AssignRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Batch finished; some slots may be skipped", body = AssignResponse),
        (status = 400, description = "Missing or malformed field", body = Object, example = json!({
            "error": "Missing required field: window",
            "field": "window"
        })),
        (status = 500, description = "Store failure", body = Object, example = json!({
            "error": "Internal server error",
            "details": "store unavailable: connection refused"
        }))
    ),
    tag = "Substitution"
)]
pub async fn assign_substitute(
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
    payload: web::Json<AssignRequest>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    let faculty_id = require("faculty_id", req.faculty_id)?;
    let date = parse_date("date", &require("date", req.date)?)?;
    let window: LeaveWindow = parse_enum("window", &require("window", req.window)?, WINDOWS)?;

    let outcome = SubstitutionAssigner::new(store.get_ref(), config.half_day_boundary)
        .assign(faculty_id, date, window)
        .await?;

    Ok(HttpResponse::Ok().json(AssignResponse::from(outcome)))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SubstitutionFilter {
    /// Exact date
    #[schema(example = "2026-01-05")]
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Absent faculty
    pub src_faculty_id: Option<u64>,
    /// Covering faculty
    pub sub_faculty_id: Option<u64>,
    #[schema(example = "PENDING")]
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List substitution assignments, newest date first
#[utoipa::path(
    get,
    path = "/api/substitutions",
    params(SubstitutionFilter),
    responses(
        (status = 200, description = "Paginated assignments", body = SubstitutionPage),
        (status = 400, description = "Malformed filter")
    ),
    tag = "Substitution"
)]
pub async fn list_substitutions(
    store: web::Data<dyn Store>,
    query: web::Query<SubstitutionFilter>,
) -> Result<HttpResponse, AppError> {
    let q = query.into_inner();
    let filter = SubstitutionQuery {
        date: parse_opt_date("date", q.date.as_deref())?,
        from: parse_opt_date("from", q.from.as_deref())?,
        to: parse_opt_date("to", q.to.as_deref())?,
        src_faculty_id: q.src_faculty_id,
        sub_faculty_id: q.sub_faculty_id,
        status: q
            .status
            .as_deref()
            .map(|s| parse_enum("status", s, STATUSES))
            .transpose()?,
    };

    let rows = store.list_substitutions(&filter).await?;
    Ok(HttpResponse::Ok().json(Page::of(rows, q.page, q.per_page)))
}

#[derive(Deserialize, IntoParams)]
pub struct AvailableQuery {
    #[param(example = "2026-01-05")]
    pub date: Option<String>,
    #[param(example = "09:00")]
    pub start_time: Option<String>,
    /// Faculty on leave; never offered as their own substitute
    pub exclude_faculty_id: Option<u64>,
}

/// Faculty free to take a lecture by hand at a given date and time
#[utoipa::path(
    get,
    path = "/api/substitutions/available",
    params(AvailableQuery),
    responses(
        (status = 200, description = "Free faculty in store order", body = [FacultyMember]),
        (status = 400, description = "Missing or malformed parameter")
    ),
    tag = "Substitution"
)]
pub async fn available_faculty(
    store: web::Data<dyn Store>,
    query: web::Query<AvailableQuery>,
) -> Result<HttpResponse, AppError> {
    let q = query.into_inner();
    let date = parse_date("date", &require("date", q.date)?)?;
    let start_time = parse_time("start_time", &require("start_time", q.start_time)?)?;
    let exclude = require("exclude_faculty_id", q.exclude_faculty_id)?;

    let free = AvailabilityIndex::new(store.get_ref())
        .free_for_manual(date, start_time, exclude)
        .await?;
    Ok(HttpResponse::Ok().json(free))
}

#[derive(Deserialize, ToSchema)]
pub struct ManualSubstitution {
    #[schema(example = 12)]
    pub src_faculty_id: Option<u64>,
    #[schema(example = 31)]
    pub sub_faculty_id: Option<u64>,
    #[schema(example = 4)]
    pub class_id: Option<u64>,
    #[schema(example = 9)]
    pub subject_id: Option<u64>,
    #[schema(example = "2026-01-05", format = "date")]
    pub date: Option<String>,
    #[schema(example = "09:00")]
    pub start_time: Option<String>,
    pub notes: Option<String>,
}

/// Record a hand-picked substitute; created as CONFIRMED
#[utoipa::path(
    post,
    path = "/api/substitutions/manual",
    request_body(content = ManualSubstitution, content_type = "application/json"),
    responses(
        (status = 201, description = "Assignment created", body = Object, example = json!({
            "id": 7,
            "status": "CONFIRMED",
            "assignment_type": "MANUAL"
        })),
        (status = 400, description = "Missing field or substitute equals absent faculty")
    ),
    tag = "Substitution"
)]
pub async fn create_manual(
    store: web::Data<dyn Store>,
    payload: web::Json<ManualSubstitution>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    let src_faculty_id = require("src_faculty_id", req.src_faculty_id)?;
    let sub_faculty_id = require("sub_faculty_id", req.sub_faculty_id)?;
    if src_faculty_id == sub_faculty_id {
        return Err(AppError::validation(
            "sub_faculty_id",
            "Substitute must differ from the absent faculty",
        ));
    }

    let row = NewSubstitution {
        src_faculty_id,
        sub_faculty_id,
        class_id: require("class_id", req.class_id)?,
        subject_id: require("subject_id", req.subject_id)?,
        date: parse_date("date", &require("date", req.date)?)?,
        start_time: parse_time("start_time", &require("start_time", req.start_time)?)?,
        status: AssignmentStatus::Confirmed,
        assignment_type: AssignmentType::Manual,
        notes: req.notes,
    };
    let id = store.insert_substitution(row).await?;
    info!(id, src_faculty_id, sub_faculty_id, "Manual substitution created");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": id,
        "status": AssignmentStatus::Confirmed,
        "assignment_type": AssignmentType::Manual,
    })))
}

#[derive(Deserialize, ToSchema)]
pub struct StatusUpdate {
    #[schema(example = "COMPLETED")]
    pub status: Option<String>,
}

/// Move an assignment to another status
#[utoipa::path(
    put,
    path = "/api/substitutions/{id}/status",
    params(("id" = u64, Path, description = "Assignment id")),
    request_body(content = StatusUpdate, content_type = "application/json"),
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "No such assignment")
    ),
    tag = "Substitution"
)]
pub async fn update_status(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<StatusUpdate>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status: AssignmentStatus = parse_enum("status", &require("status", payload.into_inner().status)?, STATUSES)?;

    if !store.set_substitution_status(id, status).await? {
        return Err(AppError::NotFound("Substitution not found".to_string()));
    }
    info!(id, %status, "Substitution status updated");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": id,
        "status": status,
    })))
}
