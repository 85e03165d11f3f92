use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use super::substitution::AssignResponse;
use super::{LeavePage, Page, parse_date, parse_enum, parse_opt_date, require};
use crate::config::Config;
use crate::error::AppError;
use crate::model::{
    faculty_leave::{FacultyLeave, LeaveQuery, LeaveStatus, NewLeave},
    timetable::LeaveWindow,
};
use crate::scheduling::SubstitutionAssigner;
use crate::store::Store;

const LEAVE_TYPES: &str = "FULL_DAY, HALF_MORNING, HALF_AFTERNOON";
const LEAVE_STATUSES: &str = "PENDING, APPROVED, REJECTED";
const ALREADY_PROCESSED: &str = "Leave request not found or already processed";
const ASSIGNMENT_FAILED: &str = "Leave approved but substitution assignment failed. Please assign manually.";

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 12)]
    pub faculty_id: Option<u64>,
    #[schema(example = "2026-01-05", format = "date")]
    pub date: Option<String>,
    #[schema(example = "FULL_DAY")]
    pub leave_type: Option<String>,
    #[schema(example = "Conference")]
    pub reason: Option<String>,
}

/// Apply for leave
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = Object, example = json!({
            "id": 1,
            "message": "Leave request submitted",
            "status": "PENDING"
        })),
        (status = 400, description = "Missing or malformed field")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    store: web::Data<dyn Store>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    let leave = NewLeave {
        faculty_id: require("faculty_id", req.faculty_id)?,
        date: parse_date("date", &require("date", req.date)?)?,
        leave_type: parse_enum::<LeaveWindow>("leave_type", &require("leave_type", req.leave_type)?, LEAVE_TYPES)?,
        reason: req.reason.filter(|r| !r.trim().is_empty()),
    };
    let faculty_id = leave.faculty_id;

    let id = store.insert_leave(leave).await?;
    info!(id, faculty_id, "Leave request submitted");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": id,
        "message": "Leave request submitted",
        "status": LeaveStatus::Pending,
    })))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 12)]
    /// Filter by faculty ID
    pub faculty_id: Option<u64>,
    #[schema(example = "PENDING")]
    /// Filter by leave status
    pub status: Option<String>,
    /// Earliest leave date
    pub from: Option<String>,
    /// Latest leave date
    pub to: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u32>,
}

/// List leave applications
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeavePage),
        (status = 400, description = "Malformed filter")
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    store: web::Data<dyn Store>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, AppError> {
    let q = query.into_inner();
    let filter = LeaveQuery {
        faculty_id: q.faculty_id,
        status: q
            .status
            .as_deref()
            .map(|s| parse_enum("status", s, LEAVE_STATUSES))
            .transpose()?,
        from: parse_opt_date("from", q.from.as_deref())?,
        to: parse_opt_date("to", q.to.as_deref())?,
    };

    let rows = store.list_leaves(&filter).await?;
    Ok(HttpResponse::Ok().json(Page::of(rows, q.page, q.per_page)))
}

/// Leave application details
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = FacultyLeave),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "error": "Leave request not found"
        }))
    ),
    tag = "Leave"
)]
pub async fn get_leave(store: web::Data<dyn Store>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    let leave_id = path.into_inner();
    match store.get_leave(leave_id).await? {
        Some(leave) => Ok(HttpResponse::Ok().json(leave)),
        None => Err(AppError::NotFound("Leave request not found".to_string())),
    }
}

#[derive(Serialize, ToSchema)]
pub struct ApproveResponse {
    #[schema(example = "Leave approved")]
    pub message: String,
    /// Result of covering the leave's lectures. Absent when the assigner
    /// could not run; the leave stays approved either way.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution: Option<AssignResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Leave approved but substitution assignment failed. Please assign manually.")]
    pub substitution_error: Option<String>,
}

/// Appends "Leave approved for <name>" style entries. A lost entry only warns.
async fn log_decision(store: &dyn Store, leave: &FacultyLeave, status: LeaveStatus) {
    let name = match store.faculty_name(leave.faculty_id).await {
        Ok(Some(name)) => name,
        Ok(None) | Err(_) => format!("faculty #{}", leave.faculty_id),
    };
    let message = format!("Leave {} for {}", status.as_ref().to_lowercase(), name);
    if let Err(e) = store.insert_activity(&message).await {
        warn!(error = %e, leave_id = leave.id, "Failed to write activity log");
    }
}

async fn pending_leave(store: &dyn Store, leave_id: u64) -> Result<FacultyLeave, AppError> {
    store
        .get_leave(leave_id)
        .await?
        .filter(|l| l.status == LeaveStatus::Pending)
        .ok_or_else(|| AppError::BadRequest(ALREADY_PROCESSED.to_string()))
}

/// Approve a pending leave and assign substitutes for it
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved; substitutes assigned or a substitution_error explaining why not", body = ApproveResponse),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "error": "Leave request not found or already processed"
        })),
        (status = 500, description = "Store failure before the leave was approved")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let leave_id = path.into_inner();
    let store = store.get_ref();

    let leave = pending_leave(store, leave_id).await?;
    if !store.decide_leave(leave_id, LeaveStatus::Approved).await? {
        return Err(AppError::BadRequest(ALREADY_PROCESSED.to_string()));
    }
    info!(leave_id, faculty_id = leave.faculty_id, "Leave approved");
    log_decision(store, &leave, LeaveStatus::Approved).await;

    // The approval is committed; from here on a failure is reported, not returned.
    let response = match SubstitutionAssigner::new(store, config.half_day_boundary)
        .assign(leave.faculty_id, leave.date, leave.leave_type)
        .await
    {
        Ok(outcome) => ApproveResponse {
            message: match outcome.assigned.len() {
                0 => "Leave approved. No slots needed substitution.".to_string(),
                n => format!("Leave approved. {} substitution(s) assigned automatically.", n),
            },
            substitution: Some(outcome.into()),
            substitution_error: None,
        },
        Err(e) => {
            warn!(error = %e, leave_id, "Substitution assignment failed after approval");
            ApproveResponse {
                message: "Leave approved".to_string(),
                substitution: None,
                substitution_error: Some(ASSIGNMENT_FAILED.to_string()),
            }
        }
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Reject a pending leave
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "error": "Leave request not found or already processed"
        }))
    ),
    tag = "Leave"
)]
pub async fn reject_leave(store: web::Data<dyn Store>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    let leave_id = path.into_inner();
    let store = store.get_ref();

    let leave = pending_leave(store, leave_id).await?;
    if !store.decide_leave(leave_id, LeaveStatus::Rejected).await? {
        return Err(AppError::BadRequest(ALREADY_PROCESSED.to_string()));
    }
    info!(leave_id, "Leave rejected");
    log_decision(store, &leave, LeaveStatus::Rejected).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave rejected"
    })))
}
