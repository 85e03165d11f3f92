use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use super::{Page, TransferPage, parse_date, parse_enum, parse_opt_date, require};
use crate::error::AppError;
use crate::model::{
    substitution::{AssignmentStatus, AssignmentType, NewSubstitution},
    timetable::DayOfWeek,
    transfer::{LectureTransfer, NewTransfer, TransferQuery, TransferStatus},
};
use crate::store::Store;

const STATUSES: &str = "PENDING, ACCEPTED, REJECTED, CANCELLED";
const RESPONSES: &str = "ACCEPTED, REJECTED";
const ALREADY_PROCESSED: &str = "Transfer request not found or already processed";

#[derive(Deserialize, ToSchema)]
pub struct CreateTransfer {
    #[schema(example = 12)]
    pub from_faculty_id: Option<u64>,
    #[schema(example = 31)]
    pub to_faculty_id: Option<u64>,
    #[schema(example = 41)]
    pub timetable_slot_id: Option<u64>,
    #[schema(example = "2026-01-05", format = "date")]
    pub date: Option<String>,
    #[schema(example = "Exam duty")]
    pub reason: Option<String>,
}

/// Ask a colleague to take one lecture on a given date
#[utoipa::path(
    post,
    path = "/api/transfers",
    request_body(content = CreateTransfer, content_type = "application/json"),
    responses(
        (status = 201, description = "Transfer requested", body = Object, example = json!({
            "id": 3,
            "message": "Transfer request created",
            "status": "PENDING"
        })),
        (status = 400, description = "Missing field, unknown slot, or slot not held by the requester on that date")
    ),
    tag = "Transfer"
)]
pub async fn create_transfer(
    store: web::Data<dyn Store>,
    payload: web::Json<CreateTransfer>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    let from_faculty_id = require("from_faculty_id", req.from_faculty_id)?;
    let to_faculty_id = require("to_faculty_id", req.to_faculty_id)?;
    let timetable_slot_id = require("timetable_slot_id", req.timetable_slot_id)?;
    let date = parse_date("date", &require("date", req.date)?)?;

    if from_faculty_id == to_faculty_id {
        return Err(AppError::validation("to_faculty_id", "Cannot transfer a lecture to yourself"));
    }

    let detail = store
        .timetable_slot(timetable_slot_id)
        .await?
        .ok_or_else(|| AppError::validation("timetable_slot_id", "Timetable slot not found"))?;
    if detail.slot.faculty_id != from_faculty_id {
        return Err(AppError::validation(
            "timetable_slot_id",
            "Timetable slot is not taught by from_faculty_id",
        ));
    }
    if detail.slot.day_of_week != DayOfWeek::from(date) || !detail.slot.is_valid_on(date) {
        return Err(AppError::validation("date", "The lecture does not take place on this date"));
    }

    let id = store
        .insert_transfer(NewTransfer {
            from_faculty_id,
            to_faculty_id,
            timetable_slot_id,
            date,
            reason: req.reason.filter(|r| !r.trim().is_empty()),
        })
        .await?;
    info!(id, from_faculty_id, to_faculty_id, timetable_slot_id, "Lecture transfer requested");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": id,
        "message": "Transfer request created",
        "status": TransferStatus::Pending,
    })))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TransferFilter {
    /// Requesting faculty
    pub from_faculty_id: Option<u64>,
    /// Receiving faculty
    pub to_faculty_id: Option<u64>,
    #[schema(example = "PENDING")]
    pub status: Option<String>,
    /// Lecture date
    pub date: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u32>,
}

/// List lecture transfers, newest first
#[utoipa::path(
    get,
    path = "/api/transfers",
    params(TransferFilter),
    responses(
        (status = 200, description = "Paginated transfer list", body = TransferPage),
        (status = 400, description = "Malformed filter")
    ),
    tag = "Transfer"
)]
pub async fn list_transfers(
    store: web::Data<dyn Store>,
    query: web::Query<TransferFilter>,
) -> Result<HttpResponse, AppError> {
    let q = query.into_inner();
    let filter = TransferQuery {
        from_faculty_id: q.from_faculty_id,
        to_faculty_id: q.to_faculty_id,
        status: q
            .status
            .as_deref()
            .map(|s| parse_enum("status", s, STATUSES))
            .transpose()?,
        date: parse_opt_date("date", q.date.as_deref())?,
    };

    let rows = store.list_transfers(&filter).await?;
    Ok(HttpResponse::Ok().json(Page::of(rows, q.page, q.per_page)))
}

#[derive(Deserialize, ToSchema)]
pub struct TransferResponse {
    #[schema(example = "ACCEPTED")]
    pub response: Option<String>,
}

async fn pending_transfer(store: &dyn Store, id: u64) -> Result<LectureTransfer, AppError> {
    store
        .get_transfer(id)
        .await?
        .filter(|t| t.status == TransferStatus::Pending)
        .ok_or_else(|| AppError::BadRequest(ALREADY_PROCESSED.to_string()))
}

/// Accept or reject a transfer; accepting books the receiver as a confirmed substitute
#[utoipa::path(
    put,
    path = "/api/transfers/{id}/respond",
    params(("id" = u64, Path, description = "Transfer id")),
    request_body(content = TransferResponse, content_type = "application/json"),
    responses(
        (status = 200, description = "Transfer answered", body = Object, example = json!({
            "id": 3,
            "status": "ACCEPTED",
            "substitution_id": 7
        })),
        (status = 400, description = "Bad response value, or transfer not found or already processed")
    ),
    tag = "Transfer"
)]
pub async fn respond_transfer(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<TransferResponse>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let store = store.get_ref();
    let status: TransferStatus = parse_enum("response", &require("response", payload.into_inner().response)?, RESPONSES)?;
    if !matches!(status, TransferStatus::Accepted | TransferStatus::Rejected) {
        return Err(AppError::validation(
            "response",
            format!("Invalid response. Allowed: {}", RESPONSES),
        ));
    }

    let transfer = pending_transfer(store, id).await?;
    let detail = match status {
        TransferStatus::Accepted => Some(
            store
                .timetable_slot(transfer.timetable_slot_id)
                .await?
                .ok_or_else(|| AppError::BadRequest("Timetable slot for this transfer no longer exists".to_string()))?,
        ),
        _ => None,
    };

    if !store.settle_transfer(id, status).await? {
        return Err(AppError::BadRequest(ALREADY_PROCESSED.to_string()));
    }
    info!(id, %status, "Lecture transfer answered");

    let mut substitution_id = None;
    if let Some(detail) = detail {
        let row = NewSubstitution {
            src_faculty_id: transfer.from_faculty_id,
            sub_faculty_id: transfer.to_faculty_id,
            class_id: detail.slot.class_id,
            subject_id: detail.slot.subject_id,
            date: transfer.date,
            start_time: detail.slot.start_time,
            status: AssignmentStatus::Confirmed,
            assignment_type: AssignmentType::Transfer,
            notes: transfer.reason.clone(),
        };
        substitution_id = Some(store.insert_substitution(row).await?);

        let receiver = store
            .faculty_name(transfer.to_faculty_id)
            .await?
            .unwrap_or_else(|| format!("faculty #{}", transfer.to_faculty_id));
        let message = format!(
            "Lecture transfer: Prof. {} takes {} {} on {} at {}",
            receiver,
            detail.class_name,
            detail.subject_name,
            transfer.date,
            detail.slot.start_time.format("%H:%M")
        );
        if let Err(e) = store.insert_activity(&message).await {
            warn!(error = %e, id, "Failed to write activity log");
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": id,
        "status": status,
        "substitution_id": substitution_id,
    })))
}

/// Withdraw a transfer that has not been answered yet
#[utoipa::path(
    put,
    path = "/api/transfers/{id}/cancel",
    params(("id" = u64, Path, description = "Transfer id")),
    responses(
        (status = 200, description = "Transfer cancelled", body = Object, example = json!({
            "id": 3,
            "status": "CANCELLED"
        })),
        (status = 400, description = "Transfer not found or already processed")
    ),
    tag = "Transfer"
)]
pub async fn cancel_transfer(store: web::Data<dyn Store>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    if !store.settle_transfer(id, TransferStatus::Cancelled).await? {
        return Err(AppError::BadRequest(ALREADY_PROCESSED.to_string()));
    }
    info!(id, "Lecture transfer cancelled");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": id,
        "status": TransferStatus::Cancelled,
    })))
}
