use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::{check_range, check_threshold, parse_date, parse_opt_date, require};
use crate::analytics::{
    promotion::{DEFAULT_THRESHOLD, PromotionCandidate, promotion_candidates},
    report::{DefaulterReport, defaulter_report},
    student::{StudentAttendanceStats, student_stats},
    summary::{MonthlySummary, ReportMonth, monthly_summary},
    syllabus::{SyllabusProgress, syllabus_progress},
};
use crate::config::Config;
use crate::error::AppError;
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct DefaulterRequest {
    #[schema(example = 4)]
    pub class_id: Option<u64>,
    #[schema(example = "2026-01-01", format = "date")]
    pub from: Option<String>,
    #[schema(example = "2026-01-31", format = "date")]
    pub to: Option<String>,
    /// 0-100; the configured default applies when absent
    #[schema(example = 75)]
    pub threshold: Option<i64>,
}

/// Students below an attendance threshold over a date range
#[utoipa::path(
    post,
    path = "/api/reports/defaulters",
    request_body(content = DefaulterRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Defaulters, lowest percentage first", body = DefaulterReport),
        (status = 400, description = "Missing or malformed field"),
        (status = 500, description = "Store failure")
    ),
    tag = "Reports"
)]
pub async fn defaulters(
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
    payload: web::Json<DefaulterRequest>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    let class_id = require("class_id", req.class_id)?;
    let from = parse_date("from", &require("from", req.from)?)?;
    let to = parse_date("to", &require("to", req.to)?)?;
    check_range(from, to)?;
    let threshold = check_threshold(req.threshold, config.defaulter_threshold)?;

    let report = defaulter_report(
        store.get_ref(),
        class_id,
        from,
        to,
        threshold,
        config.zero_session_policy,
    )
    .await?;
    Ok(HttpResponse::Ok().json(report))
}

#[derive(Deserialize, ToSchema)]
pub struct SummaryRequest {
    #[schema(example = "2026-01")]
    pub month: Option<String>,
    /// Limit to one class; all classes when absent
    pub class_id: Option<u64>,
}

/// Monthly attendance summary, also written to the activity log
#[utoipa::path(
    post,
    path = "/api/reports/monthly-summary",
    request_body(content = SummaryRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Summary generated", body = MonthlySummary),
        (status = 400, description = "Invalid month format", body = Object, example = json!({
            "error": "Invalid month format. Expected YYYY-MM",
            "field": "month"
        }))
    ),
    tag = "Reports"
)]
pub async fn summary(
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
    payload: web::Json<SummaryRequest>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    let month = req
        .month
        .as_deref()
        .and_then(ReportMonth::parse)
        .ok_or_else(|| AppError::validation("month", "Invalid month format. Expected YYYY-MM"))?;

    let out = monthly_summary(store.get_ref(), month, req.class_id, config.zero_session_policy).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[derive(Deserialize, IntoParams)]
pub struct RangeQuery {
    #[param(example = "2026-01-01")]
    pub from: Option<String>,
    #[param(example = "2026-01-31")]
    pub to: Option<String>,
}

/// Attendance totals for one student
#[utoipa::path(
    get,
    path = "/api/students/{id}/attendance",
    params(("id" = u64, Path, description = "Student id"), RangeQuery),
    responses(
        (status = 200, description = "Attendance totals", body = StudentAttendanceStats),
        (status = 400, description = "Malformed date")
    ),
    tag = "Reports"
)]
pub async fn student_attendance(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, AppError> {
    let from = parse_opt_date("from", query.from.as_deref())?;
    let to = parse_opt_date("to", query.to.as_deref())?;
    if let (Some(f), Some(t)) = (from, to) {
        check_range(f, t)?;
    }

    let stats = student_stats(store.get_ref(), path.into_inner(), from, to).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[derive(Deserialize, IntoParams)]
pub struct PromotionQuery {
    /// 0-100, defaults to 75
    pub threshold: Option<i64>,
}

/// Promotion list for a class with low-attendance suggestions
#[utoipa::path(
    get,
    path = "/api/classes/{id}/promotion",
    params(("id" = u64, Path, description = "Class id"), PromotionQuery),
    responses(
        (status = 200, description = "Students in roll order", body = [PromotionCandidate]),
        (status = 400, description = "Threshold out of range")
    ),
    tag = "Reports"
)]
pub async fn promotion(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    query: web::Query<PromotionQuery>,
) -> Result<HttpResponse, AppError> {
    let threshold = check_threshold(query.threshold, DEFAULT_THRESHOLD)?;
    let list = promotion_candidates(store.get_ref(), path.into_inner(), threshold).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Share of a subject's syllabus topics already covered in class
#[utoipa::path(
    get,
    path = "/api/subjects/{id}/syllabus-progress",
    params(("id" = u64, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Coverage overall and per unit", body = SyllabusProgress)
    ),
    tag = "Reports"
)]
pub async fn syllabus(store: web::Data<dyn Store>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    let progress = syllabus_progress(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use chrono::{NaiveDate, NaiveTime};
    use serde_json::json;

    use crate::api::testing::{get, post};
    use crate::model::attendance::{AttendanceRecord, AttendanceSession, AttendanceStatus};
    use crate::model::student::{Student, StudentStatus};
    use crate::store::memory::MemoryData;

    fn student(id: u64, roll: u32) -> Student {
        Student {
            id,
            class_id: 1,
            roll_no: Some(roll),
            name: format!("S{}", id),
            enrollment_no: None,
            status: StudentStatus::Active,
        }
    }

    /// A attends 10/10, B 5/10, C never recorded.
    fn class_fixture() -> MemoryData {
        let sessions = (1..=10)
            .map(|i| AttendanceSession {
                id: i,
                class_id: 1,
                subject_id: 1,
                faculty_id: 1,
                date: NaiveDate::from_ymd_opt(2024, 1, i as u32).unwrap(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                is_substitution: false,
            })
            .collect();
        let mut records = Vec::new();
        for session_id in 1..=10u64 {
            records.push(AttendanceRecord {
                id: session_id * 2,
                session_id,
                student_id: 1,
                status: AttendanceStatus::Present,
            });
            records.push(AttendanceRecord {
                id: session_id * 2 + 1,
                session_id,
                student_id: 2,
                status: if session_id <= 5 {
                    AttendanceStatus::Present
                } else {
                    AttendanceStatus::Absent
                },
            });
        }
        MemoryData {
            students: vec![student(1, 1), student(2, 2), student(3, 3)],
            sessions,
            records,
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn defaulter_report_over_http() {
        let app = test_app!(class_fixture());
        let req = post(
            "/api/reports/defaulters",
            json!({"class_id": 1, "from": "2024-01-01", "to": "2024-01-31", "threshold": 75}),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["total_students"], 3);
        assert_eq!(body["total_sessions"], 10);
        let defaulters = body["defaulters"].as_array().unwrap();
        assert_eq!(defaulters.len(), 2);
        assert_eq!(defaulters[0]["student_id"], 3);
        assert_eq!(defaulters[0]["percentage"], 0);
        assert_eq!(defaulters[1]["student_id"], 2);
        assert_eq!(defaulters[1]["percentage"], 50);
    }

    #[actix_web::test]
    async fn threshold_defaults_from_config() {
        let app = test_app!(class_fixture());
        let req = post(
            "/api/reports/defaulters",
            json!({"class_id": 1, "from": "2024-01-01", "to": "2024-01-31"}),
        )
        .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["threshold"], 75);
    }

    #[actix_web::test]
    async fn threshold_out_of_range_is_rejected() {
        let app = test_app!(class_fixture());
        let req = post(
            "/api/reports/defaulters",
            json!({"class_id": 1, "from": "2024-01-01", "to": "2024-01-31", "threshold": 101}),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["field"], "threshold");
    }

    #[actix_web::test]
    async fn missing_class_and_reversed_range_are_rejected() {
        let app = test_app!(class_fixture());

        let req = post("/api/reports/defaulters", json!({"from": "2024-01-01", "to": "2024-01-31"})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["field"], "class_id");

        let req = post(
            "/api/reports/defaulters",
            json!({"class_id": 1, "from": "2024-02-01", "to": "2024-01-01"}),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn no_sessions_is_an_empty_success() {
        let app = test_app!(class_fixture());
        let req = post(
            "/api/reports/defaulters",
            json!({"class_id": 1, "from": "2024-03-01", "to": "2024-03-31"}),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["defaulters"], json!([]));
        assert_eq!(body["message"], "No attendance sessions found in the given date range");
    }

    #[actix_web::test]
    async fn unreachable_store_is_500_with_details() {
        let app = test_app!(MemoryData {
            unreachable: true,
            ..Default::default()
        });
        let req = post(
            "/api/reports/defaulters",
            json!({"class_id": 1, "from": "2024-01-01", "to": "2024-01-31"}),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(body["details"].as_str().unwrap().contains("connection refused"));
    }

    #[actix_web::test]
    async fn summary_rejects_bad_month() {
        let app = test_app!(class_fixture());
        let req = post("/api/reports/monthly-summary", json!({"month": "January"})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["field"], "month");
    }

    #[actix_web::test]
    async fn summary_over_http() {
        let app = test_app!(class_fixture());
        let req = post("/api/reports/monthly-summary", json!({"month": "2024-01"})).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["month"], "2024-01");
        assert_eq!(body["total_sessions"], 10);
        assert_eq!(body["average_attendance"], 75);
        assert_eq!(body["activity_log_id"], 1);
    }

    #[actix_web::test]
    async fn student_promotion_and_syllabus_endpoints() {
        let app = test_app!(class_fixture());

        let req = get("/api/students/2/attendance?from=2024-01-01&to=2024-01-31").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["present"], 5);
        assert_eq!(body["absent"], 5);
        assert_eq!(body["percentage"], 50);

        let req = get("/api/classes/1/promotion?threshold=60").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1]["suggestion"], "Low attendance - consider YD");
        assert_eq!(list[2]["percentage"], 100);
        assert!(list[2].get("suggestion").is_none());

        let req = get("/api/classes/1/promotion?threshold=150").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = get("/api/subjects/1/syllabus-progress").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_topics"], 0);
        assert_eq!(body["percentage"], 0);
    }

    #[actix_web::test]
    async fn malformed_json_is_400() {
        let app = test_app!(class_fixture());
        let req = post("/api/reports/defaulters", json!({}))
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"class_id\": \"one\"")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}
