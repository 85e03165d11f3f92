//! HTTP handlers. Request bodies keep dates and enums as strings so a bad
//! value is reported against the field that carried it.

/// Full service over a `MemoryStore`, routed and rate-limited the same way
/// as in production. `with_store` also hands back the store for inspection.
#[cfg(test)]
macro_rules! test_app {
    ($data:expr, with_store) => {{
        let config = $crate::config::Config::for_tests();
        let limiters = $crate::routes::Limiters::from_config(&config).unwrap();
        let memory = std::sync::Arc::new($crate::store::memory::MemoryStore::new($data));
        let store: std::sync::Arc<dyn $crate::store::Store> = memory.clone();
        let app = actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::from(store))
                .app_data(actix_web::web::Data::new(config))
                .app_data($crate::routes::json_config())
                .configure(move |cfg| $crate::routes::configure(cfg, "/api", limiters)),
        )
        .await;
        (app, memory)
    }};
    ($data:expr) => {{
        test_app!($data, with_store).0
    }};
}

pub mod leave_request;
pub mod reports;
pub mod substitution;
pub mod transfer;

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;

pub(crate) fn require<T>(field: &'static str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::missing(field))
}

pub(crate) fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(field, format!("Invalid {}: expected YYYY-MM-DD", field)))
}

pub(crate) fn parse_opt_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value.map(|v| parse_date(field, v)).transpose()
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub(crate) fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, AppError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::validation(field, format!("Invalid {}: expected HH:MM", field)))
}

/// Parses a store-spelled enum (`FULL_DAY`, `PENDING`, ...).
pub(crate) fn parse_enum<T: FromStr>(field: &'static str, value: &str, allowed: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| AppError::validation(field, format!("Invalid {}. Allowed: {}", field, allowed)))
}

pub(crate) fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    if from > to {
        return Err(AppError::validation("from", "from cannot be after to"));
    }
    Ok(())
}

pub(crate) fn check_threshold(value: Option<i64>, default: u8) -> Result<u8, AppError> {
    match value {
        None => Ok(default),
        Some(t) if (0..=100).contains(&t) => Ok(t as u8),
        Some(_) => Err(AppError::validation("threshold", "threshold must be between 0 and 100")),
    }
}

/// One page of a list endpoint.
#[derive(Serialize, ToSchema)]
#[aliases(
    LeavePage = Page<crate::model::faculty_leave::FacultyLeave>,
    SubstitutionPage = Page<crate::model::substitution::SubstitutionAssignment>,
    TransferPage = Page<crate::model::transfer::LectureTransfer>
)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: usize,
}

impl<T> Page<T> {
    /// Slices `rows` to the requested page; `page` is 1-based, `per_page`
    /// capped at 100.
    pub fn of(rows: Vec<T>, page: Option<u32>, per_page: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(10).clamp(1, 100);
        let total = rows.len();
        let offset = ((page - 1) as usize).saturating_mul(per_page as usize);
        let data = rows.into_iter().skip(offset).take(per_page as usize).collect();
        Self {
            data,
            page,
            per_page,
            total,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::timetable::LeaveWindow;

    #[test]
    fn page_slicing() {
        let p = Page::of((1..=25).collect::<Vec<u32>>(), Some(3), Some(10));
        assert_eq!(p.data, vec![21, 22, 23, 24, 25]);
        assert_eq!(p.total, 25);

        let p = Page::of(vec![1, 2, 3], Some(0), Some(500));
        assert_eq!((p.page, p.per_page), (1, 100));
        assert_eq!(p.data.len(), 3);

        assert!(Page::of(vec![1, 2, 3], Some(9), None).data.is_empty());
    }

    #[test]
    fn field_parsers() {
        assert!(parse_date("date", "2024-01-08").is_ok());
        assert!(matches!(
            parse_date("date", "08/01/2024"),
            Err(AppError::Validation { field: "date", .. })
        ));
        assert_eq!(parse_time("start_time", "09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_time("start_time", "09:30:00").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(parse_time("start_time", "9.30").is_err());

        let w: LeaveWindow = parse_enum("window", "HALF_MORNING", "").unwrap();
        assert_eq!(w, LeaveWindow::HalfMorning);
        assert!(parse_enum::<LeaveWindow>("window", "MORNING", "").is_err());
    }

    #[test]
    fn threshold_bounds() {
        assert_eq!(check_threshold(None, 75).unwrap(), 75);
        assert_eq!(check_threshold(Some(0), 75).unwrap(), 0);
        assert_eq!(check_threshold(Some(100), 75).unwrap(), 100);
        assert!(check_threshold(Some(101), 75).is_err());
        assert!(check_threshold(Some(-1), 75).is_err());
    }
}
