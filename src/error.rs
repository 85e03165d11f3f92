//! HTTP-facing errors.

use actix_web::{error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use derive_more::Display;
use serde::Serialize;
use tracing::error;

use crate::store::StoreError;

/// Error body for every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Display)]
pub enum AppError {
    /// A single request field is missing or malformed.
    #[display(fmt = "{}: {}", field, message)]
    Validation { field: &'static str, message: String },
    #[display(fmt = "{}", _0)]
    BadRequest(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    /// Store or other unexpected failure; the string goes out as `details`.
    #[display(fmt = "internal error: {}", _0)]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn missing(field: &'static str) -> Self {
        AppError::validation(field, format!("Missing required field: {}", field))
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation { field, message } => ErrorBody {
                error: message.clone(),
                field: Some(field),
                details: None,
            },
            AppError::BadRequest(msg) | AppError::NotFound(msg) => ErrorBody {
                error: msg.clone(),
                field: None,
                details: None,
            },
            AppError::Internal(details) => ErrorBody {
                error: "Internal server error".to_string(),
                field: None,
                details: Some(details.clone()),
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        error!(error = %e, "Store failure");
        AppError::Internal(e.to_string())
    }
}

/// Routes body extraction failures (bad JSON, wrong types, missing fields)
/// through `AppError` so they share the error body shape.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}
