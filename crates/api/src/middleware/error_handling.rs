//! # Error Handling
//!
//! Maps domain errors to HTTP status codes and a JSON body of the form
//! `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use timetable_core::errors::TimeError;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use timetable_api::middleware::error_handling::AppError;
/// use timetable_core::errors::TimeError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(TimeError::NotFound("assignment".to_string()).into());
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub TimeError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TimeError::NotFound(_) => StatusCode::NOT_FOUND,
            TimeError::Validation(_) => StatusCode::BAD_REQUEST,
            TimeError::Conflict(_) => StatusCode::CONFLICT,
            TimeError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TimeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self.0, "request failed");
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Lets handlers use `?` on `TimeResult`.
impl From<TimeError> for AppError {
    fn from(err: TimeError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(TimeError::Database(err))
    }
}

/// Maps a TimeError straight to an HTTP response.
pub fn map_error(err: TimeError) -> Response {
    AppError(err).into_response()
}
