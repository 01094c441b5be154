use axum::{body::to_bytes, http::StatusCode};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use timetable_api::middleware::error_handling::{map_error, AppError};
use timetable_core::errors::TimeError;

fn internal() -> TimeError {
    TimeError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )))
}

#[rstest]
#[case(TimeError::NotFound("Resource not found".to_string()), StatusCode::NOT_FOUND)]
#[case(TimeError::Validation("Invalid input".to_string()), StatusCode::BAD_REQUEST)]
#[case(TimeError::Conflict("Slot taken".to_string()), StatusCode::CONFLICT)]
#[case(TimeError::Database(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(internal(), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: TimeError, #[case] expected: StatusCode) {
    let response = map_error(error);

    assert_eq!(response.status(), expected);
}

#[tokio::test]
async fn test_error_body_carries_message() {
    let response = map_error(TimeError::Conflict("Slot mon 07:00-09:00 is already taken".to_string()));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        body,
        json!({ "error": "Conflict: Slot mon 07:00-09:00 is already taken" })
    );
}

#[test]
fn test_eyre_report_becomes_database_error() {
    let error = AppError::from(eyre::eyre!("pool timed out"));

    assert!(matches!(error.0, TimeError::Database(_)));
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
