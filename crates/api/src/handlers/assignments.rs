//! # Selection Protocol Handlers
//!
//! Interactive slot selection for a single teaching assignment: read the
//! annotated catalog, claim a window, or give the latest one back.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use timetable_core::{
    catalog::AvailabilityReport,
    models::{ClockTime, TimeWindow, Weekday},
    protocol::{self, SelectionOutcome, WithdrawalOutcome},
    services,
};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Body of a slot selection. The window is checked by the handler, so an
/// inverted window answers 400.
#[derive(Debug, Deserialize)]
pub struct SelectSlotRequest {
    pub day: Weekday,
    pub start: ClockTime,
    pub end: ClockTime,
}

#[axum::debug_handler]
pub async fn availability(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AvailabilityReport>, AppError> {
    let report = services::availability_for(state.gateway.as_ref(), id).await?;
    Ok(Json(report))
}

#[axum::debug_handler]
pub async fn select_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectSlotRequest>,
) -> Result<(StatusCode, Json<SelectionOutcome>), AppError> {
    let window = TimeWindow::new(payload.day, payload.start, payload.end)?;
    let outcome = protocol::select_slot(state.gateway.as_ref(), id, window).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[axum::debug_handler]
pub async fn withdraw_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WithdrawalOutcome>, AppError> {
    let outcome = protocol::withdraw_slot(state.gateway.as_ref(), id).await?;
    Ok(Json(outcome))
}
