use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use timetable_core::{
    catalog::weekly_catalog,
    gateway::EntryFilter,
    generator::ClashRecord,
    models::TimeSlotCandidate,
    services::{self, AuditReport, GenerationReport, GenerationRequest, TimetableStats},
};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Query parameters narrowing an audit to part of the timetable.
#[derive(Debug, Default, Deserialize)]
pub struct EntryQuery {
    pub lecturer_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
}

impl From<EntryQuery> for EntryFilter {
    fn from(query: EntryQuery) -> Self {
        EntryFilter {
            lecturer_id: query.lecturer_id,
            room_id: query.room_id,
            course_id: query.course_id,
            ..EntryFilter::default()
        }
    }
}

pub async fn catalog() -> Json<Vec<TimeSlotCandidate>> {
    Json(weekly_catalog())
}

/// Runs the batch generator over the pending assignments of a term.
///
/// Assignments that cannot be placed are reported in `unassigned`; they
/// never fail the request.
#[axum::debug_handler]
pub async fn generate(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<GenerationRequest>,
) -> Result<Json<GenerationReport>, AppError> {
    let report = services::run_generation(state.gateway.as_ref(), &payload).await?;
    Ok(Json(report))
}

#[axum::debug_handler]
pub async fn clashes(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<Vec<ClashRecord>>, AppError> {
    let clashes = services::clashes(state.gateway.as_ref(), &query.into()).await?;
    Ok(Json(clashes))
}

#[axum::debug_handler]
pub async fn validate(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<AuditReport>, AppError> {
    let report = services::audit_timetable(state.gateway.as_ref(), &query.into()).await?;
    Ok(Json(report))
}

#[axum::debug_handler]
pub async fn stats(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<TimetableStats>, AppError> {
    let stats = services::timetable_stats(state.gateway.as_ref()).await?;
    Ok(Json(stats))
}
