use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/catalog", get(handlers::timetable::catalog))
        .route("/api/timetable/generate", post(handlers::timetable::generate))
        .route("/api/timetable/clashes", get(handlers::timetable::clashes))
        .route("/api/timetable/validate", get(handlers::timetable::validate))
        .route("/api/timetable/stats", get(handlers::timetable::stats))
}
