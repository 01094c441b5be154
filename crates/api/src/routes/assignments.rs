use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/assignments/:id/availability",
            get(handlers::assignments::availability),
        )
        .route(
            "/api/assignments/:id/slots",
            post(handlers::assignments::select_slot).delete(handlers::assignments::withdraw_slot),
        )
}
