//! # Timetable API
//!
//! HTTP front end for the timetabling engine. It exposes batch generation,
//! the clash and validation audits, the weekly slot catalog and the
//! per-assignment selection protocol as JSON endpoints.
//!
//! ## Architecture
//!
//! - **Routes**: URL structure, one module per resource
//! - **Handlers**: extract requests and call into `timetable_core::services`
//!   and `timetable_core::protocol`
//! - **Middleware**: error to response mapping
//! - **Config**: environment driven settings
//!
//! Handlers never touch storage directly; they go through the
//! [`TimetableGateway`] held in [`ApiState`].

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error handling shared by all handlers
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use eyre::Result;
use timetable_core::gateway::TimetableGateway;
use timetable_db::{DbPool, PgGateway};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers.
pub struct ApiState {
    /// Storage behind every engine operation
    pub gateway: Arc<dyn TimetableGateway>,
}

impl ApiState {
    pub fn new(gateway: Arc<dyn TimetableGateway>) -> Self {
        Self { gateway }
    }
}

/// Builds the application router with all routes attached to `state`.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Generation, audits and the slot catalog
        .merge(routes::timetable::routes())
        // Per-assignment selection protocol
        .merge(routes::assignments::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the API server over a Postgres-backed gateway.
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// let db_pool = timetable_db::create_pool(&config.database_url).await?;
/// start_server(config, db_pool).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState::new(Arc::new(PgGateway::new(db_pool))));
    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_origin(origins);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new().layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
