use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/session/start", post(handlers::start_session))
        .route("/session/speak", post(handlers::toggle_speak))
        .route("/session/end", post(handlers::end_session))
        .route("/session/acknowledge", post(handlers::acknowledge_report))
        // Session queries
        .route("/session/status", get(handlers::get_status))
        .route("/session/report", get(handlers::get_report))
        // Resume management
        .route(
            "/resume",
            post(handlers::upload_resume).delete(handlers::delete_resume),
        )
        // Request logging + the permissive CORS the browser client expects
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
