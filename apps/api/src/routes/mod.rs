pub mod health;
pub mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::form::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(page::index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/modes", get(handlers::handle_list_modes))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/job-description",
            put(handlers::handle_update_job_description),
        )
        .route(
            "/api/v1/sessions/:id/resume",
            post(handlers::handle_upload_resume),
        )
        .route(
            "/api/v1/sessions/:id/analyze",
            post(handlers::handle_analyze),
        )
        .route("/api/v1/sessions/:id/clear", post(handlers::handle_clear))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
