pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route(
            "/api/v1/openings/:opening_id/candidates",
            post(handlers::handle_upload)
                .get(handlers::handle_list_candidates)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/api/v1/candidates/:id",
            get(handlers::handle_get_candidate),
        )
        .with_state(state)
}
