pub mod health;
pub mod matches;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Scoring
        .route("/api/v1/matches/score", post(matches::handle_score))
        .route("/api/v1/matches/:id", get(matches::handle_get_match))
        // Lifecycle
        .route("/api/v1/matches/:id/confirm", post(matches::handle_confirm))
        .route("/api/v1/matches/:id/decline", post(matches::handle_decline))
        .route(
            "/api/v1/matches/:id/complete",
            post(matches::handle_complete),
        )
        // Feedback
        .route(
            "/api/v1/matches/:id/feedback",
            post(matches::handle_feedback),
        )
        .route(
            "/api/v1/jobs/:id/feedback",
            get(matches::handle_job_feedback),
        )
        .with_state(state)
}
