pub mod attempts;
pub mod dashboard;
pub mod exams;
pub mod generation;
pub mod health;
pub mod profile;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Multipart overhead allowed on top of the avatar size limit.
const UPLOAD_SLACK_BYTES: usize = 64 * 1024;

pub fn api_router(state: AppState) -> Router {
    let body_limit = state.max_avatar_bytes + UPLOAD_SLACK_BYTES;

    let catalogue = Router::new()
        .route("/api/exams", get(exams::list_exams))
        .route("/api/exams/:id/topics", get(exams::list_topics))
        .route(
            "/api/questions/available-count",
            get(generation::available_count),
        );

    let practice = Router::new()
        .route("/api/tests/generate", post(generation::generate_test))
        .route("/api/user-tests/:id", get(attempts::get_attempt))
        .route(
            "/api/user-tests/:id/complete",
            post(attempts::complete_attempt),
        )
        .route("/api/dashboard", get(dashboard::get_dashboard));

    let profile = Router::new()
        .route(
            "/api/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .route("/api/profile/exam", put(profile::select_exam))
        .route(
            "/api/profile/exam/skip",
            post(profile::skip_exam_selection),
        )
        .route("/api/profile/avatar", put(profile::set_avatar))
        .route(
            "/api/profile/avatar/upload",
            post(profile::upload_avatar),
        );

    Router::new()
        .route("/health", get(health::health))
        .merge(catalogue)
        .merge(practice)
        .merge(profile)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
}
