use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use uuid::Uuid;

use crate::dto::attempt_dto::{AttemptDetail, AttemptResult, CompleteAttemptPayload};
use crate::middleware::auth::CurrentUser;
use crate::services::attempt_service::AttemptService;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_attempt(
    State(state): State<AppState>,
    current: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> crate::error::Result<Json<AttemptDetail>> {
    current.require()?;
    let Path(user_test_id) = path?;

    let svc = AttemptService::new(state.store.clone());
    let detail = svc.get_attempt(current.identity(), user_test_id).await?;
    Ok(Json(detail))
}

#[axum::debug_handler]
pub async fn complete_attempt(
    State(state): State<AppState>,
    current: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CompleteAttemptPayload>, JsonRejection>,
) -> crate::error::Result<Json<AttemptResult>> {
    current.require()?;
    let Path(user_test_id) = path?;
    let Json(payload) = payload?;

    let svc = AttemptService::new(state.store.clone());
    let result = svc
        .complete_attempt(current.identity(), user_test_id, payload)
        .await?;
    Ok(Json(result))
}
