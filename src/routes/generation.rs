use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::dto::test_dto::{AvailableCountQuery, AvailableCountResponse, GenerateTestPayload};
use crate::error::Error;
use crate::middleware::auth::CurrentUser;
use crate::models::question::DifficultyFilter;
use crate::services::generator_service::GeneratorService;
use crate::AppState;

#[axum::debug_handler]
pub async fn generate_test(
    State(state): State<AppState>,
    current: CurrentUser,
    payload: Result<Json<GenerateTestPayload>, JsonRejection>,
) -> crate::error::Result<Response> {
    current.require()?;
    let Json(payload) = payload?;
    let svc = GeneratorService::new(state.store.clone(), state.shuffler.clone());
    let handle = svc.generate(current.identity(), payload).await?;
    Ok((StatusCode::CREATED, Json(handle)).into_response())
}

#[axum::debug_handler]
pub async fn available_count(
    State(state): State<AppState>,
    Query(query): Query<AvailableCountQuery>,
) -> crate::error::Result<Json<AvailableCountResponse>> {
    let difficulty = query
        .difficulty
        .as_deref()
        .map(str::parse::<DifficultyFilter>)
        .transpose()
        .map_err(Error::InvalidSpec)?
        .unwrap_or_default();

    let svc = GeneratorService::new(state.store.clone(), state.shuffler.clone());
    let available = svc
        .preview_available_count(&query.topic_list(), difficulty)
        .await?;
    Ok(Json(AvailableCountResponse { available }))
}
