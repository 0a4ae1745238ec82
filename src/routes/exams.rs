use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::models::exam::Exam;
use crate::services::exam_service::ExamService;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_exams(State(state): State<AppState>) -> crate::error::Result<Json<Vec<Exam>>> {
    let svc = ExamService::new(state.store.clone());
    Ok(Json(svc.list_exams().await?))
}

#[axum::debug_handler]
pub async fn list_topics(
    State(state): State<AppState>,
    Path(exam_id): Path<Uuid>,
) -> crate::error::Result<Json<Vec<String>>> {
    let svc = ExamService::new(state.store.clone());
    Ok(Json(svc.list_topics(exam_id).await?))
}
