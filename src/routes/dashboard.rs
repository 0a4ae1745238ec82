use axum::{extract::State, Json};

use crate::dto::dashboard_dto::DashboardSummary;
use crate::middleware::auth::CurrentUser;
use crate::services::dashboard_service::DashboardService;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> crate::error::Result<Json<DashboardSummary>> {
    let svc = DashboardService::new(state.store.clone());
    Ok(Json(svc.summary(current.identity()).await?))
}
