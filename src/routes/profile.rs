use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};

use crate::dto::profile_dto::{
    AvatarResponse, AvatarUpload, SelectExamPayload, SetAvatarPayload, UpdateProfilePayload,
};
use crate::error::Error;
use crate::middleware::auth::CurrentUser;
use crate::models::profile::Profile;
use crate::services::profile_service::ProfileService;
use crate::AppState;

fn profile_service(state: &AppState) -> ProfileService {
    ProfileService::new(
        state.store.clone(),
        state.objects.clone(),
        state.avatar_bucket.clone(),
        state.max_avatar_bytes,
    )
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> crate::error::Result<Json<Profile>> {
    let profile = profile_service(&state).get_profile(current.identity()).await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    payload: Result<Json<UpdateProfilePayload>, JsonRejection>,
) -> crate::error::Result<Json<Profile>> {
    current.require()?;
    let Json(payload) = payload?;
    let profile = profile_service(&state)
        .update_profile(current.identity(), payload)
        .await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn select_exam(
    State(state): State<AppState>,
    current: CurrentUser,
    payload: Result<Json<SelectExamPayload>, JsonRejection>,
) -> crate::error::Result<Json<Profile>> {
    current.require()?;
    let Json(payload) = payload?;
    let profile = profile_service(&state)
        .select_exam(current.identity(), payload)
        .await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn skip_exam_selection(
    State(state): State<AppState>,
    current: CurrentUser,
) -> crate::error::Result<Json<Profile>> {
    let profile = profile_service(&state)
        .skip_exam_selection(current.identity())
        .await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn set_avatar(
    State(state): State<AppState>,
    current: CurrentUser,
    payload: Result<Json<SetAvatarPayload>, JsonRejection>,
) -> crate::error::Result<Json<Profile>> {
    current.require()?;
    let Json(payload) = payload?;
    let profile = profile_service(&state)
        .set_avatar_url(current.identity(), payload)
        .await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn upload_avatar(
    State(state): State<AppState>,
    current: CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> crate::error::Result<Json<AvatarResponse>> {
    // Reject before reading the body when nobody is signed in.
    current.require()?;
    let mut multipart = multipart?;

    let mut upload: Option<AvatarUpload> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        upload = Some(AvatarUpload {
            file_name,
            content_type,
            bytes,
        });
        break;
    }
    let upload =
        upload.ok_or_else(|| Error::InvalidSpec("Missing multipart field 'file'".to_string()))?;

    let avatar_url = profile_service(&state)
        .upload_avatar(current.identity(), upload)
        .await?;
    Ok(Json(AvatarResponse { avatar_url }))
}
