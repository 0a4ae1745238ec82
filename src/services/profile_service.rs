use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::dto::profile_dto::{
    AvatarUpload, SelectExamPayload, SetAvatarPayload, UpdateProfilePayload,
};
use crate::error::{Error, Result};
use crate::models::identity::Identity;
use crate::models::profile::{Profile, ProfileChanges};
use crate::store::{ObjectStore, Store, UploadOptions};
use crate::utils::avatar::{avatar_extension, avatar_object_path, guess_content_type};

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
    avatar_bucket: String,
    max_avatar_bytes: usize,
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn Store>,
        objects: Arc<dyn ObjectStore>,
        avatar_bucket: String,
        max_avatar_bytes: usize,
    ) -> Self {
        Self {
            store,
            objects,
            avatar_bucket,
            max_avatar_bytes,
        }
    }

    pub async fn get_profile(&self, requester: Option<&Identity>) -> Result<Profile> {
        let requester = requester.ok_or(Error::Unauthenticated)?;
        self.store
            .get_profile(requester.user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Profile not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        requester: Option<&Identity>,
        payload: UpdateProfilePayload,
    ) -> Result<Profile> {
        let requester = requester.ok_or(Error::Unauthenticated)?;
        payload.validate()?;
        let name = payload.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidSpec("Name must not be blank".to_string()));
        }
        self.store
            .update_profile(
                requester.user_id,
                ProfileChanges {
                    name: Some(name),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn select_exam(
        &self,
        requester: Option<&Identity>,
        payload: SelectExamPayload,
    ) -> Result<Profile> {
        let requester = requester.ok_or(Error::Unauthenticated)?;
        match self.store.get_exam(payload.exam_id).await? {
            Some(exam) if exam.is_active => {}
            _ => {
                return Err(Error::NotFound(format!(
                    "Exam {} not found",
                    payload.exam_id
                )))
            }
        }

        let profile = self
            .store
            .update_profile(
                requester.user_id,
                ProfileChanges {
                    selected_exam_id: Some(payload.exam_id),
                    onboarding_completed: Some(payload.complete_onboarding),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %requester.user_id, exam_id = %payload.exam_id, "Exam selected");
        Ok(profile)
    }

    pub async fn skip_exam_selection(&self, requester: Option<&Identity>) -> Result<Profile> {
        let requester = requester.ok_or(Error::Unauthenticated)?;
        self.store
            .update_profile(
                requester.user_id,
                ProfileChanges {
                    onboarding_completed: Some(true),
                    ..Default::default()
                },
            )
            .await
    }

    /// Stores a gallery avatar picked by the user.
    pub async fn set_avatar_url(
        &self,
        requester: Option<&Identity>,
        payload: SetAvatarPayload,
    ) -> Result<Profile> {
        let requester = requester.ok_or(Error::Unauthenticated)?;
        payload.validate()?;
        let parsed = url::Url::parse(&payload.avatar_url)
            .map_err(|e| Error::InvalidSpec(format!("Invalid avatar URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidSpec(
                "Avatar URL must use http or https".to_string(),
            ));
        }

        self.store
            .update_profile(
                requester.user_id,
                ProfileChanges {
                    avatar_url: Some(parsed.to_string()),
                    ..Default::default()
                },
            )
            .await
    }

    /// Uploads an avatar image and points the profile at its public URL.
    pub async fn upload_avatar(
        &self,
        requester: Option<&Identity>,
        upload: AvatarUpload,
    ) -> Result<String> {
        let requester = requester.ok_or(Error::Unauthenticated)?;
        if upload.bytes.is_empty() {
            return Err(Error::InvalidSpec("Avatar file is empty".to_string()));
        }
        if upload.bytes.len() > self.max_avatar_bytes {
            return Err(Error::InvalidSpec(format!(
                "Avatar exceeds the {} byte limit",
                self.max_avatar_bytes
            )));
        }
        let extension = avatar_extension(&upload.file_name).ok_or_else(|| {
            Error::InvalidSpec(format!(
                "Unsupported avatar file '{}'",
                upload.file_name
            ))
        })?;

        let path = avatar_object_path(requester.user_id, &extension);
        let content_type = upload
            .content_type
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| guess_content_type(&extension).to_string());

        self.objects
            .upload(
                &self.avatar_bucket,
                &path,
                upload.bytes,
                UploadOptions {
                    content_type: Some(content_type),
                    upsert: true,
                },
            )
            .await?;
        let public_url = self.objects.public_url(&self.avatar_bucket, &path)?;

        self.store
            .update_profile(
                requester.user_id,
                ProfileChanges {
                    avatar_url: Some(public_url.clone()),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %requester.user_id, path = %path, "Avatar uploaded");
        Ok(public_url)
    }
}
