use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub selected_exam_id: Option<Uuid>,
    pub avatar_url: Option<String>,
    pub onboarding_completed: bool,
    pub total_xp: i32,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub selected_exam_id: Option<Uuid>,
    pub avatar_url: Option<String>,
    pub onboarding_completed: Option<bool>,
}
