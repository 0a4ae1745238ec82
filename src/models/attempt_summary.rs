use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Attempt row joined with its test.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttemptSummary {
    pub user_test_id: Uuid,
    pub test_id: Uuid,
    pub test_name: String,
    pub total_questions: i32,
    pub duration_minutes: i32,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<i32>,
}
