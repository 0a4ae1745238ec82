use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptOverview {
    pub user_test_id: Uuid,
    pub test_id: Uuid,
    pub test_name: String,
    pub total_questions: i32,
    pub duration_minutes: i32,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<i32>,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub exam_id: Uuid,
    pub tests_total: usize,
    pub tests_completed: usize,
    pub average_score: f64,
    pub best_score: f64,
    pub total_xp: i32,
    pub recent: Vec<AttemptOverview>,
    pub in_progress: Vec<AttemptOverview>,
}
