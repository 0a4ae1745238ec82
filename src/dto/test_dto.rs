use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::DifficultyFilter;
use crate::models::test::{GenerationMode, Test};
use crate::models::user_test::UserTest;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateTestPayload {
    /// Falls back to the requester's selected exam.
    pub exam_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1))]
    pub duration_minutes: i32,
    #[validate(range(min = 1))]
    pub total_questions: i32,
    #[validate(length(min = 1))]
    pub topics: Vec<String>,
    #[serde(default)]
    pub difficulty: DifficultyFilter,
    pub mode: GenerationMode,
}

impl GenerateTestPayload {
    /// Trimmed, de-duplicated topics in request order. `None` if any label is blank.
    pub fn normalized_topics(&self) -> Option<Vec<String>> {
        let mut topics: Vec<String> = Vec::with_capacity(self.topics.len());
        for raw in &self.topics {
            let topic = raw.trim();
            if topic.is_empty() {
                return None;
            }
            if !topics.iter().any(|t| t == topic) {
                topics.push(topic.to_string());
            }
        }
        Some(topics)
    }
}

/// What a successful generation hands back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestHandle {
    pub test: Test,
    pub user_test: UserTest,
    /// Question ids in presentation order.
    pub question_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableCountQuery {
    /// Comma separated topic labels.
    pub topics: Option<String>,
    pub difficulty: Option<String>,
}

impl AvailableCountQuery {
    pub fn topic_list(&self) -> Vec<String> {
        self.topics
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableCountResponse {
    pub available: u64,
}
