use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::test::Test;
use crate::models::user_test::UserTest;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub answer: Option<String>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub time_spent_seconds: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompleteAttemptPayload {
    #[validate(nested)]
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub user_test_id: Uuid,
    pub status: String,
    pub total_questions: usize,
    pub attempted: usize,
    pub correct: usize,
    pub wrong: usize,
    pub score: i32,
    pub percentage: f64,
}

/// One question of an attempt as shown to its owner. Grading fields stay
/// empty until the attempt is completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptQuestionView {
    pub question_order: i32,
    pub question_id: Uuid,
    pub question_text: String,
    pub choices: Vec<String>,
    pub topic: Option<String>,
    pub difficulty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks_awarded: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptDetail {
    pub user_test: UserTest,
    pub test: Test,
    pub questions: Vec<AttemptQuestionView>,
}
