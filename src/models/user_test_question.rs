use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

/// Answer slot of one question inside an attempt.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserTestQuestion {
    pub id: Uuid,
    pub user_test_id: Uuid,
    pub question_id: Uuid,
    pub selected_answer: Option<String>,
    pub marks_awarded: i32,
    pub time_spent: i32,
}

/// Answer slot joined with the question's correct answer, used for grading.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerSlot {
    pub id: Uuid,
    pub question_id: Uuid,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub slot_id: Uuid,
    pub selected_answer: Option<String>,
    pub marks_awarded: i32,
    pub time_spent: i32,
}

/// Answer slot joined with its question and its position in the test.
#[derive(Debug, Clone, FromRow)]
pub struct AttemptQuestion {
    pub question_order: i32,
    pub question_id: Uuid,
    pub question_text: String,
    pub choices: Json<Vec<String>>,
    pub topic: Option<String>,
    pub difficulty: String,
    pub correct_answer: String,
    pub selected_answer: Option<String>,
    pub marks_awarded: i32,
    pub time_spent: i32,
}
