use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Links a question to a test at a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TestQuestion {
    pub test_id: Uuid,
    pub question_id: Uuid,
    pub question_order: i32,
}
