use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A row of the `questions` table. Read-only from this service's point of view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub question_text: String,
    pub choices: Json<Vec<String>>,
    pub correct_answer: String,
    /// Stored as text: `easy`, `medium` or `hard`.
    pub difficulty: String,
    pub topic: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Request-side difficulty. `Mixed` disables the difficulty filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyFilter {
    Easy,
    Medium,
    Hard,
    #[default]
    Mixed,
}

impl DifficultyFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyFilter::Easy => "easy",
            DifficultyFilter::Medium => "medium",
            DifficultyFilter::Hard => "hard",
            DifficultyFilter::Mixed => "mixed",
        }
    }

    /// The exact difficulty to filter on, or `None` for `Mixed`.
    pub fn exact(&self) -> Option<Difficulty> {
        match self {
            DifficultyFilter::Easy => Some(Difficulty::Easy),
            DifficultyFilter::Medium => Some(Difficulty::Medium),
            DifficultyFilter::Hard => Some(Difficulty::Hard),
            DifficultyFilter::Mixed => None,
        }
    }

    pub fn matches(&self, difficulty: &str) -> bool {
        match self.exact() {
            Some(d) => d.as_str().eq_ignore_ascii_case(difficulty),
            None => true,
        }
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyFilter::Easy),
            "medium" => Ok(DifficultyFilter::Medium),
            "hard" => Ok(DifficultyFilter::Hard),
            "mixed" | "" => Ok(DifficultyFilter::Mixed),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Filter describing the eligible pool for a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFilter {
    pub exam_id: Uuid,
    pub topics: Vec<String>,
    pub difficulty: DifficultyFilter,
}

impl QuestionFilter {
    /// Active, same exam, topic in the requested set, difficulty unless mixed.
    pub fn matches(&self, question: &Question) -> bool {
        question.is_active
            && question.exam_id == self.exam_id
            && question
                .topic
                .as_ref()
                .is_some_and(|t| self.topics.iter().any(|wanted| wanted == t))
            && self.difficulty.matches(&question.difficulty)
    }
}
