use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::attempt_dto::{
    AttemptDetail, AttemptQuestionView, AttemptResult, CompleteAttemptPayload, SubmittedAnswer,
};
use crate::error::{Error, Result};
use crate::models::identity::Identity;
use crate::models::user_test::{UserTest, UserTestStatus};
use crate::models::user_test_question::{AnswerSlot, AttemptQuestion, GradedAnswer};
use crate::store::Store;

#[derive(Clone)]
pub struct AttemptService {
    store: Arc<dyn Store>,
}

impl AttemptService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The attempt with its questions in test order. Correct answers and
    /// grading stay hidden while the attempt is in progress.
    pub async fn get_attempt(
        &self,
        requester: Option<&Identity>,
        user_test_id: Uuid,
    ) -> Result<AttemptDetail> {
        let requester = requester.ok_or(Error::Unauthenticated)?;
        let user_test = self.owned_attempt(requester, user_test_id).await?;
        let reveal = user_test.status()? == UserTestStatus::Completed;

        let test = self
            .store
            .get_test(user_test.test_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Test {} not found", user_test.test_id)))?;
        let questions = self
            .store
            .attempt_questions(user_test.id)
            .await?
            .into_iter()
            .map(|row| question_view(row, reveal))
            .collect();

        Ok(AttemptDetail {
            user_test,
            test,
            questions,
        })
    }

    /// Grades the submitted answers and closes the attempt.
    pub async fn complete_attempt(
        &self,
        requester: Option<&Identity>,
        user_test_id: Uuid,
        payload: CompleteAttemptPayload,
    ) -> Result<AttemptResult> {
        let requester = requester.ok_or(Error::Unauthenticated)?;
        payload.validate()?;

        let user_test = self.owned_attempt(requester, user_test_id).await?;
        let next = user_test.status()?.transition_to(UserTestStatus::Completed)?;

        let slots = self.store.answer_slots(user_test.id).await?;
        let graded = grade_answers(&slots, &payload.answers)?;

        let total = slots.len();
        let attempted = graded.iter().filter(|g| g.selected_answer.is_some()).count();
        let correct = graded.iter().filter(|g| g.marks_awarded > 0).count();
        let score: i32 = graded.iter().map(|g| g.marks_awarded).sum();

        let updated = self
            .store
            .complete_user_test(user_test.id, graded, score, Utc::now())
            .await?;

        info!(
            user_id = %requester.user_id,
            user_test_id = %updated.id,
            score,
            total,
            "Attempt completed"
        );

        Ok(AttemptResult {
            user_test_id: updated.id,
            status: next.as_str().to_string(),
            total_questions: total,
            attempted,
            correct,
            wrong: attempted - correct,
            score,
            percentage: percentage(score, total),
        })
    }

    /// Attempts of other users look missing.
    async fn owned_attempt(&self, requester: &Identity, user_test_id: Uuid) -> Result<UserTest> {
        self.store
            .get_user_test(user_test_id)
            .await?
            .filter(|ut| ut.user_id == requester.user_id)
            .ok_or_else(|| Error::NotFound(format!("Attempt {} not found", user_test_id)))
    }
}

pub fn question_view(row: AttemptQuestion, reveal: bool) -> AttemptQuestionView {
    AttemptQuestionView {
        question_order: row.question_order,
        question_id: row.question_id,
        question_text: row.question_text,
        choices: row.choices.0,
        topic: row.topic,
        difficulty: row.difficulty,
        selected_answer: row.selected_answer.filter(|_| reveal),
        marks_awarded: reveal.then_some(row.marks_awarded),
        time_spent: reveal.then_some(row.time_spent),
        correct_answer: reveal.then_some(row.correct_answer),
    }
}

/// One graded row per answer slot. A submitted answer earns one mark when it
/// equals the correct answer after trimming.
pub fn grade_answers(slots: &[AnswerSlot], answers: &[SubmittedAnswer]) -> Result<Vec<GradedAnswer>> {
    let mut by_question: HashMap<Uuid, &SubmittedAnswer> = HashMap::with_capacity(answers.len());
    for answer in answers {
        if !slots.iter().any(|s| s.question_id == answer.question_id) {
            return Err(Error::InvalidSpec(format!(
                "Question {} is not part of this attempt",
                answer.question_id
            )));
        }
        match by_question.entry(answer.question_id) {
            Entry::Occupied(_) => {
                return Err(Error::InvalidSpec(format!(
                    "Question {} was answered more than once",
                    answer.question_id
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(answer);
            }
        }
    }

    let graded = slots
        .iter()
        .map(|slot| {
            let submitted = by_question.get(&slot.question_id);
            let selected_answer = submitted
                .and_then(|a| a.answer.as_deref())
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string);
            let marks_awarded = match &selected_answer {
                Some(answer) if answer == slot.correct_answer.trim() => 1,
                _ => 0,
            };
            GradedAnswer {
                slot_id: slot.id,
                selected_answer,
                marks_awarded,
                time_spent: submitted.map(|a| a.time_spent_seconds).unwrap_or(0),
            }
        })
        .collect();
    Ok(graded)
}

pub fn percentage(score: i32, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = f64::from(score) / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}
