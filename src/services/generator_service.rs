use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::test_dto::{GenerateTestPayload, TestHandle};
use crate::error::{Error, Result};
use crate::models::identity::Identity;
use crate::models::question::{DifficultyFilter, Question, QuestionFilter};
use crate::models::test::{GenerationMode, NewTest};
use crate::models::test_question::TestQuestion;
use crate::models::user_test::NewUserTest;
use crate::store::Store;
use crate::utils::shuffle::QuestionShuffler;

#[derive(Clone)]
pub struct GeneratorService {
    store: Arc<dyn Store>,
    shuffler: Arc<dyn QuestionShuffler>,
}

impl GeneratorService {
    pub fn new(store: Arc<dyn Store>, shuffler: Arc<dyn QuestionShuffler>) -> Self {
        Self { store, shuffler }
    }

    /// Builds a test from the eligible pool and opens the requester's attempt on it.
    ///
    /// Writes happen in order test, attempt, question links, answer slots. If a
    /// later write fails, the rows created earlier in this call are deleted
    /// again before the error is returned.
    pub async fn generate(
        &self,
        requester: Option<&Identity>,
        payload: GenerateTestPayload,
    ) -> Result<TestHandle> {
        let requester = requester.ok_or(Error::Unauthenticated)?;

        payload
            .validate()
            .map_err(|e| Error::InvalidSpec(e.to_string()))?;
        let topics = payload
            .normalized_topics()
            .ok_or_else(|| Error::InvalidSpec("Topic labels must not be blank".to_string()))?;
        let requested = payload.total_questions as usize;

        let exam_id = self.resolve_exam(requester, payload.exam_id).await?;

        let filter = QuestionFilter {
            exam_id,
            topics: topics.clone(),
            difficulty: payload.difficulty,
        };
        let eligible = self.store.eligible_questions(&filter).await?;
        if eligible.len() < requested {
            warn!(
                user_id = %requester.user_id,
                %exam_id,
                available = eligible.len(),
                requested,
                "Not enough questions for test generation"
            );
            return Err(Error::InsufficientQuestions {
                available: eligible.len(),
                requested,
            });
        }

        let selected = select_questions(payload.mode, eligible, requested, self.shuffler.as_ref());
        let question_ids: Vec<Uuid> = selected.iter().map(|q| q.id).collect();

        let test = self
            .store
            .insert_test(NewTest {
                exam_id,
                name: payload.name.trim().to_string(),
                total_questions: payload.total_questions,
                duration_minutes: payload.duration_minutes,
                difficulty: payload.difficulty,
                topics,
                mode: payload.mode,
                created_by: requester.user_id,
            })
            .await?;

        let user_test = match self
            .store
            .insert_user_test(NewUserTest {
                user_id: requester.user_id,
                test_id: test.id,
                start_time: Utc::now(),
            })
            .await
        {
            Ok(user_test) => user_test,
            Err(e) => {
                self.compensate(None, test.id).await;
                return Err(e);
            }
        };

        let links = order_links(test.id, &question_ids);
        if let Err(e) = self.store.insert_test_questions(links).await {
            self.compensate(Some(user_test.id), test.id).await;
            return Err(e);
        }

        if let Err(e) = self
            .store
            .insert_user_test_questions(user_test.id, &question_ids)
            .await
        {
            self.compensate(Some(user_test.id), test.id).await;
            return Err(e);
        }

        info!(
            user_id = %requester.user_id,
            test_id = %test.id,
            user_test_id = %user_test.id,
            questions = question_ids.len(),
            mode = test.test_type.as_str(),
            "Generated test"
        );

        Ok(TestHandle {
            test,
            user_test,
            question_ids,
        })
    }

    /// Advisory count for form feedback. Not scoped to an exam or to active
    /// questions and never used to admit a generation request.
    pub async fn preview_available_count(
        &self,
        topics: &[String],
        difficulty: DifficultyFilter,
    ) -> Result<u64> {
        if topics.is_empty() {
            return Ok(0);
        }
        self.store.count_questions(topics, difficulty).await
    }

    async fn resolve_exam(&self, requester: &Identity, requested: Option<Uuid>) -> Result<Uuid> {
        let exam_id = match requested {
            Some(id) => id,
            None => self
                .store
                .get_profile(requester.user_id)
                .await?
                .and_then(|p| p.selected_exam_id)
                .ok_or_else(|| Error::InvalidSpec("No exam selected".to_string()))?,
        };

        match self.store.get_exam(exam_id).await? {
            Some(exam) if exam.is_active => Ok(exam.id),
            _ => Err(Error::NotFound(format!("Exam {} not found", exam_id))),
        }
    }

    async fn compensate(&self, user_test_id: Option<Uuid>, test_id: Uuid) {
        if let Some(user_test_id) = user_test_id {
            if let Err(e) = self.store.delete_user_test(user_test_id).await {
                error!(%user_test_id, error = %e, "Failed to roll back attempt after generation error");
            }
        }
        if let Err(e) = self.store.delete_test(test_id).await {
            error!(%test_id, error = %e, "Failed to roll back test after generation error");
        }
    }
}

/// Picks `count` questions from the pool. `Random` draws a uniform permutation
/// and keeps its prefix; `Custom` keeps the pool's natural order.
pub fn select_questions(
    mode: GenerationMode,
    mut pool: Vec<Question>,
    count: usize,
    shuffler: &dyn QuestionShuffler,
) -> Vec<Question> {
    if mode == GenerationMode::Random {
        shuffler.shuffle(&mut pool);
    }
    pool.truncate(count);
    pool
}

/// Links with contiguous 1-based order in the given sequence.
pub fn order_links(test_id: Uuid, question_ids: &[Uuid]) -> Vec<TestQuestion> {
    question_ids
        .iter()
        .enumerate()
        .map(|(idx, question_id)| TestQuestion {
            test_id,
            question_id: *question_id,
            question_order: (idx as i32) + 1,
        })
        .collect()
}
