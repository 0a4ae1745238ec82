#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::types::Json;
use uuid::Uuid;

use testprep_backend::error::{Error, Result};
use testprep_backend::middleware::auth::{Claims, JwtAuth};
use testprep_backend::models::{
    attempt_summary::AttemptSummary,
    exam::Exam,
    identity::Identity,
    profile::{Profile, ProfileChanges},
    question::{DifficultyFilter, Question, QuestionFilter},
    test::{NewTest, Test},
    test_question::TestQuestion,
    user_test::{NewUserTest, UserTest, STATUS_COMPLETED, STATUS_IN_PROGRESS},
    user_test_question::{AnswerSlot, AttemptQuestion, GradedAnswer, UserTestQuestion},
};
use testprep_backend::store::{ObjectStore, Store};
use testprep_backend::utils::shuffle::{QuestionShuffler, SeededShuffler};
use testprep_backend::AppState;

pub const JWT_SECRET: &str = "test_secret_key";

#[derive(Default)]
pub struct Tables {
    pub exams: Vec<Exam>,
    pub profiles: Vec<Profile>,
    pub questions: Vec<Question>,
    pub tests: Vec<Test>,
    pub test_questions: Vec<TestQuestion>,
    pub user_tests: Vec<UserTest>,
    pub user_test_questions: Vec<UserTestQuestion>,
}

/// In-memory `Store` that records every call and can fail a named operation.
#[derive(Default)]
pub struct MemoryStore {
    pub tables: Mutex<Tables>,
    pub calls: Mutex<Vec<&'static str>>,
    pub fail_on: Mutex<Option<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, op: &'static str) {
        *self.fail_on.lock().unwrap() = Some(op);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn add_exam(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().exams.push(Exam {
            id,
            name: name.to_string(),
            description: None,
            is_active: true,
            created_at: Some(Utc::now()),
        });
        id
    }

    pub fn add_profile(&self, user_id: Uuid, selected_exam_id: Option<Uuid>) {
        self.tables.lock().unwrap().profiles.push(Profile {
            id: user_id,
            name: Some("Student".to_string()),
            email: Some("student@example.com".to_string()),
            selected_exam_id,
            avatar_url: None,
            onboarding_completed: selected_exam_id.is_some(),
            total_xp: 40,
            updated_at: None,
        });
    }

    /// Adds `count` active questions; returns their ids in insertion order.
    pub fn add_questions(
        &self,
        exam_id: Uuid,
        topic: &str,
        difficulty: &str,
        count: usize,
    ) -> Vec<Uuid> {
        let mut tables = self.tables.lock().unwrap();
        let base = Utc::now() - Duration::days(1);
        (0..count)
            .map(|i| {
                let offset = tables.questions.len() as i64;
                let id = Uuid::new_v4();
                tables.questions.push(Question {
                    id,
                    exam_id,
                    question_text: format!("{} question {}", topic, i + 1),
                    choices: Json(vec!["A".into(), "B".into(), "C".into(), "D".into()]),
                    correct_answer: "A".to_string(),
                    difficulty: difficulty.to_string(),
                    topic: Some(topic.to_string()),
                    is_active: true,
                    created_at: Some(base + Duration::seconds(offset)),
                });
                id
            })
            .collect()
    }

    pub fn deactivate_question(&self, id: Uuid) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(q) = tables.questions.iter_mut().find(|q| q.id == id) {
            q.is_active = false;
        }
    }

    pub fn write_counts(&self) -> (usize, usize, usize, usize) {
        let t = self.tables.lock().unwrap();
        (
            t.tests.len(),
            t.user_tests.len(),
            t.test_questions.len(),
            t.user_test_questions.len(),
        )
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(op);
        if *self.fail_on.lock().unwrap() == Some(op) {
            return Err(Error::Store(format!("injected failure in {}", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_active_exams(&self) -> Result<Vec<Exam>> {
        self.enter("list_active_exams")?;
        let tables = self.tables.lock().unwrap();
        let mut exams: Vec<Exam> = tables.exams.iter().filter(|e| e.is_active).cloned().collect();
        exams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(exams)
    }

    async fn get_exam(&self, exam_id: Uuid) -> Result<Option<Exam>> {
        self.enter("get_exam")?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.exams.iter().find(|e| e.id == exam_id).cloned())
    }

    async fn list_topics(&self, exam_id: Uuid) -> Result<Vec<String>> {
        self.enter("list_topics")?;
        let tables = self.tables.lock().unwrap();
        let mut topics: Vec<String> = tables
            .questions
            .iter()
            .filter(|q| q.exam_id == exam_id && q.is_active)
            .filter_map(|q| q.topic.clone())
            .collect();
        topics.sort();
        topics.dedup();
        Ok(topics)
    }

    async fn eligible_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        self.enter("eligible_questions")?;
        let tables = self.tables.lock().unwrap();
        let mut pool: Vec<Question> = tables
            .questions
            .iter()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect();
        pool.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(pool)
    }

    async fn count_questions(
        &self,
        topics: &[String],
        difficulty: DifficultyFilter,
    ) -> Result<u64> {
        self.enter("count_questions")?;
        let tables = self.tables.lock().unwrap();
        let count = tables
            .questions
            .iter()
            .filter(|q| q.topic.as_ref().is_some_and(|t| topics.contains(t)))
            .filter(|q| difficulty.matches(&q.difficulty))
            .count();
        Ok(count as u64)
    }

    async fn insert_test(&self, test: NewTest) -> Result<Test> {
        self.enter("insert_test")?;
        let created = Test {
            id: Uuid::new_v4(),
            exam_id: test.exam_id,
            name: test.name,
            total_questions: test.total_questions,
            duration_minutes: test.duration_minutes,
            difficulty: test.difficulty.as_str().to_string(),
            topics: test.topics,
            test_type: test.mode.test_type().to_string(),
            created_by: test.created_by,
            is_active: true,
            created_at: Some(Utc::now()),
        };
        self.tables.lock().unwrap().tests.push(created.clone());
        Ok(created)
    }

    async fn get_test(&self, test_id: Uuid) -> Result<Option<Test>> {
        self.enter("get_test")?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.tests.iter().find(|t| t.id == test_id).cloned())
    }

    async fn insert_user_test(&self, user_test: NewUserTest) -> Result<UserTest> {
        self.enter("insert_user_test")?;
        let created = UserTest {
            id: Uuid::new_v4(),
            user_id: user_test.user_id,
            test_id: user_test.test_id,
            status: STATUS_IN_PROGRESS.to_string(),
            start_time: user_test.start_time,
            end_time: None,
            score: None,
        };
        self.tables.lock().unwrap().user_tests.push(created.clone());
        Ok(created)
    }

    async fn insert_test_questions(&self, links: Vec<TestQuestion>) -> Result<Vec<TestQuestion>> {
        self.enter("insert_test_questions")?;
        self.tables
            .lock()
            .unwrap()
            .test_questions
            .extend(links.iter().cloned());
        Ok(links)
    }

    async fn insert_user_test_questions(
        &self,
        user_test_id: Uuid,
        question_ids: &[Uuid],
    ) -> Result<Vec<UserTestQuestion>> {
        self.enter("insert_user_test_questions")?;
        let rows: Vec<UserTestQuestion> = question_ids
            .iter()
            .map(|question_id| UserTestQuestion {
                id: Uuid::new_v4(),
                user_test_id,
                question_id: *question_id,
                selected_answer: None,
                marks_awarded: 0,
                time_spent: 0,
            })
            .collect();
        self.tables
            .lock()
            .unwrap()
            .user_test_questions
            .extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn delete_test(&self, test_id: Uuid) -> Result<()> {
        self.enter("delete_test")?;
        let mut tables = self.tables.lock().unwrap();
        tables.test_questions.retain(|l| l.test_id != test_id);
        tables.tests.retain(|t| t.id != test_id);
        Ok(())
    }

    async fn delete_user_test(&self, user_test_id: Uuid) -> Result<()> {
        self.enter("delete_user_test")?;
        let mut tables = self.tables.lock().unwrap();
        tables
            .user_test_questions
            .retain(|s| s.user_test_id != user_test_id);
        tables.user_tests.retain(|u| u.id != user_test_id);
        Ok(())
    }

    async fn get_user_test(&self, user_test_id: Uuid) -> Result<Option<UserTest>> {
        self.enter("get_user_test")?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.user_tests.iter().find(|u| u.id == user_test_id).cloned())
    }

    async fn answer_slots(&self, user_test_id: Uuid) -> Result<Vec<AnswerSlot>> {
        self.enter("answer_slots")?;
        let tables = self.tables.lock().unwrap();
        let slots = tables
            .user_test_questions
            .iter()
            .filter(|s| s.user_test_id == user_test_id)
            .filter_map(|s| {
                let question = tables.questions.iter().find(|q| q.id == s.question_id)?;
                Some(AnswerSlot {
                    id: s.id,
                    question_id: s.question_id,
                    correct_answer: question.correct_answer.clone(),
                })
            })
            .collect();
        Ok(slots)
    }

    async fn attempt_questions(&self, user_test_id: Uuid) -> Result<Vec<AttemptQuestion>> {
        self.enter("attempt_questions")?;
        let tables = self.tables.lock().unwrap();
        let Some(user_test) = tables.user_tests.iter().find(|u| u.id == user_test_id) else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<AttemptQuestion> = tables
            .user_test_questions
            .iter()
            .filter(|s| s.user_test_id == user_test_id)
            .filter_map(|s| {
                let link = tables
                    .test_questions
                    .iter()
                    .find(|l| l.test_id == user_test.test_id && l.question_id == s.question_id)?;
                let q = tables.questions.iter().find(|q| q.id == s.question_id)?;
                Some(AttemptQuestion {
                    question_order: link.question_order,
                    question_id: q.id,
                    question_text: q.question_text.clone(),
                    choices: q.choices.clone(),
                    topic: q.topic.clone(),
                    difficulty: q.difficulty.clone(),
                    correct_answer: q.correct_answer.clone(),
                    selected_answer: s.selected_answer.clone(),
                    marks_awarded: s.marks_awarded,
                    time_spent: s.time_spent,
                })
            })
            .collect();
        rows.sort_by_key(|r| r.question_order);
        Ok(rows)
    }

    async fn complete_user_test(
        &self,
        user_test_id: Uuid,
        graded: Vec<GradedAnswer>,
        score: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<UserTest> {
        self.enter("complete_user_test")?;
        let mut tables = self.tables.lock().unwrap();
        let Some(idx) = tables
            .user_tests
            .iter()
            .position(|u| u.id == user_test_id && u.status == STATUS_IN_PROGRESS)
        else {
            return Err(Error::Conflict("Attempt is not in progress".to_string()));
        };
        for answer in graded {
            if let Some(slot) = tables
                .user_test_questions
                .iter_mut()
                .find(|s| s.id == answer.slot_id && s.user_test_id == user_test_id)
            {
                slot.selected_answer = answer.selected_answer;
                slot.marks_awarded = answer.marks_awarded;
                slot.time_spent = answer.time_spent;
            }
        }
        let user_test = &mut tables.user_tests[idx];
        user_test.status = STATUS_COMPLETED.to_string();
        user_test.end_time = Some(completed_at);
        user_test.score = Some(score);
        Ok(user_test.clone())
    }

    async fn list_attempts(&self, user_id: Uuid, exam_id: Uuid) -> Result<Vec<AttemptSummary>> {
        self.enter("list_attempts")?;
        let tables = self.tables.lock().unwrap();
        let mut attempts: Vec<AttemptSummary> = tables
            .user_tests
            .iter()
            .filter(|u| u.user_id == user_id)
            .filter_map(|u| {
                let test = tables
                    .tests
                    .iter()
                    .find(|t| t.id == u.test_id && t.exam_id == exam_id)?;
                Some(AttemptSummary {
                    user_test_id: u.id,
                    test_id: test.id,
                    test_name: test.name.clone(),
                    total_questions: test.total_questions,
                    duration_minutes: test.duration_minutes,
                    status: u.status.clone(),
                    start_time: u.start_time,
                    end_time: u.end_time,
                    score: u.score,
                })
            })
            .collect();
        attempts.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(attempts)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        self.enter("get_profile")?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.profiles.iter().find(|p| p.id == user_id).cloned())
    }

    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> Result<Profile> {
        self.enter("update_profile")?;
        let mut tables = self.tables.lock().unwrap();
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == user_id)
            .ok_or_else(|| Error::NotFound("Resource not found".to_string()))?;
        if let Some(name) = changes.name {
            profile.name = Some(name);
        }
        if let Some(exam_id) = changes.selected_exam_id {
            profile.selected_exam_id = Some(exam_id);
        }
        if let Some(url) = changes.avatar_url {
            profile.avatar_url = Some(url);
        }
        if let Some(done) = changes.onboarding_completed {
            profile.onboarding_completed = done;
        }
        profile.updated_at = Some(Utc::now());
        Ok(profile.clone())
    }
}

pub fn identity(user_id: Uuid) -> Identity {
    Identity {
        user_id,
        email: Some("student@example.com".to_string()),
        role: Some("authenticated".to_string()),
    }
}

pub fn bearer(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        email: Some("student@example.com".to_string()),
        role: Some("authenticated".to_string()),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("sign token");
    format!("Bearer {}", token)
}

pub fn app_state(store: Arc<MemoryStore>, objects: Arc<dyn ObjectStore>) -> AppState {
    let shuffler: Arc<dyn QuestionShuffler> = Arc::new(SeededShuffler::new(11));
    AppState {
        store,
        objects,
        shuffler,
        auth: JwtAuth::new(JWT_SECRET),
        avatar_bucket: "avatars".to_string(),
        max_avatar_bytes: 1024,
    }
}
