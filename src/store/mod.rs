//! Seams to the external managed services.
//!
//! `Store` is the relational store scoped by the caller's identity, `ObjectStore`
//! the file storage used for avatars. Services only talk to these traits.

mod object_store;
mod pg;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    attempt_summary::AttemptSummary,
    exam::Exam,
    profile::{Profile, ProfileChanges},
    question::{DifficultyFilter, Question, QuestionFilter},
    test::{NewTest, Test},
    test_question::TestQuestion,
    user_test::{NewUserTest, UserTest},
    user_test_question::{AnswerSlot, AttemptQuestion, GradedAnswer, UserTestQuestion},
};

pub use object_store::StorageClient;
pub use pg::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_active_exams(&self) -> Result<Vec<Exam>>;

    async fn get_exam(&self, exam_id: Uuid) -> Result<Option<Exam>>;

    /// Distinct topics of the exam's active questions, sorted.
    async fn list_topics(&self, exam_id: Uuid) -> Result<Vec<String>>;

    /// Eligible pool in natural order (creation time, then id).
    async fn eligible_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>>;

    /// Advisory count without exam or active scoping.
    async fn count_questions(&self, topics: &[String], difficulty: DifficultyFilter)
        -> Result<u64>;

    async fn insert_test(&self, test: NewTest) -> Result<Test>;

    async fn get_test(&self, test_id: Uuid) -> Result<Option<Test>>;

    async fn insert_user_test(&self, user_test: NewUserTest) -> Result<UserTest>;

    async fn insert_test_questions(&self, links: Vec<TestQuestion>) -> Result<Vec<TestQuestion>>;

    async fn insert_user_test_questions(
        &self,
        user_test_id: Uuid,
        question_ids: &[Uuid],
    ) -> Result<Vec<UserTestQuestion>>;

    /// Removes the test together with its question links.
    async fn delete_test(&self, test_id: Uuid) -> Result<()>;

    /// Removes the attempt together with its answer slots.
    async fn delete_user_test(&self, user_test_id: Uuid) -> Result<()>;

    async fn get_user_test(&self, user_test_id: Uuid) -> Result<Option<UserTest>>;

    async fn answer_slots(&self, user_test_id: Uuid) -> Result<Vec<AnswerSlot>>;

    /// Questions of the attempt with their slots, by `question_order`.
    async fn attempt_questions(&self, user_test_id: Uuid) -> Result<Vec<AttemptQuestion>>;

    /// Writes graded slots and moves the attempt to `completed`.
    async fn complete_user_test(
        &self,
        user_test_id: Uuid,
        graded: Vec<GradedAnswer>,
        score: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<UserTest>;

    async fn list_attempts(&self, user_id: Uuid, exam_id: Uuid) -> Result<Vec<AttemptSummary>>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;

    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> Result<Profile>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: Option<String>,
    pub upsert: bool,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        options: UploadOptions,
    ) -> Result<()>;

    fn public_url(&self, bucket: &str, path: &str) -> Result<String>;
}
