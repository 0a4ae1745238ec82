use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    attempt_summary::AttemptSummary,
    exam::Exam,
    profile::{Profile, ProfileChanges},
    question::{DifficultyFilter, Question, QuestionFilter},
    test::{NewTest, Test},
    test_question::TestQuestion,
    user_test::{NewUserTest, UserTest, STATUS_COMPLETED, STATUS_IN_PROGRESS},
    user_test_question::{AnswerSlot, AttemptQuestion, GradedAnswer, UserTestQuestion},
};
use crate::store::Store;

const QUESTION_COLUMNS: &str = "id, exam_id, question_text, choices, correct_answer, difficulty, topic, is_active, created_at";
const TEST_COLUMNS: &str = "id, exam_id, name, total_questions, duration_minutes, difficulty, topics, test_type, created_by, is_active, created_at";
const USER_TEST_COLUMNS: &str = "id, user_id, test_id, status, start_time, end_time, score";
const PROFILE_COLUMNS: &str = "id, name, email, selected_exam_id, avatar_url, onboarding_completed, total_xp, updated_at";

/// `Store` backed by the managed Postgres database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_active_exams(&self) -> Result<Vec<Exam>> {
        let exams = sqlx::query_as::<_, Exam>(
            r#"
            SELECT id, name, description, is_active, created_at
            FROM exams
            WHERE is_active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(exams)
    }

    async fn get_exam(&self, exam_id: Uuid) -> Result<Option<Exam>> {
        let exam = sqlx::query_as::<_, Exam>(
            "SELECT id, name, description, is_active, created_at FROM exams WHERE id = $1",
        )
        .bind(exam_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exam)
    }

    async fn list_topics(&self, exam_id: Uuid) -> Result<Vec<String>> {
        let topics = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT topic
            FROM questions
            WHERE exam_id = $1 AND is_active = TRUE AND topic IS NOT NULL
            ORDER BY topic
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(topics)
    }

    async fn eligible_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let sql = format!(
            r#"
            SELECT {QUESTION_COLUMNS}
            FROM questions
            WHERE exam_id = $1
              AND is_active = TRUE
              AND topic = ANY($2)
              AND ($3::text IS NULL OR difficulty = $3)
            ORDER BY created_at ASC, id ASC
            "#
        );
        let questions = sqlx::query_as::<_, Question>(&sql)
            .bind(filter.exam_id)
            .bind(&filter.topics)
            .bind(filter.difficulty.exact().map(|d| d.as_str()))
            .fetch_all(&self.pool)
            .await?;
        Ok(questions)
    }

    async fn count_questions(
        &self,
        topics: &[String],
        difficulty: DifficultyFilter,
    ) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM questions
            WHERE topic = ANY($1)
              AND ($2::text IS NULL OR difficulty = $2)
            "#,
        )
        .bind(topics)
        .bind(difficulty.exact().map(|d| d.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn insert_test(&self, test: NewTest) -> Result<Test> {
        let sql = format!(
            r#"
            INSERT INTO tests (
                exam_id, name, total_questions, duration_minutes, difficulty,
                topics, test_type, created_by, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            RETURNING {TEST_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Test>(&sql)
            .bind(test.exam_id)
            .bind(&test.name)
            .bind(test.total_questions)
            .bind(test.duration_minutes)
            .bind(test.difficulty.as_str())
            .bind(&test.topics)
            .bind(test.mode.test_type())
            .bind(test.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get_test(&self, test_id: Uuid) -> Result<Option<Test>> {
        let sql = format!("SELECT {TEST_COLUMNS} FROM tests WHERE id = $1");
        let test = sqlx::query_as::<_, Test>(&sql)
            .bind(test_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(test)
    }

    async fn insert_user_test(&self, user_test: NewUserTest) -> Result<UserTest> {
        let sql = format!(
            r#"
            INSERT INTO user_tests (user_id, test_id, status, start_time)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_TEST_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, UserTest>(&sql)
            .bind(user_test.user_id)
            .bind(user_test.test_id)
            .bind(STATUS_IN_PROGRESS)
            .bind(user_test.start_time)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn insert_test_questions(&self, links: Vec<TestQuestion>) -> Result<Vec<TestQuestion>> {
        if links.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder =
            QueryBuilder::<Postgres>::new("INSERT INTO test_questions (test_id, question_id, question_order) ");
        builder.push_values(links.iter(), |mut row, link| {
            row.push_bind(link.test_id)
                .push_bind(link.question_id)
                .push_bind(link.question_order);
        });
        builder.push(" RETURNING test_id, question_id, question_order");

        let mut inserted: Vec<TestQuestion> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;
        inserted.sort_by_key(|l| l.question_order);
        Ok(inserted)
    }

    async fn insert_user_test_questions(
        &self,
        user_test_id: Uuid,
        question_ids: &[Uuid],
    ) -> Result<Vec<UserTestQuestion>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO user_test_questions (user_test_id, question_id, marks_awarded, time_spent) ",
        );
        builder.push_values(question_ids.iter(), |mut row, question_id| {
            row.push_bind(user_test_id)
                .push_bind(*question_id)
                .push_bind(0_i32)
                .push_bind(0_i32);
        });
        builder.push(
            " RETURNING id, user_test_id, question_id, selected_answer, marks_awarded, time_spent",
        );

        let inserted = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(inserted)
    }

    async fn delete_test(&self, test_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM test_questions WHERE test_id = $1")
            .bind(test_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tests WHERE id = $1")
            .bind(test_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_user_test(&self, user_test_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM user_test_questions WHERE user_test_id = $1")
            .bind(user_test_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_tests WHERE id = $1")
            .bind(user_test_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_user_test(&self, user_test_id: Uuid) -> Result<Option<UserTest>> {
        let sql = format!("SELECT {USER_TEST_COLUMNS} FROM user_tests WHERE id = $1");
        let user_test = sqlx::query_as::<_, UserTest>(&sql)
            .bind(user_test_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user_test)
    }

    async fn answer_slots(&self, user_test_id: Uuid) -> Result<Vec<AnswerSlot>> {
        let slots = sqlx::query_as::<_, AnswerSlot>(
            r#"
            SELECT utq.id, utq.question_id, q.correct_answer
            FROM user_test_questions utq
            JOIN questions q ON q.id = utq.question_id
            WHERE utq.user_test_id = $1
            ORDER BY utq.id
            "#,
        )
        .bind(user_test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    async fn attempt_questions(&self, user_test_id: Uuid) -> Result<Vec<AttemptQuestion>> {
        let questions = sqlx::query_as::<_, AttemptQuestion>(
            r#"
            SELECT
                tq.question_order,
                q.id AS question_id,
                q.question_text,
                q.choices,
                q.topic,
                q.difficulty,
                q.correct_answer,
                utq.selected_answer,
                utq.marks_awarded,
                utq.time_spent
            FROM user_test_questions utq
            JOIN user_tests ut ON ut.id = utq.user_test_id
            JOIN test_questions tq
              ON tq.test_id = ut.test_id AND tq.question_id = utq.question_id
            JOIN questions q ON q.id = utq.question_id
            WHERE utq.user_test_id = $1
            ORDER BY tq.question_order
            "#,
        )
        .bind(user_test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn complete_user_test(
        &self,
        user_test_id: Uuid,
        graded: Vec<GradedAnswer>,
        score: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<UserTest> {
        let mut tx = self.pool.begin().await?;
        for answer in &graded {
            sqlx::query(
                r#"
                UPDATE user_test_questions
                SET selected_answer = $1, marks_awarded = $2, time_spent = $3
                WHERE id = $4 AND user_test_id = $5
                "#,
            )
            .bind(&answer.selected_answer)
            .bind(answer.marks_awarded)
            .bind(answer.time_spent)
            .bind(answer.slot_id)
            .bind(user_test_id)
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!(
            r#"
            UPDATE user_tests
            SET status = $1, end_time = $2, score = $3
            WHERE id = $4 AND status = $5
            RETURNING {USER_TEST_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, UserTest>(&sql)
            .bind(STATUS_COMPLETED)
            .bind(completed_at)
            .bind(score)
            .bind(user_test_id)
            .bind(STATUS_IN_PROGRESS)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(updated) = updated else {
            // Dropping the transaction rolls back the slot updates.
            return Err(Error::Conflict("Attempt is not in progress".to_string()));
        };
        tx.commit().await?;
        Ok(updated)
    }

    async fn list_attempts(&self, user_id: Uuid, exam_id: Uuid) -> Result<Vec<AttemptSummary>> {
        let attempts = sqlx::query_as::<_, AttemptSummary>(
            r#"
            SELECT
                ut.id AS user_test_id,
                t.id AS test_id,
                t.name AS test_name,
                t.total_questions,
                t.duration_minutes,
                ut.status,
                ut.start_time,
                ut.end_time,
                ut.score
            FROM user_tests ut
            JOIN tests t ON t.id = ut.test_id
            WHERE ut.user_id = $1 AND t.exam_id = $2
            ORDER BY ut.start_time DESC
            "#,
        )
        .bind(user_id)
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attempts)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> Result<Profile> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET
                name = COALESCE($1, name),
                selected_exam_id = COALESCE($2, selected_exam_id),
                avatar_url = COALESCE($3, avatar_url),
                onboarding_completed = COALESCE($4, onboarding_completed),
                updated_at = NOW()
            WHERE id = $5
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(changes.name)
            .bind(changes.selected_exam_id)
            .bind(changes.avatar_url)
            .bind(changes.onboarding_completed)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }
}
