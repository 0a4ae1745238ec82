use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::exam::Exam;
use crate::store::Store;

#[derive(Clone)]
pub struct ExamService {
    store: Arc<dyn Store>,
}

impl ExamService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_exams(&self) -> Result<Vec<Exam>> {
        self.store.list_active_exams().await
    }

    pub async fn list_topics(&self, exam_id: Uuid) -> Result<Vec<String>> {
        match self.store.get_exam(exam_id).await? {
            Some(exam) if exam.is_active => self.store.list_topics(exam.id).await,
            _ => Err(Error::NotFound(format!("Exam {} not found", exam_id))),
        }
    }
}
