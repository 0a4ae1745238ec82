use std::sync::Arc;

use uuid::Uuid;

use crate::dto::dashboard_dto::{AttemptOverview, DashboardSummary};
use crate::error::{Error, Result};
use crate::models::attempt_summary::AttemptSummary;
use crate::models::identity::Identity;
use crate::models::user_test::{STATUS_COMPLETED, STATUS_IN_PROGRESS};
use crate::services::attempt_service::percentage;
use crate::store::Store;

const RECENT_LIMIT: usize = 3;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn Store>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn summary(&self, requester: Option<&Identity>) -> Result<DashboardSummary> {
        let requester = requester.ok_or(Error::Unauthenticated)?;
        let profile = self
            .store
            .get_profile(requester.user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Profile not found".to_string()))?;
        let exam_id = profile
            .selected_exam_id
            .ok_or_else(|| Error::InvalidSpec("No exam selected".to_string()))?;

        let attempts = self.store.list_attempts(requester.user_id, exam_id).await?;
        Ok(summarize(exam_id, attempts, profile.total_xp))
    }
}

pub fn summarize(exam_id: Uuid, attempts: Vec<AttemptSummary>, total_xp: i32) -> DashboardSummary {
    let overviews: Vec<AttemptOverview> = attempts.into_iter().map(overview).collect();

    let mut completed: Vec<&AttemptOverview> = overviews
        .iter()
        .filter(|a| a.status == STATUS_COMPLETED)
        .collect();
    let scores: Vec<f64> = completed.iter().filter_map(|a| a.percentage).collect();
    let average_score = if scores.is_empty() {
        0.0
    } else {
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        (mean * 10.0).round() / 10.0
    };
    let best_score = scores.iter().copied().fold(0.0_f64, f64::max);

    completed.sort_by(|a, b| b.end_time.cmp(&a.end_time));
    let recent = completed
        .iter()
        .take(RECENT_LIMIT)
        .map(|a| (*a).clone())
        .collect();

    let mut in_progress: Vec<AttemptOverview> = overviews
        .iter()
        .filter(|a| a.status == STATUS_IN_PROGRESS)
        .cloned()
        .collect();
    in_progress.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    DashboardSummary {
        exam_id,
        tests_total: overviews.len(),
        tests_completed: completed.len(),
        average_score,
        best_score,
        total_xp,
        recent,
        in_progress,
    }
}

fn overview(attempt: AttemptSummary) -> AttemptOverview {
    let percentage = match (attempt.status.as_str(), attempt.score) {
        (STATUS_COMPLETED, Some(score)) => Some(percentage(
            score,
            attempt.total_questions.max(0) as usize,
        )),
        (STATUS_COMPLETED, None) => Some(0.0),
        _ => None,
    };
    AttemptOverview {
        user_test_id: attempt.user_test_id,
        test_id: attempt.test_id,
        test_name: attempt.test_name,
        total_questions: attempt.total_questions,
        duration_minutes: attempt.duration_minutes,
        status: attempt.status,
        start_time: attempt.start_time,
        end_time: attempt.end_time,
        score: attempt.score,
        percentage,
    }
}
