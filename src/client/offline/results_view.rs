//! Results view state.
//!
//! Loads results together with the assessment and course lookups needed to
//! display them, falling back to [`SyntheticDataset`] when the backend is
//! down. Course lookups run concurrently and are joined before the view
//! state is written; a failed lookup only leaves that course unknown.
//!
//! A `ResultsView` is a cheap handle; clones share state. After
//! [`ResultsView::unmount`], results of requests still in flight are
//! discarded instead of being written. Only the most recently started load
//! may write; an older load that finishes later is dropped.

use super::{FallbackLoader, LoadError, SyntheticDataset};
use crate::client::auth::{AuthSessionManager, SessionHandle};
use crate::client::availability::AvailabilityProber;
use crate::client::http::ApiClient;
use crate::client::services::{AssessmentService, CourseService, ResultService, UserService};
use crate::shared::{Assessment, AssessmentResult, Course, SharedError, User};
use futures_util::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Share of `maxScore` needed to pass
pub const PASS_THRESHOLD: f64 = 0.7;

const LOAD_FAILED: &str = "Failed to load results. Please try again later.";
const OFFLINE_SUFFIX: &str = " (offline mode)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineBanner {
    pub message: String,
    pub retry_label: &'static str,
}

impl Default for OfflineBanner {
    fn default() -> Self {
        Self {
            message: LoadError::NetworkUnavailable.to_string(),
            retry_label: "Retry Connection",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultsState {
    pub results: Vec<AssessmentResult>,
    pub assessments: HashMap<String, Assessment>,
    pub courses: HashMap<String, Course>,
    pub users: HashMap<String, User>,
    pub loading: bool,
    /// Showing synthetic data
    pub degraded: bool,
    pub banner: Option<OfflineBanner>,
    pub error: Option<String>,
    pub success_message: Option<String>,
    pub lookup_failures: Vec<LoadError>,
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub result_id: String,
    pub assessment: String,
    pub course: String,
    pub student: String,
    pub score: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] SharedError),

    #[error("Only instructors can change results")]
    Forbidden,

    #[error("Result {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Failed(String),
}

struct LiveData {
    results: Vec<AssessmentResult>,
    assessments: HashMap<String, Assessment>,
    courses: HashMap<String, Course>,
    users: HashMap<String, User>,
    failures: Vec<LoadError>,
}

impl From<SyntheticDataset> for LiveData {
    fn from(data: SyntheticDataset) -> Self {
        Self {
            results: data.results,
            assessments: data.assessments,
            courses: data.courses,
            users: HashMap::new(),
            failures: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct ResultsView {
    api: ApiClient,
    session: SessionHandle,
    loader: FallbackLoader,
    user_only: bool,
    mounted: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    state: Arc<Mutex<ResultsState>>,
}

impl ResultsView {
    /// `user_only` restricts the view to the signed-in user's results
    pub fn new(manager: &AuthSessionManager, prober: AvailabilityProber, user_only: bool) -> Self {
        let api = manager.api().clone();
        let loader = FallbackLoader::new(prober, api.config().server_url());
        Self {
            api,
            session: manager.session().clone(),
            loader,
            user_only,
            mounted: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(Mutex::new(ResultsState::default())),
        }
    }

    pub fn state(&self) -> ResultsState {
        self.lock().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub async fn mount(&self) {
        self.mounted.store(true, Ordering::SeqCst);
        self.load().await;
    }

    /// Probe again and reload, whatever the current mode
    pub async fn retry(&self) {
        if !self.is_mounted() {
            return;
        }
        {
            let mut state = self.lock();
            state.error = None;
            state.banner = None;
        }
        self.load().await;
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ResultsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn load(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().loading = true;

        let user_id = self.session.current_user().map(|user| user.id);
        let outcome = self
            .loader
            .load(
                || self.fetch_live(),
                || LiveData::from(SyntheticDataset::generate(user_id.as_deref(), chrono::Utc::now())),
            )
            .await;

        if !self.is_mounted() {
            tracing::debug!("results view unmounted, discarding load");
            return;
        }
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "superseded by a newer load, discarding");
            return;
        }

        let mut state = self.lock();
        state.loading = false;
        match outcome {
            Ok(outcome) => {
                let degraded = outcome.is_degraded();
                let data = outcome.into_inner();
                state.results = data.results;
                state.assessments = data.assessments;
                state.courses = data.courses;
                state.users = data.users;
                state.lookup_failures = data.failures;
                state.degraded = degraded;
                state.banner = degraded.then(OfflineBanner::default);
                state.error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load results");
                // Whatever was shown before, sample data included, is stale now
                state.results.clear();
                state.assessments.clear();
                state.courses.clear();
                state.users.clear();
                state.lookup_failures.clear();
                state.success_message = None;
                state.degraded = false;
                state.banner = None;
                state.error = Some(LOAD_FAILED.to_string());
            }
        }
    }

    async fn fetch_live(&self) -> Result<LiveData, LoadError> {
        let mut failures = Vec::new();

        let users = if self.user_only {
            HashMap::new()
        } else {
            match UserService::new(self.api.clone()).list().await {
                Ok(users) => users.into_iter().map(|u| (u.user_id.clone(), u)).collect(),
                Err(e) => {
                    tracing::error!(error = %e, "Error fetching users");
                    failures.push(LoadError::PartialFetchFailure {
                        resource: "users",
                        id: "*".to_string(),
                        message: e.to_string(),
                    });
                    HashMap::new()
                }
            }
        };

        let mut results = ResultService::new(self.api.clone()).list().await?;
        if self.user_only {
            if let Some(user) = self.session.current_user() {
                results.retain(|r| r.user_id == user.id);
            }
        }

        let assessments: HashMap<String, Assessment> = AssessmentService::new(self.api.clone())
            .list()
            .await?
            .into_iter()
            .map(|a| (a.assessment_id.clone(), a))
            .collect();

        let course_ids: BTreeSet<String> = assessments
            .values()
            .filter_map(|a| a.course_id.clone())
            .collect();

        let courses_api = CourseService::new(self.api.clone());
        let lookups = join_all(course_ids.into_iter().map(|id| {
            let courses_api = courses_api.clone();
            async move {
                let result = courses_api.get(&id).await;
                (id, result)
            }
        }))
        .await;

        let mut courses = HashMap::new();
        for (id, lookup) in lookups {
            match lookup {
                Ok(course) => {
                    courses.insert(id, course);
                }
                Err(e) => {
                    tracing::error!(course_id = %id, error = %e, "Failed to load course");
                    failures.push(LoadError::PartialFetchFailure {
                        resource: "course",
                        id,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(LiveData {
            results,
            assessments,
            courses,
            users,
            failures,
        })
    }

    /// Whether the signed-in user may edit or delete results
    pub fn can_edit(&self) -> bool {
        self.session
            .current_user()
            .is_some_and(|user| user.is_instructor())
    }

    pub fn rows(&self) -> Vec<ResultRow> {
        let state = self.lock();
        state
            .results
            .iter()
            .map(|result| {
                let assessment = state.assessments.get(&result.assessment_id);
                let course = assessment
                    .and_then(|a| a.course_id.as_ref())
                    .and_then(|id| state.courses.get(id));
                let student = state
                    .users
                    .get(&result.user_id)
                    .map(|u| u.name.clone())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| "Unknown User".to_string());
                let (score, passed) = match assessment {
                    Some(a) if a.max_score > 0.0 => (
                        format!("{} / {}", result.score, a.max_score),
                        result.score / a.max_score >= PASS_THRESHOLD,
                    ),
                    _ => (result.score.to_string(), false),
                };
                ResultRow {
                    result_id: result.result_id.clone(),
                    assessment: assessment
                        .map(|a| a.title.clone())
                        .unwrap_or_else(|| "Unknown Assessment".to_string()),
                    course: course
                        .map(|c| c.title.clone())
                        .unwrap_or_else(|| "Unknown Course".to_string()),
                    student,
                    score,
                    passed,
                }
            })
            .collect()
    }

    /// Change a result's score. In degraded mode only the in-memory copy changes.
    pub async fn update_score(&self, result_id: &str, score: f64) -> Result<String, ActionError> {
        if !self.can_edit() {
            return Err(ActionError::Forbidden);
        }
        let (mut updated, degraded) = {
            let state = self.lock();
            let result = state
                .results
                .iter()
                .find(|r| r.result_id == result_id)
                .cloned()
                .ok_or_else(|| ActionError::NotFound(result_id.to_string()))?;
            validate_score(score, state.assessments.get(&result.assessment_id))?;
            (result, state.degraded)
        };
        updated.score = score;

        if !degraded {
            ResultService::new(self.api.clone())
                .update(&updated)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to update result");
                    ActionError::Failed("Failed to update result. Please try again.".to_string())
                })?;
        }

        let message = with_mode_suffix("Result updated successfully", degraded);
        if !self.is_mounted() {
            return Ok(message);
        }
        let mut state = self.lock();
        if let Some(result) = state.results.iter_mut().find(|r| r.result_id == result_id) {
            result.score = score;
        }
        state.success_message = Some(message.clone());
        Ok(message)
    }

    /// Remove a result. In degraded mode only the in-memory copy changes.
    pub async fn delete_result(&self, result_id: &str) -> Result<String, ActionError> {
        if !self.can_edit() {
            return Err(ActionError::Forbidden);
        }
        let degraded = {
            let state = self.lock();
            if !state.results.iter().any(|r| r.result_id == result_id) {
                return Err(ActionError::NotFound(result_id.to_string()));
            }
            state.degraded
        };

        if !degraded {
            ResultService::new(self.api.clone())
                .delete(result_id)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to delete result");
                    ActionError::Failed("Failed to delete result. Please try again.".to_string())
                })?;
        }

        let message = with_mode_suffix("Result deleted successfully", degraded);
        if !self.is_mounted() {
            return Ok(message);
        }
        let mut state = self.lock();
        state.results.retain(|r| r.result_id != result_id);
        state.success_message = Some(message.clone());
        Ok(message)
    }
}

fn with_mode_suffix(message: &str, degraded: bool) -> String {
    if degraded {
        format!("{}{}", message, OFFLINE_SUFFIX)
    } else {
        message.to_string()
    }
}

fn validate_score(score: f64, assessment: Option<&Assessment>) -> Result<(), SharedError> {
    if !score.is_finite() {
        return Err(SharedError::validation("score", "Please enter a valid number for score"));
    }
    if let Some(assessment) = assessment {
        if score > assessment.max_score {
            return Err(SharedError::validation(
                "score",
                format!("Score cannot exceed the maximum score of {}", assessment.max_score),
            ));
        }
    }
    if score < 0.0 {
        return Err(SharedError::validation("score", "Score cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(max: f64) -> Assessment {
        Assessment {
            assessment_id: "a1".to_string(),
            title: "Quiz".to_string(),
            description: String::new(),
            course_id: None,
            max_score: max,
            passing_score: None,
        }
    }

    #[test]
    fn test_validate_score() {
        assert!(validate_score(50.0, Some(&assessment(100.0))).is_ok());
        assert!(validate_score(f64::NAN, None).is_err());
        assert_eq!(
            validate_score(101.0, Some(&assessment(100.0))).unwrap_err().to_string(),
            "Score cannot exceed the maximum score of 100"
        );
        assert_eq!(
            validate_score(-1.0, None).unwrap_err().to_string(),
            "Score cannot be negative"
        );
    }

    #[test]
    fn test_mode_suffix() {
        assert_eq!(with_mode_suffix("Saved", true), "Saved (offline mode)");
        assert_eq!(with_mode_suffix("Saved", false), "Saved");
    }

    #[test]
    fn test_banner_defaults() {
        let banner = OfflineBanner::default();
        assert_eq!(banner.retry_label, "Retry Connection");
        assert!(banner.message.contains("offline mode"));
    }
}
