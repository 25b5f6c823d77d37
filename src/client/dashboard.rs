//! Home dashboard summaries.
//!
//! Students see their own recent results plus completion stats; instructors
//! see the most recent results across all students and no stats.

use crate::client::http::{ApiClient, ApiError};
use crate::client::services::{AssessmentService, CourseService, ResultService};
use crate::shared::{Assessment, AssessmentResult, Course, SessionRecord};
use std::collections::HashSet;

pub const RECENT_COURSES: usize = 4;
pub const RECENT_RESULTS: usize = 5;

pub const LOAD_FAILED: &str = "Failed to load dashboard data. Please try again later.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentStats {
    pub total: usize,
    /// Distinct assessments with at least one result
    pub completed: usize,
    /// Percentage of the summed max scores, rounded
    pub avg_score: u32,
}

impl StudentStats {
    pub fn compute(user_id: &str, assessments: &[Assessment], results: &[AssessmentResult]) -> Self {
        let own: Vec<&AssessmentResult> = results.iter().filter(|r| r.user_id == user_id).collect();

        let completed = own
            .iter()
            .map(|r| r.assessment_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut total_score = 0.0;
        let mut total_max = 0.0;
        for result in &own {
            total_score += result.score;
            if let Some(a) = assessments.iter().find(|a| a.assessment_id == result.assessment_id) {
                total_max += a.max_score;
            }
        }

        let avg_score = if total_max > 0.0 {
            (total_score / total_max * 100.0).round().max(0.0) as u32
        } else {
            0
        };

        Self {
            total: assessments.len(),
            completed,
            avg_score,
        }
    }
}

/// The `n` newest results, newest first
pub fn recent_results(results: &[AssessmentResult], n: usize) -> Vec<AssessmentResult> {
    let mut sorted = results.to_vec();
    sorted.sort_by(|a, b| b.attempt_date.cmp(&a.attempt_date));
    sorted.truncate(n);
    sorted
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub recent_courses: Vec<Course>,
    pub recent_results: Vec<AssessmentResult>,
    /// Only computed for students
    pub stats: Option<StudentStats>,
}

impl Dashboard {
    pub async fn load(api: &ApiClient, user: &SessionRecord) -> Result<Self, ApiError> {
        let mut courses = CourseService::new(api.clone()).list().await?;
        courses.truncate(RECENT_COURSES);

        let assessments = AssessmentService::new(api.clone()).list().await?;
        let mut results = ResultService::new(api.clone()).list().await?;
        if user.is_student() {
            results.retain(|r| r.user_id == user.id);
        }

        let stats = user
            .is_student()
            .then(|| StudentStats::compute(&user.id, &assessments, &results));

        Ok(Self {
            recent_courses: courses,
            recent_results: recent_results(&results, RECENT_RESULTS),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn assessment(id: &str, max: f64) -> Assessment {
        Assessment {
            assessment_id: id.to_string(),
            title: id.to_uppercase(),
            description: String::new(),
            course_id: None,
            max_score: max,
            passing_score: None,
        }
    }

    fn result(id: &str, assessment_id: &str, user: &str, score: f64, days_ago: i64) -> AssessmentResult {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        AssessmentResult {
            result_id: id.to_string(),
            assessment_id: assessment_id.to_string(),
            user_id: user.to_string(),
            score,
            attempt_date: base - Duration::days(days_ago),
            feedback: None,
        }
    }

    #[test]
    fn test_stats_count_distinct_and_average() {
        let assessments = vec![assessment("a1", 100.0), assessment("a2", 50.0), assessment("a3", 10.0)];
        let results = vec![
            result("r1", "a1", "u1", 80.0, 3),
            result("r2", "a1", "u1", 90.0, 2),
            result("r3", "a2", "u1", 25.0, 1),
            result("r4", "a3", "u2", 10.0, 0),
        ];

        let stats = StudentStats::compute("u1", &assessments, &results);
        assert_eq!(
            stats,
            StudentStats {
                total: 3,
                completed: 2,
                // 195 / 250
                avg_score: 78,
            }
        );
    }

    #[test]
    fn test_stats_without_results() {
        let stats = StudentStats::compute("u1", &[assessment("a1", 100.0)], &[]);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.avg_score, 0);
    }

    #[test]
    fn test_recent_results_newest_first() {
        let results = vec![
            result("old", "a1", "u1", 1.0, 10),
            result("new", "a1", "u1", 1.0, 0),
            result("mid", "a1", "u1", 1.0, 5),
        ];
        let recent = recent_results(&results, 2);
        let ids: Vec<&str> = recent.iter().map(|r| r.result_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid"]);
    }
}
