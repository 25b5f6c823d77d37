//! Sample data shown while the backend is unreachable.
//!
//! The set is fixed: two results, the two assessments they belong to and
//! the two courses behind those. Only timestamps depend on `now`.

use crate::shared::{Assessment, AssessmentResult, Course};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Owner of the sample results when nobody is signed in
pub const FALLBACK_USER_ID: &str = "mock-user-1";

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDataset {
    pub results: Vec<AssessmentResult>,
    pub assessments: HashMap<String, Assessment>,
    pub courses: HashMap<String, Course>,
}

impl SyntheticDataset {
    /// Build the dataset, attributing results to `user_id` when given
    pub fn generate(user_id: Option<&str>, now: DateTime<Utc>) -> Self {
        let owner = user_id.unwrap_or(FALLBACK_USER_ID);

        let results = vec![
            AssessmentResult {
                result_id: "mock-result-1".to_string(),
                assessment_id: "mock-assessment-1".to_string(),
                user_id: owner.to_string(),
                score: 85.0,
                attempt_date: now,
                feedback: Some("Good work!".to_string()),
            },
            AssessmentResult {
                result_id: "mock-result-2".to_string(),
                assessment_id: "mock-assessment-2".to_string(),
                user_id: owner.to_string(),
                score: 65.0,
                attempt_date: now - Duration::days(1),
                feedback: Some("Needs improvement".to_string()),
            },
        ];

        let assessments = [
            ("mock-assessment-1", "Mock Final Exam", "A mock final exam for offline mode", "mock-course-1"),
            ("mock-assessment-2", "Mock Midterm", "A mock midterm for offline mode", "mock-course-2"),
        ]
        .into_iter()
        .map(|(id, title, description, course_id)| {
            (
                id.to_string(),
                Assessment {
                    assessment_id: id.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    course_id: Some(course_id.to_string()),
                    max_score: 100.0,
                    passing_score: Some(70.0),
                },
            )
        })
        .collect();

        let courses = [
            ("mock-course-1", "Introduction to Programming"),
            ("mock-course-2", "Advanced Data Structures"),
        ]
        .into_iter()
        .map(|(id, title)| {
            (
                id.to_string(),
                Course {
                    course_id: id.to_string(),
                    title: title.to_string(),
                    description: "A mock course for offline mode".to_string(),
                    instructor_id: None,
                    media_url: None,
                },
            )
        })
        .collect();

        Self {
            results,
            assessments,
            courses,
        }
    }
}
