//! Typed calls for the EduSync REST resources.
//!
//! Every service is a thin wrapper over [`ApiClient`]; paths follow the
//! `/api/{Resource}` and `/api/{Resource}/{id}` convention.

use crate::client::http::{ApiClient, ApiError};
use crate::shared::{Assessment, AssessmentResult, Course, NewResult, User};
use serde_json::Value;

/// API paths
pub mod endpoints {
    pub const LOGIN: &str = "/api/Users/login";
    pub const REGISTER: &str = "/api/Users/register";
    pub const USERS: &str = "/api/Users";
    pub const COURSES: &str = "/api/Courses";
    pub const ASSESSMENTS: &str = "/api/Assessments";
    pub const RESULTS: &str = "/api/Results";

    /// Path of a single resource
    pub fn item(collection: &str, id: &str) -> String {
        format!("{}/{}", collection, id)
    }
}

#[derive(Debug, Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.api.get(endpoints::USERS).await
    }

    pub async fn get(&self, id: &str) -> Result<User, ApiError> {
        self.api.get(&endpoints::item(endpoints::USERS, id)).await
    }
}

#[derive(Debug, Clone)]
pub struct CourseService {
    api: ApiClient,
}

impl CourseService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Course>, ApiError> {
        self.api.get(endpoints::COURSES).await
    }

    pub async fn get(&self, id: &str) -> Result<Course, ApiError> {
        self.api.get(&endpoints::item(endpoints::COURSES, id)).await
    }

    pub async fn create(&self, course: &Course) -> Result<Course, ApiError> {
        self.api.post(endpoints::COURSES, course).await
    }

    pub async fn update(&self, course: &Course) -> Result<(), ApiError> {
        let _: Value = self
            .api
            .put(&endpoints::item(endpoints::COURSES, &course.course_id), course)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete(&endpoints::item(endpoints::COURSES, id)).await
    }
}

#[derive(Debug, Clone)]
pub struct AssessmentService {
    api: ApiClient,
}

impl AssessmentService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Assessment>, ApiError> {
        self.api.get(endpoints::ASSESSMENTS).await
    }

    pub async fn get(&self, id: &str) -> Result<Assessment, ApiError> {
        self.api.get(&endpoints::item(endpoints::ASSESSMENTS, id)).await
    }

    pub async fn create(&self, assessment: &Assessment) -> Result<Assessment, ApiError> {
        self.api.post(endpoints::ASSESSMENTS, assessment).await
    }

    pub async fn update(&self, assessment: &Assessment) -> Result<(), ApiError> {
        let path = endpoints::item(endpoints::ASSESSMENTS, &assessment.assessment_id);
        let _: Value = self.api.put(&path, assessment).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete(&endpoints::item(endpoints::ASSESSMENTS, id)).await
    }
}

#[derive(Debug, Clone)]
pub struct ResultService {
    api: ApiClient,
}

impl ResultService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<AssessmentResult>, ApiError> {
        self.api.get(endpoints::RESULTS).await
    }

    pub async fn get(&self, id: &str) -> Result<AssessmentResult, ApiError> {
        self.api.get(&endpoints::item(endpoints::RESULTS, id)).await
    }

    pub async fn create(&self, result: &NewResult) -> Result<AssessmentResult, ApiError> {
        self.api.post(endpoints::RESULTS, result).await
    }

    pub async fn update(&self, result: &AssessmentResult) -> Result<(), ApiError> {
        let path = endpoints::item(endpoints::RESULTS, &result.result_id);
        let _: Value = self.api.put(&path, result).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete(&endpoints::item(endpoints::RESULTS, id)).await
    }
}
