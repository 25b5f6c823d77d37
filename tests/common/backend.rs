//! Stub backend helpers
//!
//! Wraps a `wiremock::MockServer` with the EduSync routes the tests need and
//! builds session managers pointed at it.

use edusync::client::{
    AuthSessionManager, AvailabilityProber, Config, MemorySessionStore, NotificationLog,
};
use edusync::shared::AppConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Address nothing listens on
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

/// Session manager plus the handles tests inspect
pub struct TestClient {
    pub manager: Arc<AuthSessionManager>,
    pub store: Arc<MemorySessionStore>,
    pub log: NotificationLog,
    pub prober: AvailabilityProber,
}

pub fn config_for(base_url: &str) -> Config {
    Config::with_builder(AppConfig::builder().server_url(base_url)).expect("valid test config")
}

/// Build a manager for `base_url` over an in-memory store, already initialized
pub fn client_for(base_url: &str) -> TestClient {
    client_with_store(base_url, MemorySessionStore::new())
}

pub fn client_with_store(base_url: &str, store: MemorySessionStore) -> TestClient {
    let config = config_for(base_url);
    let prober = AvailabilityProber::from_config(&config);
    let store = Arc::new(store);
    let log = NotificationLog::default();
    let manager = AuthSessionManager::new(config, store.clone(), Arc::new(log.clone()))
        .expect("manager builds");
    manager.initialize();
    TestClient {
        manager: Arc::new(manager),
        store,
        log,
        prober,
    }
}

/// Answer the login endpoint with `status` and `body`
pub async fn stub_login(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/Users/login"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Answer `GET path` with a JSON body
pub async fn stub_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn student_payload(token: Option<&str>) -> Value {
    let mut body = json!({
        "userId": "u1",
        "name": "Ada",
        "email": "a@b.com",
        "role": "Student"
    });
    if let Some(token) = token {
        body["token"] = json!(token);
    }
    body
}

pub fn instructor_payload() -> Value {
    json!({
        "userId": "i1",
        "name": "Grace",
        "email": "grace@edu.org",
        "role": "Instructor",
        "token": "instructor-token"
    })
}

/// Two assessments in two courses, one result for each of two students
pub async fn stub_results_backend(server: &MockServer) {
    stub_get(
        server,
        "/api/Results",
        json!([
            {"resultId": "r1", "assessmentId": "a1", "userId": "u1", "score": 90,
             "attemptDate": "2024-05-02T10:00:00Z"},
            {"resultId": "r2", "assessmentId": "a2", "userId": "u2", "score": 30,
             "attemptDate": "2024-05-01T10:00:00Z"}
        ]),
    )
    .await;
    stub_get(
        server,
        "/api/Assessments",
        json!([
            {"assessmentId": "a1", "title": "Borrowing", "description": "", "courseId": "c1",
             "maxScore": 100},
            {"assessmentId": "a2", "title": "Lifetimes", "description": "", "courseId": "c2",
             "maxScore": 50}
        ]),
    )
    .await;
    stub_get(
        server,
        "/api/Users",
        json!([
            {"userId": "u1", "name": "Ada", "email": "a@b.com", "role": "Student"},
            {"userId": "u2", "name": "Alan", "email": "alan@b.com", "role": "Student"}
        ]),
    )
    .await;
    stub_get(
        server,
        "/api/Courses/c1",
        json!({"courseId": "c1", "title": "Rust 101", "description": ""}),
    )
    .await;
}
