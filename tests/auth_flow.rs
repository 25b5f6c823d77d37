//! Session lifecycle tests against a stub backend

#[macro_use]
mod common;

use assert_matches::assert_matches;
use common::*;
use edusync::client::session_store::{keys, SessionStore};
use edusync::client::{AuthError, Credentials, NotificationLevel, Registration, RouteGuard};
use edusync::shared::Role;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn registration(password: &str, confirm: &str) -> Registration {
    Registration {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        password: password.to_string(),
        confirm_password: confirm.to_string(),
        role: Role::Student,
    }
}

#[tokio::test]
async fn test_login_without_token_has_no_header() {
    let server = MockServer::start().await;
    stub_login(
        &server,
        200,
        json!({"userId": "u1", "email": "a@b.com", "role": "Student"}),
    )
    .await;
    let client = client_for(&server.uri());

    let record = assert_ok!(
        client
            .manager
            .login(&Credentials::new("a@b.com", "secret"))
            .await
    );

    assert_eq!(record.role, Role::Student);
    assert_eq!(record.token, None);
    let current = assert_signed_in!(client.manager, "a@b.com");
    assert_eq!(current, record);
    assert_eq!(client.manager.api().authorization_header(), None);
    assert_eq!(client.store.load_raw(keys::AUTH_TOKEN).unwrap(), None);
    assert_eq!(client.store.load_session().unwrap(), Some(record));
    assert_notified!(client.log, NotificationLevel::Success, "Welcome back, a@b.com!");
}

#[tokio::test]
async fn test_login_with_token_sends_bearer_header() {
    let server = MockServer::start().await;
    stub_login(&server, 200, student_payload(Some("t0k3n"))).await;
    Mock::given(method("GET"))
        .and(path("/api/Courses"))
        .and(header("Authorization", "Bearer t0k3n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server.uri());

    assert_ok!(client.manager.login(&Credentials::new("a@b.com", "secret")).await);

    assert_eq!(
        client.manager.api().authorization_header().as_deref(),
        Some("Bearer t0k3n")
    );
    assert_eq!(
        client.store.load_raw(keys::AUTH_TOKEN).unwrap().as_deref(),
        Some("t0k3n")
    );
    let courses: Vec<serde_json::Value> = assert_ok!(client.manager.api().get("/api/Courses").await);
    assert!(courses.is_empty());
}

#[tokio::test]
async fn test_login_rejected_uses_server_message() {
    let server = MockServer::start().await;
    stub_login(&server, 401, json!({"message": "Invalid email or password"})).await;
    let client = client_for(&server.uri());

    let err = client
        .manager
        .login(&Credentials::new("a@b.com", "wrong"))
        .await
        .unwrap_err();

    assert_matches!(err, AuthError::InvalidCredentials { ref message } if message == "Invalid email or password");
    assert_signed_out!(client.manager);
    assert_eq!(
        client.manager.last_error().as_deref(),
        Some("Invalid email or password")
    );
    assert_notified!(client.log, NotificationLevel::Error, "Invalid email or password");
}

#[tokio::test]
async fn test_login_rejected_without_message_uses_generic_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Users/login"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    let client = client_for(&server.uri());

    let err = client
        .manager
        .login(&Credentials::new("a@b.com", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Login failed. Please check your credentials.");
    assert_signed_out!(client.manager);
}

#[tokio::test]
async fn test_login_with_unknown_role_is_invalid_response() {
    let server = MockServer::start().await;
    stub_login(
        &server,
        200,
        json!({"userId": "u1", "email": "a@b.com", "role": "Admin"}),
    )
    .await;
    let client = client_for(&server.uri());

    let err = client
        .manager
        .login(&Credentials::new("a@b.com", "secret"))
        .await
        .unwrap_err();

    assert_matches!(err, AuthError::InvalidResponse(_));
    assert_signed_out!(client.manager);
    assert_eq!(client.store.load_session().unwrap(), None);
}

#[tokio::test]
async fn test_register_mismatch_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Users/register"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server.uri());

    let err = client
        .manager
        .register(&registration("secret1", "secret2"))
        .await
        .unwrap_err();

    assert_matches!(err, AuthError::Validation(ref e) if e.field() == Some("confirmPassword"));
    assert_signed_out!(client.manager);
}

#[tokio::test]
async fn test_register_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Users/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Email already exists"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server.uri());

    let err = client
        .manager
        .register(&registration("secret1", "secret1"))
        .await
        .unwrap_err();

    assert_matches!(err, AuthError::RegistrationError { ref message } if message == "Email already exists");
    assert_notified!(client.log, NotificationLevel::Error, "Email already exists");
}

#[tokio::test]
async fn test_register_success_does_not_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Users/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"userId": "u9"})))
        .mount(&server)
        .await;
    let client = client_for(&server.uri());

    assert_ok!(client.manager.register(&registration("secret1", "secret1")).await);

    assert_signed_out!(client.manager);
    assert_notified!(
        client.log,
        NotificationLevel::Success,
        "Account created successfully! Please log in."
    );
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let server = MockServer::start().await;
    stub_login(&server, 200, instructor_payload()).await;
    let client = client_for(&server.uri());
    assert_ok!(client.manager.login(&Credentials::new("grace@edu.org", "secret")).await);
    assert!(client.manager.is_instructor());

    client.manager.logout();

    assert_signed_out!(client.manager);
    assert_eq!(client.store.load_raw(keys::USER).unwrap(), None);
    assert_eq!(client.store.load_raw(keys::AUTH_TOKEN).unwrap(), None);
    assert_notified!(
        client.log,
        NotificationLevel::Info,
        "You have been logged out successfully."
    );
}

#[tokio::test]
async fn test_validation_401_forces_logout() {
    let server = MockServer::start().await;
    stub_login(&server, 200, student_payload(Some("stale"))).await;
    Mock::given(method("GET"))
        .and(path("/api/Users/u1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let client = client_for(&server.uri());
    assert_ok!(client.manager.login(&Credentials::new("a@b.com", "secret")).await);

    assert!(!client.manager.validate_session().await);

    assert_signed_out!(client.manager);
    assert_notified!(
        client.log,
        NotificationLevel::Info,
        "Your session has expired. Please log in again."
    );
}

#[tokio::test]
async fn test_validation_keeps_session_on_server_error() {
    let server = MockServer::start().await;
    stub_login(&server, 200, student_payload(Some("t0k3n"))).await;
    Mock::given(method("GET"))
        .and(path("/api/Users/u1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let client = client_for(&server.uri());
    assert_ok!(client.manager.login(&Credentials::new("a@b.com", "secret")).await);

    assert!(client.manager.validate_session().await);
    assert_signed_in!(client.manager, "a@b.com");
}

#[tokio::test]
async fn test_guard_return_path_after_login() {
    let server = MockServer::start().await;
    stub_login(&server, 200, student_payload(None)).await;
    let client = client_for(&server.uri());
    let guard = RouteGuard::new(client.manager.session().clone());

    let access = guard.check("/results", None);
    assert_eq!(access.redirect(), Some("/login"));

    assert_ok!(client.manager.login(&Credentials::new("a@b.com", "secret")).await);
    assert_eq!(guard.check("/results", None).redirect(), None);
    assert_eq!(guard.take_return_path(), "/results");
}

#[tokio::test]
async fn test_session_survives_restart_with_file_store() {
    use edusync::client::{AuthSessionManager, FileSessionStore, NotificationLog};
    use std::sync::Arc;

    let server = MockServer::start().await;
    stub_login(&server, 200, student_payload(Some("t0k3n"))).await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");

    let first = AuthSessionManager::new(
        config_for(&server.uri()),
        Arc::new(FileSessionStore::new(&file)),
        Arc::new(NotificationLog::default()),
    )
    .unwrap();
    first.initialize();
    assert_signed_out!(first);
    assert_ok!(first.login(&Credentials::new("a@b.com", "secret")).await);
    drop(first);

    let second = AuthSessionManager::new(
        config_for(&server.uri()),
        Arc::new(FileSessionStore::new(&file)),
        Arc::new(NotificationLog::default()),
    )
    .unwrap();
    second.initialize();

    let record = assert_signed_in!(second, "a@b.com");
    assert_eq!(record.token.as_deref(), Some("t0k3n"));
    assert_eq!(
        second.api().authorization_header().as_deref(),
        Some("Bearer t0k3n")
    );
}
