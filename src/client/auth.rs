//! Auth Session Manager
//!
//! Owns the client's session state machine:
//!
//! ```text
//! Uninitialized ──initialize──▶ Restoring ──▶ Authenticated
//!                                         └─▶ Anonymous
//! Anonymous ──login──▶ Authenticated ──logout / failed validation──▶ Anonymous
//! ```
//!
//! The session record lives in a [`SessionHandle`], which is also the
//! [`CredentialProvider`] of the manager's [`ApiClient`]. Every state
//! transition is a single synchronous write to that handle, so the
//! `Authorization` header and the stored token cannot diverge, and a request
//! issued after `login`/`logout` returns always sees the new state.

use crate::client::config::Config;
use crate::client::http::{ApiClient, ApiError, CredentialProvider};
use crate::client::notify::{Notification, Notifier};
use crate::client::services::endpoints;
use crate::client::session_store::{SessionStore, StoreError};
use crate::shared::{Role, SessionRecord, SharedError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// How often an authenticated session is re-validated
pub const REVALIDATION_INTERVAL: Duration = Duration::from_secs(30 * 60);

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
const REGISTERED: &str = "Account created successfully! Please log in.";
const LOGGED_OUT: &str = "You have been logged out successfully.";
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Restoring,
    Authenticated(SessionRecord),
    Anonymous,
}

impl SessionState {
    pub fn record(&self) -> Option<&SessionRecord> {
        match self {
            SessionState::Authenticated(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Shared cell holding the current session state
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    state: Arc<RwLock<SessionState>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn current_user(&self) -> Option<SessionRecord> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .record()
            .cloned()
    }

    fn set(&self, next: SessionState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = next;
    }
}

impl CredentialProvider for SessionHandle {
    fn bearer_token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .record()
            .and_then(|record| record.token.clone())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Local input check failed; no request was made
    #[error(transparent)]
    Validation(#[from] SharedError),

    #[error("{message}")]
    InvalidCredentials { message: String },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("{message}")]
    RegistrationError { message: String },

    #[error("stored session is corrupt: {0}")]
    StorageCorrupt(String),

    #[error("session storage failed: {0}")]
    Storage(String),

    /// Transport failure or server error
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(e) => e.to_string(),
            AuthError::InvalidCredentials { message } | AuthError::RegistrationError { message } => {
                message.clone()
            }
            AuthError::InvalidResponse(_) => "Invalid response from server".to_string(),
            AuthError::StorageCorrupt(_) | AuthError::Storage(_) => {
                "Could not save your session. Please try again.".to_string()
            }
            AuthError::Api(e) => match e.server_message() {
                Some(message) => message.to_string(),
                None if e.is_transport() => "Unable to reach the server. Please try again.".to_string(),
                None => LOGIN_FAILED.to_string(),
            },
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt(reason) => AuthError::StorageCorrupt(reason),
            other => AuthError::Storage(other.to_string()),
        }
    }
}

/// Login form input
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SharedError> {
        if self.email.trim().is_empty() {
            return Err(SharedError::validation("email", "Email is required"));
        }
        if self.password.is_empty() {
            return Err(SharedError::validation("password", "Password is required"));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Registration form input
#[derive(Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Body sent to the registration endpoint; the confirmation never leaves the client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

impl Registration {
    pub fn validate(&self) -> Result<(), SharedError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SharedError::validation("name", "Name is required"));
        }
        if name.chars().count() < 3 {
            return Err(SharedError::validation("name", "Name must be at least 3 characters"));
        }
        if self.email.trim().is_empty() {
            return Err(SharedError::validation("email", "Email is required"));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(SharedError::validation("email", "Email is not valid"));
        }
        if self.password.is_empty() {
            return Err(SharedError::validation("password", "Password is required"));
        }
        if self.password.chars().count() < 6 {
            return Err(SharedError::validation("password", "Password must be at least 6 characters"));
        }
        if self.password != self.confirm_password {
            return Err(SharedError::validation("confirmPassword", "Passwords do not match"));
        }
        Ok(())
    }

    pub fn payload(&self) -> RegisterPayload<'_> {
        RegisterPayload {
            name: self.name.trim(),
            email: self.email.trim(),
            password: &self.password,
            role: self.role,
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPayload {
    #[serde(default, alias = "id")]
    user_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

/// Shapes the login endpoint is known to answer with
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginPayload {
    Envelope {
        user: UserPayload,
        #[serde(default)]
        token: Option<String>,
    },
    Flat(UserPayload),
}

/// Build a session record from a login response body
pub fn parse_login_payload(value: Value) -> Result<SessionRecord, AuthError> {
    if !value.is_object() {
        return Err(AuthError::InvalidResponse("expected a JSON object".to_string()));
    }
    let payload: LoginPayload = serde_json::from_value(value)
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

    let (user, token) = match payload {
        LoginPayload::Envelope { user, token } => {
            let token = token.or(user.token.clone());
            (user, token)
        }
        LoginPayload::Flat(user) => {
            let token = user.token.clone();
            (user, token)
        }
    };

    let email = user
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| AuthError::InvalidResponse("missing email".to_string()))?;
    let id = user
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AuthError::InvalidResponse("missing user id".to_string()))?;
    let role = user
        .role
        .as_deref()
        .and_then(Role::parse)
        .ok_or_else(|| AuthError::InvalidResponse(format!("unknown role {:?}", user.role)))?;

    Ok(SessionRecord {
        id,
        name: user.name.unwrap_or_default(),
        email,
        role,
        token: token.filter(|t| !t.is_empty()),
    })
}

pub struct AuthSessionManager {
    session: SessionHandle,
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    last_error: RwLock<Option<String>>,
    revalidation: Mutex<Option<JoinHandle<()>>>,
}

impl AuthSessionManager {
    /// Create a manager in the `Uninitialized` state.
    ///
    /// The returned manager owns an [`ApiClient`] whose credentials come
    /// from this manager's session.
    pub fn new(
        config: Config,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let session = SessionHandle::new();
        let api = ApiClient::new(config, Arc::new(session.clone()))?;
        Ok(Self {
            session,
            api,
            store,
            notifier,
            last_error: RwLock::new(None),
            revalidation: Mutex::new(None),
        })
    }

    /// Restore the session, then validate it in the background and start
    /// periodic revalidation. Must be called from within a Tokio runtime.
    pub fn start(self: &Arc<Self>) -> SessionState {
        let state = self.initialize();
        if state.is_authenticated() {
            let weak = Arc::downgrade(self);
            tokio::spawn(async move {
                if let Some(manager) = weak.upgrade() {
                    manager.validate_session().await;
                }
            });
        }
        self.spawn_revalidation();
        state
    }

    /// Restore the session from the store without any network round-trip
    pub fn initialize(&self) -> SessionState {
        self.session.set(SessionState::Restoring);

        let next = match self.store.load_session() {
            Ok(Some(record)) => {
                tracing::info!(user = %record.email, role = %record.role, "session restored");
                SessionState::Authenticated(record)
            }
            Ok(None) => {
                tracing::debug!("no stored session");
                SessionState::Anonymous
            }
            Err(StoreError::Corrupt(reason)) => {
                tracing::warn!(%reason, "discarding corrupt stored session");
                if let Err(e) = self.store.clear_session() {
                    tracing::warn!(error = %e, "failed to clear corrupt session");
                }
                SessionState::Anonymous
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored session");
                SessionState::Anonymous
            }
        };

        self.session.set(next.clone());
        next
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Client for API calls made on behalf of the current session
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn current_user(&self) -> Option<SessionRecord> {
        self.session.current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.state().is_authenticated()
    }

    pub fn is_instructor(&self) -> bool {
        self.current_user().is_some_and(|user| user.is_instructor())
    }

    pub fn is_student(&self) -> bool {
        self.current_user().is_some_and(|user| user.is_student())
    }

    /// User-facing message of the last failed login or registration
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_last_error(&self, error: Option<String>) {
        *self.last_error.write().unwrap_or_else(PoisonError::into_inner) = error;
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<SessionRecord, AuthError> {
        credentials.validate()?;
        self.set_last_error(None);
        tracing::info!(email = %credentials.email, "logging in");

        let body = LoginBody {
            email: credentials.email.trim(),
            password: &credentials.password,
        };
        let outcome = match self.api.post::<_, Value>(endpoints::LOGIN, &body).await {
            Ok(value) => parse_login_payload(value),
            Err(e) if e.is_client_error() => Err(AuthError::InvalidCredentials {
                message: e.server_message().unwrap_or(LOGIN_FAILED).to_string(),
            }),
            Err(e) => Err(AuthError::Api(e)),
        };
        let outcome = outcome.and_then(|record| {
            self.store.save_session(&record)?;
            Ok(record)
        });

        match outcome {
            Ok(record) => {
                self.session.set(SessionState::Authenticated(record.clone()));
                tracing::info!(user = %record.email, role = %record.role, "login succeeded");
                self.notifier
                    .notify(Notification::success(format!("Welcome back, {}!", record.display_name())));
                Ok(record)
            }
            Err(err) => {
                tracing::warn!(error = %err, "login failed");
                self.drop_session();
                let message = err.user_message();
                self.set_last_error(Some(message.clone()));
                self.notifier.notify(Notification::error(message));
                Err(err)
            }
        }
    }

    /// Create an account. Does not sign the user in.
    pub async fn register(&self, registration: &Registration) -> Result<Value, AuthError> {
        registration.validate()?;
        self.set_last_error(None);
        tracing::info!(email = %registration.email, role = %registration.role, "registering account");

        match self
            .api
            .post::<_, Value>(endpoints::REGISTER, &registration.payload())
            .await
        {
            Ok(created) => {
                self.notifier.notify(Notification::success(REGISTERED));
                Ok(created)
            }
            Err(e) => {
                tracing::warn!(status = ?e.status, error = %e, "registration failed");
                let message = e.server_message().unwrap_or(REGISTRATION_FAILED).to_string();
                self.set_last_error(Some(message.clone()));
                self.notifier.notify(Notification::error(message.clone()));
                Err(AuthError::RegistrationError { message })
            }
        }
    }

    /// End the session. Safe to call when already anonymous.
    pub fn logout(&self) {
        self.drop_session();
        tracing::info!("logged out");
        self.notifier.notify(Notification::info(LOGGED_OUT));
    }

    fn drop_session(&self) {
        if let Err(e) = self.store.clear_session() {
            tracing::warn!(error = %e, "failed to clear stored session");
        }
        self.session.set(SessionState::Anonymous);
    }

    /// Check that the current session is still valid, ending it if not.
    ///
    /// The stored record must still be present; a record replaced in the
    /// store is adopted. Sessions holding a token are also checked against
    /// the server, where only an explicit 401 counts as invalid.
    pub async fn validate_session(&self) -> bool {
        let Some(current) = self.current_user() else {
            return false;
        };

        let record = match self.store.load_session() {
            Ok(Some(stored)) if stored == current => current,
            Ok(Some(stored)) => {
                tracing::info!(user = %stored.email, "adopting session replaced in storage");
                self.session.set(SessionState::Authenticated(stored.clone()));
                stored
            }
            Ok(None) | Err(StoreError::Corrupt(_)) => {
                self.expire_session(&current);
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session during validation");
                return true;
            }
        };

        if record.token.is_none() {
            return true;
        }

        let path = format!("{}/{}", endpoints::USERS, record.id);
        match self.api.get::<Value>(&path).await {
            Ok(_) => true,
            Err(e) if e.status == Some(401) => {
                self.expire_session(&record);
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, "session validation inconclusive");
                true
            }
        }
    }

    /// Force a logout, unless the session changed while validation ran
    fn expire_session(&self, validated: &SessionRecord) {
        if self.current_user().as_ref() != Some(validated) {
            return;
        }
        tracing::warn!(user = %validated.email, "session no longer valid");
        self.drop_session();
        self.notifier.notify(Notification::info(SESSION_EXPIRED));
    }

    /// Re-run the validation pass every [`REVALIDATION_INTERVAL`] while authenticated
    pub fn spawn_revalidation(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + REVALIDATION_INTERVAL;
            let mut ticker = tokio::time::interval_at(start, REVALIDATION_INTERVAL);
            loop {
                ticker.tick().await;
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                if manager.is_authenticated() {
                    manager.validate_session().await;
                }
            }
        });

        let mut slot = self.revalidation.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    pub fn stop_revalidation(&self) {
        let mut slot = self.revalidation.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

impl Drop for AuthSessionManager {
    fn drop(&mut self) {
        self.stop_revalidation();
    }
}
