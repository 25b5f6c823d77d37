//! EduSync Client Module
//!
//! The client core: session management, the HTTP facade and the data views
//! built on it. Rendering is left to the embedding front end; this module
//! exposes state and the operations that change it.
//!
//! # Architecture
//!
//! - **`config`** - Server URL resolution and endpoint URLs
//! - **`session_store`** - Persisted session (`user` / `authToken` keys)
//! - **`http`** - HTTP client facade and normalized `ApiError`
//! - **`availability`** - Backend availability probe
//! - **`auth`** - Auth session manager and periodic revalidation
//! - **`notify`** - User-facing notifications
//! - **`guard`** - Login redirect and role gate for protected views
//! - **`services`** - Typed calls for Users, Courses, Assessments, Results
//! - **`offline`** - Offline fallback loader and the results view
//! - **`dashboard`** - Home dashboard summaries
//! - **`main`** - Command line entry point (binary)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use edusync::client::{AuthSessionManager, Config, Credentials, MemorySessionStore, NotificationLog};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = Arc::new(AuthSessionManager::new(
//!     Config::new(),
//!     Arc::new(MemorySessionStore::new()),
//!     Arc::new(NotificationLog::default()),
//! )?);
//! manager.start();
//! manager.login(&Credentials::new("a@b.com", "secret")).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod session_store;
pub mod http;
pub mod availability;
pub mod auth;
pub mod notify;
pub mod guard;
pub mod services;
pub mod offline;
pub mod dashboard;

// Re-export commonly used types
pub use config::Config;
pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError};
pub use http::{ApiClient, ApiError, CredentialProvider};
pub use availability::AvailabilityProber;
pub use auth::{AuthError, AuthSessionManager, Credentials, Registration, SessionHandle, SessionState};
pub use notify::{Notification, NotificationLevel, NotificationLog, Notifier, TracingNotifier};
pub use guard::{Access, RouteGuard};
pub use offline::{FallbackLoader, LoadError, ResultsView};
pub use dashboard::{Dashboard, StudentStats};
