//! EduSync - Client Library
//!
//! EduSync is the client side of a learning-management platform: course
//! browsing, assessments, results review and role-based dashboards, all
//! backed by a remote REST API.
//!
//! # Overview
//!
//! This library provides:
//! - Session management with a persisted, restorable session
//! - An HTTP facade that derives its `Authorization` header from the session
//! - Availability probing and an offline mode with fixed sample data
//! - Typed services and view state for results and dashboards
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared by every component
//!   - Domain records, the session record
//!   - Application configuration
//!   - Error types
//!
//! - **`client`** - The client core
//!   - Auth session manager, session store, route guard
//!   - HTTP facade, availability prober, services
//!   - Offline fallback loader, results view, dashboard
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use edusync::client::{AuthSessionManager, AvailabilityProber, Config, MemorySessionStore,
//!     NotificationLog, ResultsView};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new();
//! let prober = AvailabilityProber::from_config(&config);
//! let manager = Arc::new(AuthSessionManager::new(
//!     config,
//!     Arc::new(MemorySessionStore::new()),
//!     Arc::new(NotificationLog::default()),
//! )?);
//! manager.start();
//!
//! let view = ResultsView::new(&manager, prober, false);
//! view.mount().await;
//! for row in view.rows() {
//!     println!("{} {}", row.assessment, row.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Session state lives behind `Arc<RwLock<>>` and is shared between the
//! manager, the HTTP facade and the views. Views discard the results of
//! requests that finish after they were unmounted.
//!
//! # Error Handling
//!
//! Each component has its own `thiserror` enum; see `shared::error`,
//! `client::http::ApiError`, `client::auth::AuthError` and
//! `client::offline::LoadError`.

/// Shared types and data structures
pub mod shared;

/// Client core
pub mod client;
