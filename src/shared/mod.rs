//! Shared Module
//!
//! Types used by every part of the client: the API's domain records, the
//! session record, configuration and shared error types. Everything here is
//! plain data designed for serialization.

/// Domain records and the session record
pub mod models;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use models::{Assessment, AssessmentResult, Course, NewResult, Role, SessionRecord, User};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
