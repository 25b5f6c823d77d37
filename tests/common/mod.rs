//! Common test utilities and helpers
//!
//! - Stub backend built on `wiremock`
//! - Session manager fixtures
//! - Custom assertion macros
#![allow(dead_code)]

#[macro_use]
pub mod assertions;
pub mod backend;

pub use backend::*;
