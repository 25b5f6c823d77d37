//! Access checks for protected views.
//!
//! The client does not navigate by itself. A guard only tells the caller
//! where to go: to the login path (remembering where the user was headed),
//! to the unauthorized path, or on to the requested view.

use crate::client::auth::SessionHandle;
use crate::shared::Role;
use std::sync::{Mutex, PoisonError};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    RedirectToLogin,
    Unauthorized,
}

impl Access {
    /// Path to navigate to, if the view must not be shown
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Access::Granted => None,
            Access::RedirectToLogin => Some(LOGIN_PATH),
            Access::Unauthorized => Some(UNAUTHORIZED_PATH),
        }
    }
}

#[derive(Debug)]
pub struct RouteGuard {
    session: SessionHandle,
    return_path: Mutex<Option<String>>,
}

impl RouteGuard {
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            return_path: Mutex::new(None),
        }
    }

    pub fn check(&self, path: &str, required_role: Option<Role>) -> Access {
        let Some(user) = self.session.current_user() else {
            if path != LOGIN_PATH {
                *self.return_path.lock().unwrap_or_else(PoisonError::into_inner) = Some(path.to_string());
            }
            return Access::RedirectToLogin;
        };

        match required_role {
            Some(role) if user.role != role => Access::Unauthorized,
            _ => Access::Granted,
        }
    }

    /// Where to go after a successful login; clears the remembered path
    pub fn take_return_path(&self) -> String {
        self.return_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_else(|| HOME_PATH.to_string())
    }
}
