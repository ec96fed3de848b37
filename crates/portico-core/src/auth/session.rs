//! In-memory session state.
//!
//! The store is constructed empty at startup, owned by the application
//! context, and dropped with the process; nothing is persisted. The two
//! writes performed during login are not transactional, so a reader can
//! observe tokens set while the profile is still absent.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::idp::UserInfo;

/// A snapshot of the current authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_info: Option<UserInfo>,
}

impl Session {
    /// Authenticated iff an identity token is present. Derived, never stored.
    pub fn is_authenticated(&self) -> bool {
        self.id_token.is_some()
    }
}

/// Holds the session for the lifetime of the process.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    pub fn set_tokens(&self, id_token: Option<String>, refresh_token: Option<String>) {
        let mut session = self.lock();
        session.id_token = id_token;
        session.refresh_token = refresh_token;
    }

    pub fn set_user_info(&self, user_info: Option<UserInfo>) {
        self.lock().user_info = user_info;
    }

    /// Clears every field back to its empty default.
    pub fn logout(&self) {
        *self.lock() = Session::default();
    }
}
