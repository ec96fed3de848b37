//! Orchestrates login: token exchange, userinfo fetch, session writes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::error::AuthError;
use super::idp::IdpClient;
use super::session::{Session, SessionStore};
use crate::logging;

#[derive(Debug, Default)]
struct LoginStatus {
    is_loading: bool,
    last_error: Option<AuthError>,
}

/// Drives the authorization-code login and exposes the session state.
///
/// The only concurrency control in the flow lives here: an atomic in-flight
/// flag that drops re-entrant `login` calls while one is pending.
pub struct AuthController {
    idp: IdpClient,
    store: Arc<SessionStore>,
    in_flight: AtomicBool,
    status: Mutex<LoginStatus>,
}

impl AuthController {
    pub fn new(idp: IdpClient, store: Arc<SessionStore>) -> Self {
        Self {
            idp,
            store,
            in_flight: AtomicBool::new(false),
            status: Mutex::new(LoginStatus::default()),
        }
    }

    fn lock_status(&self) -> MutexGuard<'_, LoginStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> Session {
        self.store.snapshot()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_status().is_loading
    }

    pub fn last_error(&self) -> Option<AuthError> {
        self.lock_status().last_error.clone()
    }

    /// Logs the session out, clearing every stored field.
    pub fn logout(&self) {
        self.store.logout();
        info!("session cleared");
    }

    /// Runs the two-step login for an authorization code.
    ///
    /// A call made while another login is in flight is dropped silently:
    /// it logs a warning and returns `Ok(())` without touching the network.
    /// Loading state and the in-flight flag are reset on every exit path.
    ///
    /// # Errors
    /// Propagates every [`AuthError`] after recording it for observers.
    pub async fn login(&self, code: &str) -> Result<(), AuthError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("authentication already in progress, skipping duplicate request");
            return Ok(());
        }

        info!("authentication process started");
        debug!(code = %logging::mask(code), "processing login with auth code");
        {
            let mut status = self.lock_status();
            status.is_loading = true;
            status.last_error = None;
        }

        let result = self.run_login(code).await;

        {
            let mut status = self.lock_status();
            status.is_loading = false;
            status.last_error = result.as_ref().err().cloned();
        }
        self.in_flight.store(false, Ordering::SeqCst);

        if let Err(err) = &result {
            warn!(error = %err, "authentication failed");
        }
        result
    }

    async fn run_login(&self, code: &str) -> Result<(), AuthError> {
        debug!("exchanging code for tokens");
        let tokens = self.idp.exchange_code_for_token(code).await?;

        debug!("fetching user info");
        let user_info = self.idp.get_user_info(&tokens.access_token).await?;

        // Two sequential writes; a reader can observe tokens without profile.
        self.store
            .set_tokens(Some(tokens.id_token), Some(tokens.refresh_token));
        info!(
            email = user_info.email.as_deref().unwrap_or(""),
            username = user_info.username.as_deref().unwrap_or(""),
            "user authenticated successfully"
        );
        self.store.set_user_info(Some(user_info));
        Ok(())
    }
}
