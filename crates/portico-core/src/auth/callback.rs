//! Callback handling: the page the provider redirects back to.
//!
//! State machine: `Idle → Processing → {Succeeded, Failed}` with a
//! `Failed → Processing` retry edge. Login runs at most once per page load;
//! only `retry` re-arms it.

use std::sync::Arc;

use tracing::{error, warn};
use url::form_urlencoded;

use super::controller::AuthController;
use super::error::AuthError;

/// Query parameters the provider may attach to the redirect. Either `code`
/// (success path) or `error`/`error_description` (provider-reported failure).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parses a raw query string, coercing each known key to a string and
    /// leaving absent keys `None`.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                "error_description" => params.error_description = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// Parses the query of a full redirect URL.
    pub fn from_url(url: &url::Url) -> Self {
        Self::from_query(url.query().unwrap_or(""))
    }
}

/// Navigation the handler asks its caller to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Go to the home route, replacing the callback entry in history so the
    /// user cannot navigate back into it.
    Home { replace_history: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackPhase {
    Idle,
    Processing,
    Succeeded,
    Failed {
        message: String,
        detail: Option<String>,
    },
}

/// Processes the provider redirect exactly once per page load.
pub struct CallbackHandler {
    controller: Arc<AuthController>,
    params: CallbackParams,
    processed: bool,
    phase: CallbackPhase,
}

impl CallbackHandler {
    pub fn new(controller: Arc<AuthController>, params: CallbackParams) -> Self {
        Self {
            controller,
            params,
            processed: false,
            phase: CallbackPhase::Idle,
        }
    }

    pub fn phase(&self) -> &CallbackPhase {
        &self.phase
    }

    /// Handles the callback. Returns the navigation to perform on success;
    /// failures are terminated here (recorded in the phase for rendering).
    ///
    /// Re-invoking after a completed run is a no-op until [`Self::retry`]
    /// resets the idempotency flag.
    pub async fn process(&mut self) -> Option<Navigation> {
        if let Some(provider_error) = self.params.error.clone() {
            let description = self
                .params
                .error_description
                .clone()
                .unwrap_or_else(|| "No description provided".to_string());
            error!(error = %provider_error, %description, "identity provider reported an error");
            self.phase = CallbackPhase::Failed {
                message: format!("Error: {provider_error}"),
                detail: Some(format!("Description: {description}")),
            };
            return None;
        }

        let Some(code) = self.params.code.clone() else {
            error!("no authorization code found in callback URL");
            self.phase = CallbackPhase::Failed {
                message: "No authorization code was provided".to_string(),
                detail: None,
            };
            return None;
        };

        if self.processed {
            warn!("callback already processed, ignoring duplicate invocation");
            return None;
        }
        self.processed = true;
        self.phase = CallbackPhase::Processing;

        match self.controller.login(&code).await {
            Ok(()) => {
                self.phase = CallbackPhase::Succeeded;
                Some(Navigation::Home {
                    replace_history: true,
                })
            }
            Err(err) => {
                error!(error = %err, "failed to log in");
                let (message, detail) = describe_login_failure(&err);
                self.phase = CallbackPhase::Failed {
                    message,
                    detail: Some(detail),
                };
                None
            }
        }
    }

    /// Retry edge: clears the idempotency flag and reruns the same handling
    /// with the same parameters.
    pub async fn retry(&mut self) -> Option<Navigation> {
        self.processed = false;
        self.process().await
    }
}

/// Maps a login failure to a user-facing message plus a detail line,
/// bucketing provider errors by HTTP status class.
pub fn describe_login_failure(err: &AuthError) -> (String, String) {
    let message = match err.status() {
        Some(400) => "The sign-in request was invalid. Please try signing in again.",
        Some(401) => "The identity provider rejected the authorization code.",
        Some(403) => "This account is not allowed to sign in.",
        Some(status) if (500..=599).contains(&status) => {
            "The identity provider is temporarily unavailable. Please try again in a moment."
        }
        // Shape errors and off-bucket statuses show their own text.
        _ if err.is_provider_error() => return (err.to_string(), detail_line(err)),
        _ => "Authentication failed",
    };
    (message.to_string(), detail_line(err))
}

fn detail_line(err: &AuthError) -> String {
    let mut detail = err.to_string();
    if let Some(body) = err.body() {
        if !body.trim().is_empty() {
            let snippet: String = body.chars().take(200).collect();
            detail = format!("{detail} ({snippet})");
        }
    } else if let Some(extra) = err.detail() {
        detail = format!("{detail}: {extra}");
    }
    detail
}
