//! Closed error taxonomy for the authentication flow.
//!
//! The identity provider client never recovers from these, and neither does
//! the controller; they propagate outward until the callback handler renders
//! them. Each variant carries exactly the fields the UI needs.

use thiserror::Error;

/// Failure of the token exchange, userinfo fetch, or surrounding plumbing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Token endpoint answered with a non-success status.
    #[error("Failed to exchange code for token: HTTP {status}")]
    ExchangeFailed { status: u16, body: String },

    /// Token endpoint answered 2xx with an empty or unparsable body.
    #[error("Token endpoint returned empty response")]
    EmptyTokenResponse,

    /// Token endpoint answered 2xx but the payload lacks one of the
    /// access/id/refresh tokens. Never a partial success.
    #[error("Invalid token response: missing required fields")]
    IncompleteTokenResponse { body: String },

    /// Userinfo endpoint answered with a non-success status.
    #[error("Failed to get user info: HTTP {status}")]
    UserInfoFailed { status: u16, body: String },

    /// Userinfo endpoint answered 2xx with an empty body.
    #[error("User info returned empty response")]
    EmptyUserInfoResponse,

    /// Anything else: network failure, malformed JSON, and so on. The
    /// wrapped detail is for logs only; users see the generic message.
    #[error("Authentication failed")]
    Unexpected(String),
}

impl AuthError {
    /// HTTP status carried by provider protocol errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::ExchangeFailed { status, .. } | AuthError::UserInfoFailed { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Raw response body, when the provider sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            AuthError::ExchangeFailed { body, .. }
            | AuthError::IncompleteTokenResponse { body }
            | AuthError::UserInfoFailed { body, .. } => Some(body),
            _ => None,
        }
    }

    /// True for errors reported by the identity provider itself, protocol
    /// or response-shape, as opposed to the generic wrapper.
    pub fn is_provider_error(&self) -> bool {
        !matches!(self, AuthError::Unexpected(_))
    }

    /// Extra detail behind the generic wrapper, kept out of `Display`.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AuthError::Unexpected(detail) => Some(detail),
            _ => None,
        }
    }
}
