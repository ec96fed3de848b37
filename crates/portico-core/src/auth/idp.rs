//! HTTP client for the hosted identity provider's oauth2 endpoints.
//!
//! One outbound request per operation; no retries, no caching. Failures are
//! classified into the [`AuthError`] taxonomy and always propagated.

use serde::Deserialize;
use tracing::debug;

use super::error::AuthError;
use crate::config::AuthConfig;

/// Successful token-endpoint payload.
///
/// A successful exchange guarantees all three token fields are present and
/// non-empty; anything less is a protocol failure, not a partial success.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
}

/// Profile returned by the userinfo endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub phone_number: Option<String>,
    pub phone_number_verified: Option<bool>,
}

/// Client for the two calls of the authorization-code flow.
pub struct IdpClient {
    http: reqwest::Client,
    config: AuthConfig,
}

impl IdpClient {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Exchanges an authorization code for tokens.
    ///
    /// # Errors
    /// `ExchangeFailed` with the provider's status and body on a non-success
    /// response, `EmptyTokenResponse` for an empty or unparsable 2xx body,
    /// `IncompleteTokenResponse` when a token field is missing.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let scope = self.config.scope_param();
        let response = self
            .http
            .post(self.config.token_endpoint())
            .query(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("scope", scope.as_str()),
            ])
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send()
            .await
            .map_err(|err| AuthError::Unexpected(format!("token request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AuthError::Unexpected(format!("token response unreadable: {err}")))?;

        if !status.is_success() {
            return Err(AuthError::ExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Err(AuthError::EmptyTokenResponse);
        }

        let tokens: TokenResponse = serde_json::from_str(&body).map_err(|err| {
            debug!(error = %err, "token payload unparsable");
            AuthError::EmptyTokenResponse
        })?;

        if tokens.access_token.is_empty()
            || tokens.id_token.is_empty()
            || tokens.refresh_token.is_empty()
        {
            return Err(AuthError::IncompleteTokenResponse { body });
        }

        debug!(
            expires_in = tokens.expires_in,
            token_type = %tokens.token_type,
            "token exchange succeeded"
        );
        Ok(tokens)
    }

    /// Fetches the profile for a freshly issued access token.
    ///
    /// # Errors
    /// `UserInfoFailed` on a non-success response, `EmptyUserInfoResponse`
    /// for an empty 2xx body, `Unexpected` when the payload is malformed.
    pub async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        let response = self
            .http
            .get(self.config.userinfo_endpoint())
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|err| AuthError::Unexpected(format!("userinfo request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AuthError::Unexpected(format!("userinfo response unreadable: {err}")))?;

        if !status.is_success() {
            return Err(AuthError::UserInfoFailed {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Err(AuthError::EmptyUserInfoResponse);
        }

        serde_json::from_str(&body)
            .map_err(|err| AuthError::Unexpected(format!("userinfo payload malformed: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: optional profile fields deserialize leniently.
    #[test]
    fn test_user_info_deserializes_sparse_payload() {
        let info: UserInfo =
            serde_json::from_str(r#"{"email":"a@example.com","email_verified":true}"#).unwrap();
        assert_eq!(info.email.as_deref(), Some("a@example.com"));
        assert!(info.email_verified);
        assert_eq!(info.username, None);
        assert_eq!(info.phone_number_verified, None);
    }

    /// Test: token fields default to empty so missing keys are detectable.
    #[test]
    fn test_token_response_defaults_missing_fields() {
        let tokens: TokenResponse = serde_json::from_str(r#"{"access_token":"x"}"#).unwrap();
        assert_eq!(tokens.access_token, "x");
        assert!(tokens.id_token.is_empty());
        assert!(tokens.refresh_token.is_empty());
    }
}
