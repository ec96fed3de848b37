//! Configuration for the Portico client.
//!
//! All values come from `PORTICO_*` environment variables and are validated
//! once at startup. A missing or blank required value is a fatal
//! [`ConfigError`]; nothing in the flow runs with a partial configuration.

use thiserror::Error;

pub const ENV_AUTH_URL: &str = "PORTICO_AUTH_URL";
pub const ENV_CLIENT_ID: &str = "PORTICO_CLIENT_ID";
pub const ENV_REDIRECT_URI: &str = "PORTICO_REDIRECT_URI";
pub const ENV_SCOPES: &str = "PORTICO_SCOPES";
pub const ENV_API_URI: &str = "PORTICO_API_URI";

/// Fatal configuration failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment configuration: {var} must be a non-empty string")]
    Missing { var: &'static str },
}

/// Validated identity provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Base URL of the hosted provider, without a trailing slash.
    pub auth_url: String,
    /// OAuth2 client identifier registered with the provider.
    pub client_id: String,
    /// Redirect URI registered for the authorization-code flow.
    pub redirect_uri: String,
    /// Requested scopes, configured comma-separated.
    pub scopes: Vec<String>,
    /// Base URI of the backend API.
    pub api_uri: String,
}

impl AuthConfig {
    /// Loads and validates the configuration from the process environment.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] naming the first missing variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|var| std::env::var(var).ok())
    }

    /// Same as [`AuthConfig::from_env`] but with an injectable lookup,
    /// so validation is testable without touching the real environment.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] naming the first missing variable.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let require = |var: &'static str| -> Result<String, ConfigError> {
            match lookup(var) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => Err(ConfigError::Missing { var }),
            }
        };

        let auth_url = require(ENV_AUTH_URL)?.trim_end_matches('/').to_string();
        let client_id = require(ENV_CLIENT_ID)?;
        let redirect_uri = require(ENV_REDIRECT_URI)?;
        let scopes: Vec<String> = require(ENV_SCOPES)?
            .split(',')
            .map(|scope| scope.trim().to_string())
            .filter(|scope| !scope.is_empty())
            .collect();
        if scopes.is_empty() {
            return Err(ConfigError::Missing { var: ENV_SCOPES });
        }
        let api_uri = require(ENV_API_URI)?;

        Ok(Self {
            auth_url,
            client_id,
            redirect_uri,
            scopes,
            api_uri,
        })
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("{}/oauth2/authorize", self.auth_url)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth2/token", self.auth_url)
    }

    pub fn userinfo_endpoint(&self) -> String {
        format!("{}/oauth2/userInfo", self.auth_url)
    }

    /// Hosted-UI logout endpoint (clears the provider's browser session).
    pub fn logout_endpoint(&self) -> String {
        format!("{}/logout", self.auth_url)
    }

    /// Scopes joined by spaces, the form the oauth2 endpoints expect.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}
