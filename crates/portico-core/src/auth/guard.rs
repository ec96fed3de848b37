//! Route guard for the protected area of the app.
//!
//! Before anything protected renders, the guard checks the session. An
//! unauthenticated session means a full navigation to the provider's
//! authorization endpoint; the decision is returned as a plain value for the
//! caller to act on, never thrown.

use url::form_urlencoded;

use super::session::Session;
use crate::config::AuthConfig;

/// Path of the static page that reports fatal configuration errors.
pub const AUTH_ERROR_PATH: &str = "/auth-error";

/// What the caller must do before entering a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session is authenticated; rendering proceeds.
    Proceed,
    /// Navigate to the provider's authorization endpoint.
    RedirectToProvider { url: String },
    /// Configuration is broken; navigate to the error page instead.
    RedirectToErrorPage { url: String },
}

/// Decides whether a protected route may render for `session`.
pub fn evaluate(session: &Session, config: &AuthConfig) -> RouteDecision {
    if session.is_authenticated() {
        return RouteDecision::Proceed;
    }
    match authorization_url(config) {
        Ok(url) => RouteDecision::RedirectToProvider { url },
        Err(reason) => RouteDecision::RedirectToErrorPage {
            url: error_page_url(&reason),
        },
    }
}

/// Builds the authorization URL for the hosted login page.
///
/// # Errors
/// Returns the human-readable reason when a required value is blank.
pub fn authorization_url(config: &AuthConfig) -> Result<String, String> {
    if config.client_id.trim().is_empty() {
        return Err("Missing authentication client id".to_string());
    }
    if config.redirect_uri.trim().is_empty() {
        return Err("Missing authentication redirect URI".to_string());
    }
    let scope = config.scope_param();
    if scope.trim().is_empty() {
        return Err("Missing authentication scopes".to_string());
    }

    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("scope", &scope)
        .append_pair("response_type", "code")
        .finish();
    Ok(format!("{}?{}", config.authorize_endpoint(), query))
}

fn error_page_url(reason: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("reason", reason)
        .finish();
    format!("{AUTH_ERROR_PATH}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            auth_url: "https://auth.example.com".to_string(),
            client_id: "test-client-id".to_string(),
            redirect_uri: "http://localhost:3000/auth/callback".to_string(),
            scopes: vec!["openid".to_string(), "email".to_string(), "profile".to_string()],
            api_uri: "https://api.example.com".to_string(),
        }
    }

    fn authenticated_session() -> Session {
        Session {
            id_token: Some("id-token".to_string()),
            ..Session::default()
        }
    }

    #[test]
    fn test_authenticated_session_proceeds() {
        assert_eq!(
            evaluate(&authenticated_session(), &config()),
            RouteDecision::Proceed
        );
    }

    /// Test: authorization URL carries the required parameters.
    #[test]
    fn test_unauthenticated_session_redirects_to_provider() {
        let RouteDecision::RedirectToProvider { url } = evaluate(&Session::default(), &config())
        else {
            panic!("expected a provider redirect");
        };

        assert!(url.starts_with("https://auth.example.com/oauth2/authorize?"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("response_type=code"));
        // Scopes joined by spaces, form-encoded.
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"));
    }

    #[test]
    fn test_blank_client_id_redirects_to_error_page() {
        let mut broken = config();
        broken.client_id = "  ".to_string();

        let RouteDecision::RedirectToErrorPage { url } =
            evaluate(&Session::default(), &broken)
        else {
            panic!("expected an error-page redirect");
        };

        assert!(url.starts_with("/auth-error?reason="));
        assert!(url.contains("Missing+authentication+client+id"));
    }

    #[test]
    fn test_blank_scopes_redirect_to_error_page() {
        let mut broken = config();
        broken.scopes.clear();

        let decision = evaluate(&Session::default(), &broken);
        assert!(matches!(decision, RouteDecision::RedirectToErrorPage { .. }));
    }
}
