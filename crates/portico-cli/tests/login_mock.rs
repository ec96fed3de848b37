//! End-to-end `login` runs against a mocked identity provider, using the
//! paste fallback (stdin is not a terminal under the test harness).

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn login_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("portico");
    cmd.env("PORTICO_AUTH_URL", server.uri())
        .env("PORTICO_CLIENT_ID", "test-client-id")
        .env("PORTICO_REDIRECT_URI", "http://localhost:3000/auth/callback")
        .env("PORTICO_SCOPES", "openid,email,profile")
        .env("PORTICO_API_URI", "https://api.example.com")
        .env("PORTICO_NO_BROWSER", "1")
        .arg("login");
    cmd
}

#[tokio::test]
async fn test_login_succeeds_with_pasted_redirect() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(query_param("grant_type", "authorization_code"))
        .and(query_param("code", "abc123"))
        .and(query_param("client_id", "test-client-id"))
        .and(query_param("scope", "openid email profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-access-token",
            "id_token": "test-id-token-long-enough",
            "refresh_token": "test-refresh-token",
            "expires_in": 3600,
            "token_type": "Bearer",
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oauth2/userInfo"))
        .and(header("Authorization", "Bearer test-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "test@example.com",
            "username": "testuser",
            "email_verified": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    login_cmd(&server)
        .write_stdin("http://localhost:3000/auth/callback?code=abc123\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as test@example.com"))
        .stdout(predicate::str::contains("Username: testuser"));
}

#[tokio::test]
async fn test_login_reports_provider_rejection() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code",
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Decline the retry prompt.
    login_cmd(&server)
        .write_stdin("http://localhost:3000/auth/callback?code=bad-code\nn\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Authentication failed"))
        .stdout(predicate::str::contains("Failed to exchange code for token: HTTP 400"));
}

#[tokio::test]
async fn test_login_shows_provider_error_params_without_exchanging() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    login_cmd(&server)
        .write_stdin(
            "http://localhost:3000/auth/callback?error=invalid_request&error_description=Invalid%20request%20parameter\n",
        )
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid_request"))
        .stdout(predicate::str::contains("Invalid request parameter"));
}
