//! Auth command handlers.

use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use portico_core::auth::callback::{CallbackHandler, CallbackParams, CallbackPhase, Navigation};
use portico_core::auth::controller::AuthController;
use portico_core::auth::guard::{self, RouteDecision};
use portico_core::auth::idp::IdpClient;
use portico_core::auth::session::SessionStore;
use portico_core::config::AuthConfig;
use portico_core::logging;

pub async fn login() -> Result<()> {
    let config = AuthConfig::from_env().context("load configuration")?;
    let store = Arc::new(SessionStore::new());
    let controller = Arc::new(AuthController::new(
        IdpClient::new(config.clone()),
        store.clone(),
    ));

    let auth_url = match guard::evaluate(&store.snapshot(), &config) {
        RouteDecision::Proceed => {
            println!("Already signed in.");
            return Ok(());
        }
        RouteDecision::RedirectToProvider { url } => url,
        RouteDecision::RedirectToErrorPage { url } => {
            anyhow::bail!("authentication is misconfigured, see {url}");
        }
    };

    println!("To sign in:");
    println!();
    println!("  1. A browser window will open (or visit the URL below)");
    println!("  2. Sign in with your account and authorize access");
    println!("  3. If redirected to localhost, return here to continue");
    println!("  4. Otherwise, paste the full redirect URL");
    println!();
    println!("Authorization URL:");
    println!("  {auth_url}");
    println!();

    // Try to open browser (best effort, skip in tests)
    if std::env::var("PORTICO_NO_BROWSER").is_err() {
        let _ = open::that(&auth_url);
    }

    // Prefer the local callback in interactive sessions, fall back to paste.
    let params = match local_callback_params(&config) {
        Some(params) => params,
        None => paste_callback_params()?,
    };

    run_callback(controller, &store, params).await
}

pub fn logout() -> Result<()> {
    let config = AuthConfig::from_env().context("load configuration")?;

    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &config.client_id)
        .append_pair("logout_uri", &config.redirect_uri)
        .finish();
    let logout_url = format!("{}?{}", config.logout_endpoint(), query);

    println!("The session lives only in memory and ends with the process.");
    println!("To also end the provider's browser session, visit:");
    println!("  {logout_url}");

    if std::env::var("PORTICO_NO_BROWSER").is_err() {
        let _ = open::that(&logout_url);
    }
    Ok(())
}

async fn run_callback(
    controller: Arc<AuthController>,
    store: &SessionStore,
    params: CallbackParams,
) -> Result<()> {
    let can_retry = params.code.is_some();
    let mut handler = CallbackHandler::new(controller, params);

    println!("Signing in...");
    let mut navigation = handler.process().await;
    loop {
        match navigation {
            Some(Navigation::Home { .. }) => {
                let session = store.snapshot();
                let profile = session.user_info.unwrap_or_default();
                println!();
                println!(
                    "✓ Signed in as {}",
                    profile.email.as_deref().unwrap_or("unknown")
                );
                if let Some(username) = profile.username.as_deref() {
                    println!("  Username: {username}");
                }
                if let Some(token) = session.id_token.as_deref() {
                    println!("  Identity token: {}", logging::mask(token));
                }
                return Ok(());
            }
            None => {
                let CallbackPhase::Failed { message, detail } = handler.phase().clone() else {
                    anyhow::bail!("sign-in did not complete");
                };
                println!();
                println!("Authentication failed: {message}");
                if let Some(detail) = detail {
                    println!("  {detail}");
                }
                if !can_retry || !prompt_retry()? {
                    anyhow::bail!("sign-in aborted");
                }
                println!("Retrying...");
                navigation = handler.retry().await;
            }
        }
    }
}

fn prompt_retry() -> Result<bool> {
    print!("Try again? [y/N] ");
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().lock().read_line(&mut response)?;
    Ok(response.trim().eq_ignore_ascii_case("y"))
}

fn paste_callback_params() -> Result<CallbackParams> {
    print!("Paste the redirect URL: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let value = input.trim();
    if value.is_empty() {
        anyhow::bail!("no redirect URL provided");
    }

    if let Ok(url) = url::Url::parse(value) {
        return Ok(CallbackParams::from_url(&url));
    }
    if value.contains('=') {
        // A bare query string.
        return Ok(CallbackParams::from_query(value));
    }
    // A bare authorization code.
    Ok(CallbackParams {
        code: Some(value.to_string()),
        ..CallbackParams::default()
    })
}

/// Waits for the provider to redirect the browser back to the configured
/// localhost URI. Returns None when the redirect URI is not local, the port
/// cannot be bound, or the session is non-interactive.
fn local_callback_params(config: &AuthConfig) -> Option<CallbackParams> {
    if !io::stdin().is_terminal() {
        return None;
    }

    let redirect = url::Url::parse(&config.redirect_uri).ok()?;
    let host = redirect.host_str()?;
    if host != "localhost" && host != "127.0.0.1" {
        return None;
    }
    let port = redirect.port_or_known_default()?;
    let callback_path = redirect.path().to_string();

    let listener = match TcpListener::bind(("127.0.0.1", port)) {
        Ok(listener) => listener,
        Err(_) => return None,
    };
    let _ = listener.set_nonblocking(true);

    let (tx, rx) = std::sync::mpsc::channel::<Option<CallbackParams>>();

    std::thread::spawn(move || {
        let start = std::time::Instant::now();
        loop {
            match listener.accept() {
                Ok((mut stream, _)) => {
                    let mut buffer = [0u8; 2048];
                    let _ = stream.read(&mut buffer);
                    let request = String::from_utf8_lossy(&buffer);
                    let params = extract_callback_params(&request, &callback_path);
                    let response = if params.is_some() {
                        callback_received_response()
                    } else {
                        callback_rejected_response()
                    };
                    let _ = stream.write_all(response.as_bytes());
                    let _ = tx.send(params);
                    break;
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > Duration::from_secs(120) {
                        let _ = tx.send(None);
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(_) => {
                    let _ = tx.send(None);
                    break;
                }
            }
        }
    });

    rx.recv_timeout(Duration::from_secs(120)).ok().flatten()
}

fn extract_callback_params(request: &str, callback_path: &str) -> Option<CallbackParams> {
    let request_line = request.lines().next()?;
    let mut parts = request_line.split_whitespace();
    let _method = parts.next()?;
    let path = parts.next()?;

    let url = url::Url::parse(&format!("http://localhost{path}")).ok()?;
    if url.path() != callback_path {
        return None;
    }
    Some(CallbackParams::from_url(&url))
}

fn callback_received_response() -> String {
    let body = "<!doctype html><html><head><meta charset=\"utf-8\" /><title>Sign-in received</title></head><body><p>Sign-in received. Return to your terminal to continue.</p></body></html>";
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}

fn callback_rejected_response() -> String {
    let body = "Invalid OAuth callback";
    format!(
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_callback_params_matches_path() {
        let request = "GET /auth/callback?code=abc123 HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let params = extract_callback_params(request, "/auth/callback").unwrap();
        assert_eq!(params.code.as_deref(), Some("abc123"));

        assert!(extract_callback_params(request, "/other").is_none());
    }

    #[test]
    fn test_extract_callback_params_keeps_provider_errors() {
        let request = "GET /auth/callback?error=access_denied&error_description=Denied HTTP/1.1\r\n\r\n";
        let params = extract_callback_params(request, "/auth/callback").unwrap();
        assert_eq!(params.code, None);
        assert_eq!(params.error.as_deref(), Some("access_denied"));
        assert_eq!(params.error_description.as_deref(), Some("Denied"));
    }
}
